use std::path::PathBuf;
use std::sync::Arc;

/// Error reading platform state.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("platform service unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Status of the currently active network as reported by the platform.
pub trait NetworkInfo {
    /// The platform returned usable information.
    fn is_valid(&self) -> bool;
    fn is_available(&self) -> bool;
    fn is_connected(&self) -> bool;
    fn is_roaming(&self) -> bool;
    fn is_active_network_metered(&self) -> bool;
}

/// Produces a [`NetworkInfo`] for the platform context the factory was built with.
pub trait NetworkInfoFactory: Send + Sync {
    fn network_info(&self) -> Result<Box<dyn NetworkInfo>, PlatformError>;
}

/// Plain record of the five network checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkInfoSnapshot {
    pub valid: bool,
    pub available: bool,
    pub connected: bool,
    pub roaming: bool,
    pub metered: bool,
}

impl NetworkInfoSnapshot {
    /// Connected, non-roaming, unmetered.
    pub fn unmetered() -> Self {
        Self {
            valid: true,
            available: true,
            connected: true,
            roaming: false,
            metered: false,
        }
    }
}

impl NetworkInfo for NetworkInfoSnapshot {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_roaming(&self) -> bool {
        self.roaming
    }

    fn is_active_network_metered(&self) -> bool {
        self.metered
    }
}

/// Factory that always hands out the same snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNetworkInfoFactory(pub NetworkInfoSnapshot);

impl NetworkInfoFactory for FixedNetworkInfoFactory {
    fn network_info(&self) -> Result<Box<dyn NetworkInfo>, PlatformError> {
        Ok(Box::new(self.0))
    }
}

/// Answers questions about the current state of the device's network.
///
/// The network-info factory is injected; clones share it.
#[derive(Clone)]
pub struct DeviceState {
    factory: Arc<dyn NetworkInfoFactory>,
}

impl DeviceState {
    pub fn new(factory: Arc<dyn NetworkInfoFactory>) -> Self {
        Self { factory }
    }

    /// Replace the network-info factory.
    pub fn set_network_info_factory(&mut self, factory: Arc<dyn NetworkInfoFactory>) {
        self.factory = factory;
    }

    /// Whether the currently active network is unmetered.
    ///
    /// A platform failure counts as "no unmetered network".
    pub fn is_unmetered_network_available(&self) -> bool {
        match self.try_is_unmetered_network_available() {
            Ok(unmetered) => unmetered,
            Err(e) => {
                tracing::warn!(error = %e, "network info unavailable");
                false
            }
        }
    }

    /// Same as [`is_unmetered_network_available`](Self::is_unmetered_network_available)
    /// but surfaces platform errors.
    pub fn try_is_unmetered_network_available(&self) -> Result<bool, PlatformError> {
        let info = self.factory.network_info()?;
        let unmetered = info.is_valid()
            && info.is_available()
            && info.is_connected()
            && !info.is_roaming()
            && !info.is_active_network_metered();
        tracing::debug!(
            valid = info.is_valid(),
            available = info.is_available(),
            connected = info.is_connected(),
            roaming = info.is_roaming(),
            metered = info.is_active_network_metered(),
            unmetered,
            "network info read"
        );
        Ok(unmetered)
    }
}

impl std::fmt::Debug for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceState").finish_non_exhaustive()
    }
}
