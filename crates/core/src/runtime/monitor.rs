use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::JobgateCfg;
use crate::environment::ConditionsSource;
use crate::environment::network::DeviceState;
use crate::environment::watcher::{ConditionsSignal, ConditionsWatcher};

pub type SignalReceiver = mpsc::Receiver<ConditionsSignal>;

/// Polls device conditions on a fixed interval and reports changes.
pub struct Monitor {
    interval_ms: u64,
    source: Arc<dyn ConditionsSource>,
    device_state: DeviceState,
    watcher: ConditionsWatcher,
    signal_tx: mpsc::Sender<ConditionsSignal>,
    tick_count: u64,
}

impl Monitor {
    /// Create a monitor using the configured interval, trigger and threshold.
    /// Signals are delivered on the returned receiver.
    pub fn new(
        cfg: &JobgateCfg,
        source: Arc<dyn ConditionsSource>,
        device_state: DeviceState,
    ) -> (Self, SignalReceiver) {
        let (signal_tx, signal_rx) = mpsc::channel(64);
        let monitor = Self {
            interval_ms: cfg.watch_interval_ms.max(1),
            source,
            device_state,
            watcher: ConditionsWatcher::with_threshold(cfg.trigger(), cfg.battery_low_threshold),
            signal_tx,
            tick_count: 0,
        };
        (monitor, signal_rx)
    }

    /// Poll until `token` is cancelled. The first poll happens immediately.
    pub async fn run(&mut self, token: CancellationToken) {
        tracing::info!(interval_ms = self.interval_ms, "monitor started");
        let interval = Duration::from_millis(self.interval_ms);

        loop {
            for signal in self.tick() {
                if self.signal_tx.send(signal).await.is_err() {
                    tracing::debug!("signal receiver dropped");
                }
            }

            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!(tick_count = self.tick_count, "shutdown signal received, stopping monitor");
                    break;
                },
                _ = tokio::time::sleep(interval) => {},
            }
        }
    }

    /// Single poll: read conditions, feed the watcher, log what changed.
    fn tick(&mut self) -> Vec<ConditionsSignal> {
        self.tick_count += 1;
        let _span = tracing::debug_span!("tick", n = self.tick_count).entered();

        let device = match self.source.device_conditions() {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "reading device conditions failed, skipping tick");
                return Vec::new();
            }
        };
        let unmetered = self.device_state.is_unmetered_network_available();
        let signals = self.watcher.update(device, unmetered);

        for signal in &signals {
            tracing::info!(
                ?signal,
                power_connected = device.is_power_connected(),
                battery = device.battery_percentage(),
                network = %device.net_connection_type(),
                unmetered,
                "conditions changed"
            );
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::conditions::{ConnectionType, DeferReason, DeviceConditions};
    use crate::environment::network::{FixedNetworkInfoFactory, NetworkInfoSnapshot, PlatformError};

    struct Fixed(DeviceConditions);

    impl ConditionsSource for Fixed {
        fn device_conditions(&self) -> Result<DeviceConditions, PlatformError> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl ConditionsSource for Broken {
        fn device_conditions(&self) -> Result<DeviceConditions, PlatformError> {
            Err(PlatformError::Unavailable("power".into()))
        }
    }

    /// Power state flipped from the test while the monitor runs.
    struct Switchable(AtomicBool);

    impl ConditionsSource for Switchable {
        fn device_conditions(&self) -> Result<DeviceConditions, PlatformError> {
            let power = self.0.load(Ordering::SeqCst);
            Ok(DeviceConditions::new(power, 90, ConnectionType::Wifi))
        }
    }

    fn cfg() -> JobgateCfg {
        JobgateCfg { watch_interval_ms: 10, ..JobgateCfg::default() }
    }

    fn unmetered_state() -> DeviceState {
        DeviceState::new(Arc::new(FixedNetworkInfoFactory(NetworkInfoSnapshot::unmetered())))
    }

    #[tokio::test]
    async fn reports_initial_verdict_then_stops() {
        let source = Arc::new(Fixed(DeviceConditions::new(true, 90, ConnectionType::Wifi)));
        let (mut monitor, mut rx) = Monitor::new(&cfg(), source, unmetered_state());
        let token = CancellationToken::new();
        let handle = {
            let token = token.clone();
            tokio::spawn(async move {
                monitor.run(token).await;
                monitor.tick_count
            })
        };

        assert_eq!(rx.recv().await, Some(ConditionsSignal::TriggerMet));
        token.cancel();
        let ticks = handle.await.unwrap();
        assert!(ticks >= 1);
    }

    #[test]
    fn failed_snapshot_yields_no_signals() {
        let (mut monitor, _rx) = Monitor::new(&cfg(), Arc::new(Broken), unmetered_state());
        assert!(monitor.tick().is_empty());
        assert_eq!(monitor.tick_count, 1);
    }

    #[tokio::test]
    async fn forwards_changes_between_ticks() {
        let source = Arc::new(Switchable(AtomicBool::new(true)));
        let cfg = JobgateCfg { require_power_connected: true, ..cfg() };
        let (mut monitor, mut rx) = Monitor::new(&cfg, source.clone(), unmetered_state());
        let token = CancellationToken::new();
        let handle = {
            let token = token.clone();
            tokio::spawn(async move { monitor.run(token).await })
        };

        assert_eq!(rx.recv().await, Some(ConditionsSignal::TriggerMet));
        source.0.store(false, Ordering::SeqCst);
        assert_eq!(rx.recv().await, Some(ConditionsSignal::PowerDisconnected));
        assert_eq!(
            rx.recv().await,
            Some(ConditionsSignal::TriggerDeferred {
                reasons: vec![DeferReason::PowerDisconnected],
            })
        );

        token.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn keeps_configured_interval() {
        let cfg = JobgateCfg { watch_interval_ms: u64::MAX, ..cfg() };
        let (monitor, _rx) = Monitor::new(&cfg, Arc::new(Broken), unmetered_state());
        assert_eq!(monitor.interval_ms, u64::MAX);
    }
}
