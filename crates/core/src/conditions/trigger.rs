use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Set of device conditions a background job requires before it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriggerConditions {
    require_power_connected: bool,
    require_unmetered_network: bool,
}

impl TriggerConditions {
    pub fn new(require_power_connected: bool, require_unmetered_network: bool) -> Self {
        Self {
            require_power_connected,
            require_unmetered_network,
        }
    }

    /// Whether the device must be connected to power.
    pub fn require_power_connected(&self) -> bool {
        self.require_power_connected
    }

    /// Whether the active network must be unmetered.
    pub fn require_unmetered_network(&self) -> bool {
        self.require_unmetered_network
    }

    /// True when neither requirement is set.
    pub fn is_unconstrained(&self) -> bool {
        !self.require_power_connected && !self.require_unmetered_network
    }

    /// Stable hash: seed 13, multiply-by-31 accumulation over both flags.
    /// Equal values always yield the same code across processes.
    pub fn hash_code(&self) -> i32 {
        let mut hash: i32 = 13;
        hash = hash.wrapping_mul(31).wrapping_add(self.require_power_connected as i32);
        hash = hash.wrapping_mul(31).wrapping_add(self.require_unmetered_network as i32);
        hash
    }
}

impl Hash for TriggerConditions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}
