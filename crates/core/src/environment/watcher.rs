use serde::Serialize;

use crate::conditions::gate::{self, DeferReason, GateResult};
use crate::conditions::{ConnectionType, DeviceConditions, TriggerConditions};

/// Battery level below which a `BatteryLow` signal fires while on battery.
pub const BATTERY_LOW_THRESHOLD: i32 = 20;

/// Change signal emitted by the watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ConditionsSignal {
    PowerConnected,
    PowerDisconnected,
    NetworkChanged {
        from: ConnectionType,
        to: ConnectionType,
    },
    /// Battery dropped below the threshold while unplugged.
    BatteryLow { percentage: i32 },
    /// The trigger conditions became satisfied.
    TriggerMet,
    /// The trigger conditions stopped being satisfied.
    TriggerDeferred { reasons: Vec<DeferReason> },
}

/// Watches condition snapshots and emits change signals.
#[derive(Debug)]
pub struct ConditionsWatcher {
    trigger: TriggerConditions,
    battery_low_threshold: i32,
    /// Last snapshot fed in.
    last_device: Option<DeviceConditions>,
    /// Last gate verdict; `None` forces the next update to report one.
    last_verdict: Option<GateResult>,
}

impl ConditionsWatcher {
    pub fn new(trigger: TriggerConditions) -> Self {
        Self::with_threshold(trigger, BATTERY_LOW_THRESHOLD)
    }

    pub fn with_threshold(trigger: TriggerConditions, battery_low_threshold: i32) -> Self {
        Self {
            trigger,
            battery_low_threshold,
            last_device: None,
            last_verdict: None,
        }
    }

    pub fn trigger(&self) -> &TriggerConditions {
        &self.trigger
    }

    /// Replace the trigger set. Returns true if it differed from the current one,
    /// in which case the next update reports a fresh verdict.
    pub fn set_trigger(&mut self, trigger: TriggerConditions) -> bool {
        if trigger == self.trigger {
            return false;
        }
        tracing::info!(
            require_power = trigger.require_power_connected(),
            require_unmetered = trigger.require_unmetered_network(),
            "trigger conditions changed"
        );
        self.trigger = trigger;
        self.last_verdict = None;
        true
    }

    /// Feed a snapshot and the current unmetered answer; returns any signals.
    pub fn update(&mut self, device: DeviceConditions, unmetered: bool) -> Vec<ConditionsSignal> {
        let mut signals = Vec::new();

        if let Some(prev) = self.last_device {
            match (prev.is_power_connected(), device.is_power_connected()) {
                (false, true) => signals.push(ConditionsSignal::PowerConnected),
                (true, false) => signals.push(ConditionsSignal::PowerDisconnected),
                _ => {}
            }

            if prev.net_connection_type() != device.net_connection_type() {
                signals.push(ConditionsSignal::NetworkChanged {
                    from: prev.net_connection_type(),
                    to: device.net_connection_type(),
                });
            }

            // Fire on the crossing, not on every sample below the threshold
            if self.is_low(&device) && !self.is_low(&prev) {
                signals.push(ConditionsSignal::BatteryLow {
                    percentage: device.battery_percentage(),
                });
            }
        }

        let verdict = gate::check(&self.trigger, &device, unmetered);
        if self.last_verdict.as_ref() != Some(&verdict) {
            signals.push(match &verdict {
                GateResult::Admitted => ConditionsSignal::TriggerMet,
                GateResult::Deferred(reasons) => ConditionsSignal::TriggerDeferred {
                    reasons: reasons.clone(),
                },
            });
        }

        self.last_device = Some(device);
        self.last_verdict = Some(verdict);
        signals
    }

    /// Last snapshot fed in.
    pub fn device(&self) -> Option<&DeviceConditions> {
        self.last_device.as_ref()
    }

    fn is_low(&self, device: &DeviceConditions) -> bool {
        !device.is_power_connected() && device.battery_percentage() < self.battery_low_threshold
    }
}
