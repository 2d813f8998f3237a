use serde::Serialize;

use super::device::DeviceConditions;
use super::trigger::TriggerConditions;

/// Why a job was held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferReason {
    PowerDisconnected,
    NetworkMetered,
}

/// Gate decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reasons", rename_all = "snake_case")]
pub enum GateResult {
    Admitted,
    Deferred(Vec<DeferReason>),
}

impl GateResult {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Check whether a job with the given trigger conditions may run under the
/// current device snapshot. `unmetered` is the answer from
/// [`DeviceState`](crate::environment::network::DeviceState).
pub fn check(
    trigger: &TriggerConditions,
    device: &DeviceConditions,
    unmetered: bool,
) -> GateResult {
    let mut reasons = Vec::new();

    if trigger.require_power_connected() && !device.is_power_connected() {
        reasons.push(DeferReason::PowerDisconnected);
    }
    if trigger.require_unmetered_network() && !unmetered {
        reasons.push(DeferReason::NetworkMetered);
    }

    if reasons.is_empty() {
        GateResult::Admitted
    } else {
        GateResult::Deferred(reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::connection::ConnectionType;

    fn on_battery() -> DeviceConditions {
        DeviceConditions::new(false, 60, ConnectionType::FourG)
    }

    #[test]
    fn unconstrained_always_admits() {
        let t = TriggerConditions::default();
        assert_eq!(check(&t, &on_battery(), false), GateResult::Admitted);
    }

    #[test]
    fn defers_on_battery() {
        let t = TriggerConditions::new(true, false);
        assert_eq!(
            check(&t, &on_battery(), true),
            GateResult::Deferred(vec![DeferReason::PowerDisconnected])
        );
    }

    #[test]
    fn reports_both_reasons_in_order() {
        let t = TriggerConditions::new(true, true);
        assert_eq!(
            check(&t, &on_battery(), false),
            GateResult::Deferred(vec![
                DeferReason::PowerDisconnected,
                DeferReason::NetworkMetered
            ])
        );
    }

    #[test]
    fn admits_when_all_met() {
        let t = TriggerConditions::new(true, true);
        let plugged = DeviceConditions::new(true, 10, ConnectionType::Wifi);
        assert!(check(&t, &plugged, true).is_admitted());
    }

    #[test]
    fn json_shape() {
        let deferred = GateResult::Deferred(vec![DeferReason::NetworkMetered]);
        let v = serde_json::to_value(&deferred).unwrap();
        assert_eq!(v["result"], "deferred");
        assert_eq!(v["reasons"][0], "network_metered");
        let v = serde_json::to_value(GateResult::Admitted).unwrap();
        assert_eq!(v["result"], "admitted");
    }
}
