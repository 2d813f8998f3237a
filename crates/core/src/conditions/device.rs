use serde::{Deserialize, Serialize};

use super::connection::ConnectionType;

/// Device network and power conditions at the moment of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConditions {
    power_connected: bool,
    battery_percentage: i32,
    net_connection_type: ConnectionType,
}

impl DeviceConditions {
    /// Values are stored as given; no range checks.
    pub fn new(
        power_connected: bool,
        battery_percentage: i32,
        net_connection_type: ConnectionType,
    ) -> Self {
        Self {
            power_connected,
            battery_percentage,
            net_connection_type,
        }
    }

    pub fn is_power_connected(&self) -> bool {
        self.power_connected
    }

    pub fn battery_percentage(&self) -> i32 {
        self.battery_percentage
    }

    /// Active connection type. Use [`ConnectionType::code`] for the numeric value.
    pub fn net_connection_type(&self) -> ConnectionType {
        self.net_connection_type
    }
}

impl Default for DeviceConditions {
    /// Plugged in, full battery, on Wi-Fi.
    fn default() -> Self {
        Self::new(true, 100, ConnectionType::Wifi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_constructor_values() {
        let c = DeviceConditions::new(false, 37, ConnectionType::ThreeG);
        assert!(!c.is_power_connected());
        assert_eq!(c.battery_percentage(), 37);
        assert_eq!(c.net_connection_type(), ConnectionType::ThreeG);
        assert_eq!(c.net_connection_type().code(), 4);
    }

    #[test]
    fn out_of_range_battery_is_kept() {
        assert_eq!(DeviceConditions::new(true, -5, ConnectionType::None).battery_percentage(), -5);
        assert_eq!(DeviceConditions::new(true, 250, ConnectionType::None).battery_percentage(), 250);
    }

    #[test]
    fn default_is_plugged_in_on_wifi() {
        let c = DeviceConditions::default();
        assert!(c.is_power_connected());
        assert_eq!(c.battery_percentage(), 100);
        assert_eq!(c.net_connection_type(), ConnectionType::Wifi);
    }

    #[test]
    fn json_shape() {
        let c = DeviceConditions::new(true, 80, ConnectionType::Ethernet);
        let v = serde_json::to_value(c).unwrap();
        assert_eq!(v["power_connected"], true);
        assert_eq!(v["battery_percentage"], 80);
        assert_eq!(v["net_connection_type"], "ethernet");
    }
}
