use serde::{Deserialize, Serialize};

/// Type of the active network connection.
///
/// Numeric codes follow the browser network stack's connection-type table so
/// snapshots can be exchanged with callers that only speak integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Unknown,
    Ethernet,
    Wifi,
    TwoG,
    ThreeG,
    FourG,
    /// No active connection.
    None,
    Bluetooth,
}

impl ConnectionType {
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Ethernet => 1,
            Self::Wifi => 2,
            Self::TwoG => 3,
            Self::ThreeG => 4,
            Self::FourG => 5,
            Self::None => 6,
            Self::Bluetooth => 7,
        }
    }

    /// Map a numeric code back to a variant. Unrecognised codes become `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Ethernet,
            2 => Self::Wifi,
            3 => Self::TwoG,
            4 => Self::ThreeG,
            5 => Self::FourG,
            6 => Self::None,
            7 => Self::Bluetooth,
            _ => Self::Unknown,
        }
    }

    pub fn is_cellular(self) -> bool {
        matches!(self, Self::TwoG | Self::ThreeG | Self::FourG)
    }

    /// Connection kinds that are normally not billed per byte.
    pub fn is_typically_unmetered(self) -> bool {
        matches!(self, Self::Ethernet | Self::Wifi)
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Ethernet => "ethernet",
            Self::Wifi => "wifi",
            Self::TwoG => "2g",
            Self::ThreeG => "3g",
            Self::FourG => "4g",
            Self::None => "none",
            Self::Bluetooth => "bluetooth",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table() {
        assert_eq!(ConnectionType::Unknown.code(), 0);
        assert_eq!(ConnectionType::Wifi.code(), 2);
        assert_eq!(ConnectionType::None.code(), 6);
        assert_eq!(ConnectionType::Bluetooth.code(), 7);
        assert_eq!(ConnectionType::from_code(5), ConnectionType::FourG);
    }

    #[test]
    fn unknown_code_falls_back() {
        assert_eq!(ConnectionType::from_code(-1), ConnectionType::Unknown);
        assert_eq!(ConnectionType::from_code(42), ConnectionType::Unknown);
    }

    #[test]
    fn classification() {
        assert!(ConnectionType::ThreeG.is_cellular());
        assert!(!ConnectionType::Wifi.is_cellular());
        assert!(ConnectionType::Ethernet.is_typically_unmetered());
        assert!(!ConnectionType::Bluetooth.is_typically_unmetered());
        assert!(!ConnectionType::None.is_typically_unmetered());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ConnectionType::TwoG).unwrap();
        assert_eq!(json, "\"two_g\"");
    }
}
