//! Linux provider backed by sysfs and procfs.
//!
//! Roots are configurable so tests can point the reader at a fake tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::conditions::{ConnectionType, DeviceConditions};
use crate::environment::network::{NetworkInfo, NetworkInfoFactory, NetworkInfoSnapshot, PlatformError};

/// Route flag: route is usable.
const RTF_UP: u32 = 0x0001;
/// `/sys/class/net/<if>/type` value for Ethernet-framed links.
const ARPHRD_ETHER: &str = "1";

/// Power supply state read from `class/power_supply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerStatus {
    pub power_connected: bool,
    pub battery_percentage: i32,
}

/// Reads device conditions from the kernel's pseudo filesystems.
#[derive(Debug, Clone)]
pub struct SysfsHost {
    sys_root: PathBuf,
    proc_root: PathBuf,
    /// Interfaces the user declared as metered (e.g. a phone hotspot).
    metered_interfaces: Vec<String>,
}

impl SysfsHost {
    pub fn new(sys_root: impl Into<PathBuf>, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            sys_root: sys_root.into(),
            proc_root: proc_root.into(),
            metered_interfaces: Vec::new(),
        }
    }

    pub fn with_metered_interfaces<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metered_interfaces = names.into_iter().map(Into::into).collect();
        self
    }

    /// Interface carrying the default route, if any.
    pub fn active_interface(&self) -> Result<Option<String>, PlatformError> {
        let path = self.proc_root.join("net/route");
        match fs::read_to_string(&path) {
            Ok(table) => Ok(parse_default_route(&table)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PlatformError::Unavailable(
                format!("routing table {} not found", path.display()),
            )),
            Err(source) => Err(PlatformError::Io { path, source }),
        }
    }

    /// Classify an interface by its sysfs attributes.
    pub fn connection_type(&self, iface: &str) -> Result<ConnectionType, PlatformError> {
        let dir = self.net_dir(iface);
        let devtype = read_devtype(&dir)?;

        let kind = if dir.join("wireless").exists()
            || dir.join("phy80211").exists()
            || devtype.as_deref() == Some("wlan")
        {
            ConnectionType::Wifi
        } else if devtype.as_deref() == Some("bluetooth") || iface.starts_with("bnep") {
            ConnectionType::Bluetooth
        } else if devtype.as_deref() == Some("wwan") {
            // modem generation is not exposed here
            ConnectionType::Unknown
        } else if read_optional(&dir.join("type"))?.as_deref() == Some(ARPHRD_ETHER) {
            ConnectionType::Ethernet
        } else {
            ConnectionType::Unknown
        };
        Ok(kind)
    }

    /// Scan power supplies. Without a system battery the device is treated as
    /// mains-powered and full.
    pub fn power(&self) -> Result<PowerStatus, PlatformError> {
        let dir = self.sys_root.join("class/power_supply");
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(PowerStatus { power_connected: true, battery_percentage: 100 });
            }
            Err(source) => return Err(PlatformError::Io { path: dir, source }),
        };

        let mut supplies: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        supplies.sort();

        let mut external_online = false;
        let mut battery: Option<(i32, bool)> = None;

        for supply in &supplies {
            let Some(kind) = read_optional(&supply.join("type"))? else {
                continue;
            };
            if kind == "Mains" || kind.starts_with("USB") {
                if read_optional(&supply.join("online"))?.as_deref() == Some("1") {
                    external_online = true;
                }
            } else if kind == "Battery" && battery.is_none() {
                // peripheral batteries (mice, headsets) report scope=Device
                if read_optional(&supply.join("scope"))?.as_deref() == Some("Device") {
                    continue;
                }
                let Some(capacity) = read_optional(&supply.join("capacity"))?
                    .and_then(|v| v.parse::<i32>().ok())
                else {
                    continue;
                };
                let charging = matches!(
                    read_optional(&supply.join("status"))?.as_deref(),
                    Some("Charging" | "Full" | "Not charging")
                );
                battery = Some((capacity, charging));
            }
        }

        let status = match battery {
            Some((capacity, charging)) => PowerStatus {
                power_connected: external_online || charging,
                battery_percentage: capacity,
            },
            None => PowerStatus { power_connected: true, battery_percentage: 100 },
        };
        tracing::trace!(
            power_connected = status.power_connected,
            battery = status.battery_percentage,
            supplies = supplies.len(),
            "power supplies scanned"
        );
        Ok(status)
    }

    /// Full power + network snapshot.
    pub fn device_conditions(&self) -> Result<DeviceConditions, PlatformError> {
        let power = self.power()?;
        let net = match self.active_interface()? {
            Some(iface) => self.connection_type(&iface)?,
            None => ConnectionType::None,
        };
        Ok(DeviceConditions::new(power.power_connected, power.battery_percentage, net))
    }

    /// The five network checks for the active interface.
    pub fn network_snapshot(&self) -> Result<NetworkInfoSnapshot, PlatformError> {
        let Some(iface) = self.active_interface()? else {
            return Ok(NetworkInfoSnapshot::default());
        };
        let dir = self.net_dir(&iface);
        if !dir.is_dir() {
            tracing::debug!(%iface, "default route interface missing from sysfs");
            return Ok(NetworkInfoSnapshot::default());
        }

        let operstate = read_optional(&dir.join("operstate"))?.unwrap_or_else(|| "unknown".into());
        // reading carrier on a downed link fails with EINVAL
        let carrier = read_optional(&dir.join("carrier")).unwrap_or(None);
        let devtype = read_devtype(&dir)?;
        let kind = self.connection_type(&iface)?;

        let metered = devtype.as_deref() == Some("wwan")
            || kind == ConnectionType::Bluetooth
            || iface.starts_with("ppp")
            || iface.starts_with("wwan")
            || self.metered_interfaces.iter().any(|m| m == &iface);

        Ok(NetworkInfoSnapshot {
            valid: true,
            available: !matches!(operstate.as_str(), "down" | "notpresent" | "lowerlayerdown"),
            connected: operstate == "up" || (operstate == "unknown" && carrier.as_deref() == Some("1")),
            roaming: false,
            metered,
        })
    }

    fn net_dir(&self, iface: &str) -> PathBuf {
        self.sys_root.join("class/net").join(iface)
    }
}

impl NetworkInfoFactory for SysfsHost {
    fn network_info(&self) -> Result<Box<dyn NetworkInfo>, PlatformError> {
        Ok(Box::new(self.network_snapshot()?))
    }
}

/// Pick the default route with the lowest metric from `/proc/net/route`.
fn parse_default_route(table: &str) -> Option<String> {
    table
        .lines()
        .skip(1) // header
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 7 || fields[1] != "00000000" {
                return None;
            }
            let flags = u32::from_str_radix(fields[3], 16).ok()?;
            if flags & RTF_UP == 0 {
                return None;
            }
            let metric: u32 = fields[6].parse().ok()?;
            Some((metric, fields[0]))
        })
        .min_by_key(|(metric, _)| *metric)
        .map(|(_, iface)| iface.to_string())
}

fn read_devtype(dir: &Path) -> Result<Option<String>, PlatformError> {
    Ok(read_optional(&dir.join("uevent"))?.and_then(|uevent| {
        uevent
            .lines()
            .find_map(|l| l.strip_prefix("DEVTYPE="))
            .map(str::to_string)
    }))
}

/// Read and trim a file; a missing file is `None`.
fn read_optional(path: &Path) -> Result<Option<String>, PlatformError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s.trim().to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PlatformError::Io { path: path.to_path_buf(), source }),
    }
}
