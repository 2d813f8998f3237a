use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conditions::TriggerConditions;
use crate::environment::sysfs::SysfsHost;

/// Prefix for environment variables overriding config fields.
pub const ENV_PREFIX: &str = "JOBGATE_";

/// All jobgate parameters. Loaded from `JOBGATE_*` environment variables;
/// anything missing or unparseable keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobgateCfg {
    // platform roots
    pub sys_root: String,
    pub proc_root: String,
    /// Comma-separated interface names to treat as metered.
    pub metered_interfaces: String,

    // monitor
    pub watch_interval_ms: u64,
    pub battery_low_threshold: i32,

    // default trigger conditions
    pub require_power_connected: bool,
    pub require_unmetered_network: bool,

    // logging
    pub log_json: bool,
}

impl Default for JobgateCfg {
    fn default() -> Self {
        Self {
            sys_root: "/sys".into(),
            proc_root: "/proc".into(),
            metered_interfaces: String::new(),
            watch_interval_ms: 5000,
            battery_low_threshold: 20,
            require_power_connected: false,
            require_unmetered_network: true,
            log_json: false,
        }
    }
}

impl JobgateCfg {
    /// Load config from the process environment.
    pub fn from_env() -> Self {
        let map: HashMap<String, String> = std::env::vars()
            .filter_map(|(k, v)| {
                k.strip_prefix(ENV_PREFIX)
                    .map(|key| (key.to_ascii_lowercase(), v))
            })
            .collect();
        let cfg = Self::from_map(&map);
        tracing::debug!(?cfg, overrides = map.len(), "config loaded");
        cfg
    }

    /// Build from a lowercase key → value map.
    pub fn from_map(m: &HashMap<String, String>) -> Self {
        let d = Self::default();
        Self {
            sys_root: get_or(m, "sys_root", d.sys_root),
            proc_root: get_or(m, "proc_root", d.proc_root),
            metered_interfaces: get_or(m, "metered_interfaces", d.metered_interfaces),
            watch_interval_ms: get_or(m, "watch_interval_ms", d.watch_interval_ms),
            battery_low_threshold: get_or(m, "battery_low_threshold", d.battery_low_threshold),
            require_power_connected: get_or(m, "require_power_connected", d.require_power_connected),
            require_unmetered_network: get_or(m, "require_unmetered_network", d.require_unmetered_network),
            log_json: get_or(m, "log_json", d.log_json),
        }
    }

    /// Configured default trigger conditions.
    pub fn trigger(&self) -> TriggerConditions {
        TriggerConditions::new(self.require_power_connected, self.require_unmetered_network)
    }

    pub fn metered_interface_list(&self) -> Vec<String> {
        self.metered_interfaces
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Sysfs/procfs reader rooted at the configured paths.
    pub fn sysfs_host(&self) -> SysfsHost {
        SysfsHost::new(&self.sys_root, &self.proc_root)
            .with_metered_interfaces(self.metered_interface_list())
    }
}

fn get_or<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str, default: T) -> T {
    map.get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
