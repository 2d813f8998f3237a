pub mod network;
pub mod sysfs;
pub mod watcher;

use crate::conditions::DeviceConditions;
use network::PlatformError;

/// Anything that can take a [`DeviceConditions`] snapshot.
pub trait ConditionsSource: Send + Sync {
    fn device_conditions(&self) -> Result<DeviceConditions, PlatformError>;
}

impl ConditionsSource for sysfs::SysfsHost {
    fn device_conditions(&self) -> Result<DeviceConditions, PlatformError> {
        sysfs::SysfsHost::device_conditions(self)
    }
}
