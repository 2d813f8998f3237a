//! Value types describing device state and job requirements.

pub mod connection;
pub mod device;
pub mod gate;
pub mod trigger;

pub use connection::ConnectionType;
pub use device::DeviceConditions;
pub use gate::{DeferReason, GateResult};
pub use trigger::TriggerConditions;
