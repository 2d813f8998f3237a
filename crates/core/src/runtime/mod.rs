mod monitor;
mod shutdown;

pub use monitor::{Monitor, SignalReceiver};
pub use shutdown::ShutdownGuard;
