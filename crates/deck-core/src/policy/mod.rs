//! Access policy - the single home of entitlement and device-lock rules
//!
//! Every access-control decision in the system routes through these
//! functions. They are pure: no I/O, no clock reads, no mutation.

mod device_lock;
mod entitlement;

pub use device_lock::{DeviceCheck, DeviceLockPolicy};
pub use entitlement::{evaluate_access, is_entitled, AccessDecision, Caller};
