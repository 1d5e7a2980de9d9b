//! Application core: pure domain logic, zero I/O.
//!
//! The fusion loop for the EchoSense sentry: calibration gating, the
//! three sampling tasks, and alert classification.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod context;
pub mod events;
pub mod ports;
pub mod service;
