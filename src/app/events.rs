//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  One canonical event set;
//! the serial adapter picks a formatter (machine or human) at init and
//! renders every event through it.

use crate::alert::AlertClass;
use crate::reporter::StatusReport;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Warm-up window opened.  Only when calibration is enabled.
    Calibrating,

    /// Running bounds during warm-up, about once a second.
    CalibrationProgress { min: u16, max: u16, raw: u16 },

    /// Warm-up finished; bounds and threshold are frozen.  Exactly once.
    Ready { min: u16, max: u16, threshold: u16 },

    /// Periodic fused status snapshot.
    Status(StatusReport),

    /// An alert class is active this tick.  Never carries `AlertClass::None`.
    Alert(AlertClass),
}
