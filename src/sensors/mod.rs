//! Sensor subsystem: the two samplers and the acoustic calibrator.
//!
//! Each sampler owns its latest reading and overwrites it in place every
//! time its task fires.  Everything else reads through the accessor; no
//! reading is ever written by two producers.

pub mod acoustic;
pub mod calibration;
pub mod range;

/// Wire value for "no echo within timeout".  Distinct from any real distance.
pub const DISTANCE_SENTINEL_CM: f32 = -1.0;

/// Latest ultrasonic measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeReading {
    /// Distance in centimetres, `None` when no echo arrived in time.
    pub distance_cm: Option<f32>,
    /// Monotonic time of the transaction (ms since boot).
    pub measured_at_ms: u64,
}

impl RangeReading {
    /// Distance as carried on the serial line: the sentinel when invalid.
    pub fn wire_distance(&self) -> f32 {
        self.distance_cm.unwrap_or(DISTANCE_SENTINEL_CM)
    }

    pub fn is_valid(&self) -> bool {
        self.distance_cm.is_some()
    }
}

/// Latest acoustic measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcousticReading {
    /// Raw ADC sample.
    pub raw: u16,
    /// Normalised level, 0 until calibration bounds exist.
    pub level_pct: u8,
    /// Monotonic time of the sample (ms since boot).
    pub measured_at_ms: u64,
}
