//! System configuration parameters
//!
//! All tunable parameters for the EchoSense sentry.
//! Values are fixed at boot; nothing here is switchable at runtime.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Presentation of the serial status stream.
///
/// Selected once at initialisation.  The two modes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    /// Tagged, machine-parsable lines (`DATA:{...}`, `ALERT:...`).
    Machine,
    /// Free-form console text carrying the same readings.
    Human,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Ultrasonic ranging interval (milliseconds)
    pub range_interval_ms: u32,
    /// Acoustic sampling interval (milliseconds)
    pub acoustic_interval_ms: u32,
    /// Status report interval (milliseconds)
    pub report_interval_ms: u32,
    /// Idle yield between main-loop iterations (milliseconds)
    pub loop_idle_ms: u32,

    // --- Ranging ---
    /// Echo wait bound (microseconds)
    pub echo_timeout_us: u32,
    /// Trigger held low before the pulse (microseconds)
    pub trigger_guard_us: u32,
    /// Trigger pulse width (microseconds, >= 10)
    pub trigger_pulse_us: u32,
    /// Proximity predicate upper bound (cm, strict)
    pub proximity_threshold_cm: f32,

    // --- Acoustic calibration ---
    /// Run the warm-up window at boot
    pub calibration_enabled: bool,
    /// Warm-up window length (milliseconds)
    pub calibration_window_ms: u32,
    /// Pacing of CALIBRATION progress lines (milliseconds)
    pub calibration_progress_ms: u32,
    /// Largest raw sample the ADC can return
    pub adc_max: u16,
    /// Lower bound used when calibration is disabled
    pub uncalibrated_min_raw: u16,
    /// Upper bound used when calibration is disabled
    pub uncalibrated_max_raw: u16,

    // --- Audible alert ---
    /// First tone of the proximity + sound sequence (Hz)
    pub tone_high_hz: u32,
    /// Second tone of the proximity + sound sequence (Hz)
    pub tone_low_hz: u32,
    /// Proximity-only chirp (Hz)
    pub tone_short_hz: u32,
    /// Duration of each proximity + sound tone (milliseconds)
    pub tone_step_ms: u32,
    /// Duration of the proximity-only chirp (milliseconds)
    pub tone_short_ms: u32,

    // --- Output ---
    pub output_mode: OutputMode,

    // --- Supervision ---
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            range_interval_ms: 500,   // 2 Hz
            acoustic_interval_ms: 100, // 10 Hz
            report_interval_ms: 200,  // 5 Hz
            loop_idle_ms: 5,

            // Ranging
            echo_timeout_us: 30_000, // ~5 m round trip
            trigger_guard_us: 2,
            trigger_pulse_us: 10,
            proximity_threshold_cm: 20.0,

            // Calibration
            calibration_enabled: true,
            calibration_window_ms: 10_000,
            calibration_progress_ms: 1_000,
            adc_max: 4095, // 12-bit ADC1
            uncalibrated_min_raw: 0,
            uncalibrated_max_raw: 4095,

            // Alert tones
            tone_high_hz: 2000,
            tone_low_hz: 1500,
            tone_short_hz: 1000,
            tone_step_ms: 100,
            tone_short_ms: 50,

            output_mode: OutputMode::Machine,

            watchdog_timeout_ms: 5_000,
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults,
    /// then validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed config JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.range_interval_ms == 0
            || self.acoustic_interval_ms == 0
            || self.report_interval_ms == 0
        {
            return Err(Error::Config("sampling intervals must be non-zero"));
        }
        if self.echo_timeout_us == 0 {
            return Err(Error::Config("echo timeout must be non-zero"));
        }
        if self.trigger_pulse_us < 10 {
            return Err(Error::Config("trigger pulse must be at least 10 us"));
        }
        if self.proximity_threshold_cm.is_nan() || self.proximity_threshold_cm <= 0.0 {
            return Err(Error::Config("proximity threshold must be positive"));
        }
        if self.adc_max == 0 {
            return Err(Error::Config("adc_max must be non-zero"));
        }
        if self.uncalibrated_min_raw > self.uncalibrated_max_raw
            || self.uncalibrated_max_raw > self.adc_max
        {
            return Err(Error::Config("uncalibrated bounds out of order"));
        }
        if self.calibration_enabled
            && (self.calibration_window_ms == 0 || self.calibration_progress_ms == 0)
        {
            return Err(Error::Config("calibration timing must be non-zero"));
        }
        if self.tone_high_hz == 0 || self.tone_low_hz == 0 || self.tone_short_hz == 0 {
            return Err(Error::Config("tone frequencies must be non-zero"));
        }
        if self.tone_step_ms == 0 || self.tone_short_ms == 0 {
            return Err(Error::Config("tone durations must be non-zero"));
        }
        Ok(())
    }
}
