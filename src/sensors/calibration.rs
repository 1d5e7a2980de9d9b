//! Acoustic self-calibration.
//!
//! ```text
//!   WarmingUp ──(elapsed >= window)──▶ Done
//! ```
//!
//! One-way and one-shot.  While warming up every acoustic sample widens
//! the running bounds; on transition the detection threshold is derived
//! and the bounds freeze for the rest of the run.
//!
//! Progress is paced by a [`Deadline`] instead of a modulo window on the
//! clock: one progress record per `calibration_progress_ms`, regardless
//! of loop jitter.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::scheduler::Deadline;

/// Threshold sits this far above the noise floor, in percent of the span.
pub const THRESHOLD_RATIO_PERCENT: u32 = 30;

/// `min + 30 % of (max - min)`, truncated toward the floor.
///
/// Flat bounds collapse to `min`.
pub fn threshold_for(min: u16, max: u16) -> u16 {
    if max <= min {
        return min;
    }
    let span = (max - min) as u32;
    min + (span * THRESHOLD_RATIO_PERCENT / 100) as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    WarmingUp,
    Done,
}

/// Running bounds plus the sample that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationProgress {
    pub min: u16,
    pub max: u16,
    pub raw: u16,
}

/// Frozen result of a completed warm-up window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationOutcome {
    pub min: u16,
    pub max: u16,
    pub threshold: u16,
    pub samples: u32,
}

pub struct Calibrator {
    phase: CalibrationPhase,
    min_bound: u16,
    max_bound: u16,
    threshold: u16,
    window_start_ms: u64,
    window_ms: u32,
    progress_ms: u32,
    progress_due: Deadline,
    adc_max: u16,
    samples: u32,
}

impl Calibrator {
    /// Open the warm-up window at `now_ms`.
    pub fn start(config: &SystemConfig, now_ms: u64) -> Self {
        let mut progress_due = Deadline::idle();
        progress_due.arm(now_ms, config.calibration_progress_ms);
        info!(
            "Calibration: warm-up started ({} ms window)",
            config.calibration_window_ms
        );
        Self {
            phase: CalibrationPhase::WarmingUp,
            // Inverted so the first sample always widens both bounds.
            min_bound: config.adc_max,
            max_bound: 0,
            threshold: config.adc_max,
            window_start_ms: now_ms,
            window_ms: config.calibration_window_ms,
            progress_ms: config.calibration_progress_ms,
            progress_due,
            adc_max: config.adc_max,
            samples: 0,
        }
    }

    /// Skip the warm-up and use the configured fixed bounds.
    pub fn disabled(config: &SystemConfig) -> Self {
        let (min, max) = (config.uncalibrated_min_raw, config.uncalibrated_max_raw);
        Self {
            phase: CalibrationPhase::Done,
            min_bound: min,
            max_bound: max,
            threshold: threshold_for(min, max),
            window_start_ms: 0,
            window_ms: 0,
            progress_ms: config.calibration_progress_ms,
            progress_due: Deadline::idle(),
            adc_max: config.adc_max,
            samples: 0,
        }
    }

    /// Build whichever calibrator `config` asks for.
    pub fn from_config(config: &SystemConfig, now_ms: u64) -> Self {
        if config.calibration_enabled {
            Self::start(config, now_ms)
        } else {
            Self::disabled(config)
        }
    }

    /// Feed one acoustic sample.
    ///
    /// Returns a progress record when the pacing deadline has elapsed.
    /// Inert once `Done`.
    pub fn observe(&mut self, raw: u16, now_ms: u64) -> Option<CalibrationProgress> {
        if self.phase != CalibrationPhase::WarmingUp {
            return None;
        }

        self.min_bound = self.min_bound.min(raw);
        self.max_bound = self.max_bound.max(raw);
        self.samples = self.samples.saturating_add(1);

        if !self.progress_due.expired(now_ms) {
            return None;
        }
        self.progress_due.arm(now_ms, self.progress_ms);
        Some(CalibrationProgress {
            min: self.min_bound,
            max: self.max_bound,
            raw,
        })
    }

    /// Close the window once it has elapsed.
    ///
    /// Returns the outcome exactly once, on the transition tick.
    pub fn poll(&mut self, now_ms: u64) -> Option<CalibrationOutcome> {
        if self.phase != CalibrationPhase::WarmingUp {
            return None;
        }
        if now_ms.saturating_sub(self.window_start_ms) < self.window_ms as u64 {
            return None;
        }

        if self.samples == 0 {
            warn!("Calibration: no samples in warm-up window, detection disabled");
            self.min_bound = self.adc_max;
            self.max_bound = self.adc_max;
        } else if self.min_bound == self.max_bound {
            warn!("Calibration: flat signal at {}, level pinned to 0", self.min_bound);
        }

        self.threshold = threshold_for(self.min_bound, self.max_bound);
        self.phase = CalibrationPhase::Done;
        self.progress_due.clear();

        info!(
            "Calibration: done min={} max={} threshold={} ({} samples)",
            self.min_bound, self.max_bound, self.threshold, self.samples
        );

        Some(CalibrationOutcome {
            min: self.min_bound,
            max: self.max_bound,
            threshold: self.threshold,
            samples: self.samples,
        })
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == CalibrationPhase::Done
    }

    /// Frozen `(min, max)`, `None` while warming up.
    pub fn bounds(&self) -> Option<(u16, u16)> {
        self.is_done().then_some((self.min_bound, self.max_bound))
    }

    /// Detection threshold, `None` while warming up.
    pub fn threshold(&self) -> Option<u16> {
        self.is_done().then_some(self.threshold)
    }

    /// `raw > threshold`, strictly.  Never true before calibration.
    pub fn is_detected(&self, raw: u16) -> bool {
        self.threshold().is_some_and(|t| raw > t)
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }
}
