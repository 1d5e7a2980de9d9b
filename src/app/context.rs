//! Shared fusion context.
//!
//! `FusionContext` is the single owned struct that holds every piece of
//! cross-task state: the latest range and acoustic readings and the
//! calibrator.  The service passes it by reference into each step, so
//! each field has exactly one writer and no globals exist.

use crate::alert::{self, AlertClass};
use crate::config::SystemConfig;
use crate::reporter::StatusReport;
use crate::sensors::acoustic::AcousticSampler;
use crate::sensors::calibration::Calibrator;
use crate::sensors::range::RangeSampler;

pub struct FusionContext {
    pub range: RangeSampler,
    pub acoustic: AcousticSampler,
    pub calibrator: Calibrator,
}

impl FusionContext {
    pub fn new(config: &SystemConfig, boot_ms: u64) -> Self {
        Self {
            range: RangeSampler::new(),
            acoustic: AcousticSampler::new(),
            calibrator: Calibrator::from_config(config, boot_ms),
        }
    }

    /// Alert class for the latest readings.
    pub fn alert_class(&self, config: &SystemConfig) -> AlertClass {
        alert::evaluate(
            self.range.latest().distance_cm,
            self.acoustic.latest().raw,
            self.calibrator.threshold(),
            config.proximity_threshold_cm,
        )
    }

    /// Status snapshot for the latest readings.
    pub fn report(&self, now_ms: u64, config: &SystemConfig) -> StatusReport {
        StatusReport::build(
            now_ms,
            &self.range.latest(),
            &self.acoustic.latest(),
            self.calibrator.threshold(),
            config.proximity_threshold_cm,
        )
    }

    pub fn is_warming_up(&self) -> bool {
        !self.calibrator.is_done()
    }
}
