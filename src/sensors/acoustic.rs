//! Electret microphone (analog amplifier output) and the acoustic sampler.
//!
//! The sampler maps each raw sample onto `[0, 100]` against the frozen
//! calibration bounds and mirrors `raw > threshold` onto the indicator
//! LED.  The indicator is a direct reflection of the instantaneous
//! sample, not of the alert state.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH6 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use log::warn;

use super::calibration::Calibrator;
use super::AcousticReading;
use crate::app::ports::{AcousticPort, ActuatorPort};
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_MIC_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_MIC_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_mic_adc(raw: u16) {
    SIM_MIC_ADC.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_mic_fault(fault: bool) {
    SIM_MIC_FAULT.store(fault, Ordering::Relaxed);
}

/// Clamped linear map of `raw` from `[min, max]` onto `[0, 100]`,
/// rounded half-up.  Flat or inverted bounds give 0.
pub fn level_pct(raw: u16, min: u16, max: u16) -> u8 {
    if max <= min {
        return 0;
    }
    let raw = raw.clamp(min, max);
    let span = (max - min) as u32;
    let scaled = ((raw - min) as u32 * 100 + span / 2) / span;
    scaled.min(100) as u8
}

// ───────────────────────────────────────────────────────────────
// Microphone driver
// ───────────────────────────────────────────────────────────────

pub struct Microphone {
    adc_max: u16,
    total_reads: u32,
    _adc_gpio: i32,
}

impl Microphone {
    pub fn new(adc_gpio: i32, adc_max: u16) -> Self {
        Self {
            adc_max,
            total_reads: 0,
            _adc_gpio: adc_gpio,
        }
    }

    /// One raw sample, clamped to `adc_max`.
    pub fn read(&mut self) -> Result<u16, SensorError> {
        self.total_reads = self.total_reads.saturating_add(1);
        let raw = self.read_adc().ok_or(SensorError::AdcReadFailed)?;
        Ok(raw.min(self.adc_max))
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        use crate::drivers::hw_init;
        hw_init::adc1_read(hw_init::ADC1_CH_MIC)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        if SIM_MIC_FAULT.load(Ordering::Relaxed) {
            return None;
        }
        Some(SIM_MIC_ADC.load(Ordering::Relaxed))
    }
}

impl AcousticPort for Microphone {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.read()
    }
}

// ───────────────────────────────────────────────────────────────
// AcousticSampler
// ───────────────────────────────────────────────────────────────

/// Owns the latest [`AcousticReading`].
#[derive(Debug, Default)]
pub struct AcousticSampler {
    latest: AcousticReading,
    read_failures: u32,
}

impl AcousticSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one sample, normalise it, and drive the indicator.
    ///
    /// On a failed read the previous reading is kept and the error is
    /// returned so the caller can skip calibration for this slot.
    pub fn sample<H>(
        &mut self,
        hw: &mut H,
        calibrator: &Calibrator,
        now_ms: u64,
    ) -> Result<AcousticReading, SensorError>
    where
        H: AcousticPort + ActuatorPort,
    {
        let raw = match hw.read_raw() {
            Ok(raw) => raw,
            Err(e) => {
                self.read_failures = self.read_failures.saturating_add(1);
                warn!("Acoustic: {} (keeping raw={})", e, self.latest.raw);
                return Err(e);
            }
        };

        let level_pct = calibrator
            .bounds()
            .map_or(0, |(min, max)| level_pct(raw, min, max));

        hw.set_indicator(calibrator.is_detected(raw));

        self.latest = AcousticReading {
            raw,
            level_pct,
            measured_at_ms: now_ms,
        };
        Ok(self.latest)
    }

    pub fn latest(&self) -> AcousticReading {
        self.latest
    }

    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }
}
