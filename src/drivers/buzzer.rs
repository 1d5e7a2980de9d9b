//! Passive piezo buzzer driver.
//!
//! A 50 % duty LEDC square wave on one channel; the timer is retuned for
//! each tone.  Pitch and timing are decided by the tone sequencer, this
//! driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives LEDC CH0 via hw_init.
//! On host/test: tracks state in-memory only.

use log::warn;

use crate::drivers::hw_init;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerState {
    Silent,
    Sounding { freq_hz: u32 },
}

pub struct BuzzerDriver {
    state: BuzzerState,
    tones_started: u32,
}

impl Default for BuzzerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl BuzzerDriver {
    pub fn new() -> Self {
        Self {
            state: BuzzerState::Silent,
            tones_started: 0,
        }
    }

    pub fn tone(&mut self, freq_hz: u32) -> Result<(), ActuatorError> {
        if let Err(rc) = hw_init::buzzer_tone(freq_hz) {
            warn!("Buzzer: {} Hz rejected (rc={})", freq_hz, rc);
            self.silence();
            return Err(ActuatorError::ToneFrequencyRejected);
        }
        self.tones_started = self.tones_started.saturating_add(1);
        self.state = BuzzerState::Sounding { freq_hz };
        Ok(())
    }

    pub fn silence(&mut self) {
        hw_init::buzzer_silence();
        self.state = BuzzerState::Silent;
    }

    pub fn state(&self) -> BuzzerState {
        self.state
    }

    pub fn is_sounding(&self) -> bool {
        matches!(self.state, BuzzerState::Sounding { .. })
    }

    pub fn tones_started(&self) -> u32 {
        self.tones_started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_then_silence() {
        let mut b = BuzzerDriver::new();
        b.tone(2000).unwrap();
        assert_eq!(b.state(), BuzzerState::Sounding { freq_hz: 2000 });
        b.silence();
        assert!(!b.is_sounding());
        assert_eq!(b.tones_started(), 1);
    }

    #[test]
    fn rejected_frequency_leaves_buzzer_silent() {
        let mut b = BuzzerDriver::new();
        b.tone(1500).unwrap();
        assert_eq!(b.tone(0), Err(ActuatorError::ToneFrequencyRejected));
        assert_eq!(b.state(), BuzzerState::Silent);
    }
}
