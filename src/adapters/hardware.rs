//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the ultrasonic ranger, the microphone, and both actuator drivers,
//! exposing them through [`RangePort`], [`AcousticPort`] and
//! [`ActuatorPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use log::warn;

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{AcousticPort, ActuatorPort, RangePort};
use crate::config::SystemConfig;
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::hw_init::{GpioInput, GpioOutput, RomDelay};
use crate::drivers::indicator::IndicatorLed;
use crate::error::SensorError;
use crate::pins;
use crate::sensors::acoustic::Microphone;
use crate::sensors::range::{RangerTiming, UltrasonicDriver};

/// The HC-SR04 as wired on the board.
pub type BoardRanger = UltrasonicDriver<GpioOutput, GpioInput, RomDelay, Esp32TimeAdapter>;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<R = BoardRanger> {
    ranger: R,
    mic: Microphone,
    buzzer: BuzzerDriver,
    indicator: IndicatorLed,
}

impl HardwareAdapter<BoardRanger> {
    /// Wire every driver to the pins in [`pins`].
    pub fn board(config: &SystemConfig) -> Self {
        let ranger = UltrasonicDriver::new(
            GpioOutput(pins::TRIG_GPIO),
            GpioInput(pins::ECHO_GPIO),
            RomDelay,
            Esp32TimeAdapter::new(),
            RangerTiming::from(config),
        );
        Self::new(
            ranger,
            Microphone::new(pins::MIC_ADC_GPIO, config.adc_max),
            BuzzerDriver::new(),
            IndicatorLed::new(pins::INDICATOR_LED_GPIO),
        )
    }
}

impl<R> HardwareAdapter<R> {
    pub fn new(ranger: R, mic: Microphone, buzzer: BuzzerDriver, indicator: IndicatorLed) -> Self {
        Self {
            ranger,
            mic,
            buzzer,
            indicator,
        }
    }

    pub fn buzzer(&self) -> &BuzzerDriver {
        &self.buzzer
    }

    pub fn indicator(&self) -> &IndicatorLed {
        &self.indicator
    }
}

// ── Sensor ports ──────────────────────────────────────────────

impl<R: RangePort> RangePort for HardwareAdapter<R> {
    fn measure_echo_us(&mut self) -> Result<u32, SensorError> {
        self.ranger.measure_echo_us()
    }
}

impl<R> AcousticPort for HardwareAdapter<R> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.mic.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<R> ActuatorPort for HardwareAdapter<R> {
    fn tone(&mut self, freq_hz: u32) {
        if let Err(e) = self.buzzer.tone(freq_hz) {
            warn!("Alert tone dropped: {}", e);
        }
    }

    fn silence(&mut self) {
        self.buzzer.silence();
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator.set(on);
    }

    fn all_off(&mut self) {
        self.buzzer.silence();
        self.indicator.off();
    }
}
