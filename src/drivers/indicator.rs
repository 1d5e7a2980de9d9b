//! Sound-detected indicator LED.
//!
//! One active-high GPIO.  Writes are skipped when the level is unchanged,
//! the acoustic task drives it ten times a second.

use crate::drivers::hw_init;

pub struct IndicatorLed {
    gpio: i32,
    lit: bool,
}

impl IndicatorLed {
    pub fn new(gpio: i32) -> Self {
        hw_init::gpio_write(gpio, false);
        Self { gpio, lit: false }
    }

    pub fn set(&mut self, on: bool) {
        if on != self.lit {
            hw_init::gpio_write(self.gpio, on);
            self.lit = on;
        }
    }

    pub fn off(&mut self) {
        hw_init::gpio_write(self.gpio, false);
        self.lit = false;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
