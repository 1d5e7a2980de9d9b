//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod buzzer;
pub mod hw_init;
pub mod indicator;
pub mod tone_patterns;
pub mod watchdog;
