//! GPIO / peripheral pin assignments for the EchoSense board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic ranger
// ---------------------------------------------------------------------------

/// Digital output: trigger pulse (active HIGH, >= 10 us).
pub const TRIG_GPIO: i32 = 5;
/// Digital input: echo pulse.  High time is the round-trip flight time.
/// The HC-SR04 echo is 5 V, routed through a divider to 3.3 V.
pub const ECHO_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Acoustic sensor (electret + amplifier, analog out)
// ---------------------------------------------------------------------------

/// Analog microphone output, ADC1 channel 6 (GPIO 34 on ESP32).
pub const MIC_ADC_GPIO: i32 = 34;
/// ADC1 channel number for the microphone.
pub const MIC_ADC_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Passive piezo buzzer, driven by LEDC square wave.
pub const BUZZER_GPIO: i32 = 25;
/// Sound-detected indicator LED (active HIGH, optional).
pub const INDICATOR_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  A 50 % duty square wave is all we need.
pub const BUZZER_PWM_RESOLUTION_BITS: u32 = 10;
/// LEDC base frequency at boot; retuned per tone.
pub const BUZZER_BASE_FREQ_HZ: u32 = 1_000;
