//! HC-SR04 ultrasonic ranger.
//!
//! A transaction holds the trigger low for a short guard period, raises
//! it for at least 10 us, then times the echo pulse.  The echo wait is
//! hard-capped by `echo_timeout_us` (30 ms by default, ~5 m), so the
//! control loop never stalls longer than that in here.
//!
//! The driver is generic over the `embedded-hal` 1.0 pin and delay traits
//! plus the firmware [`Clock`] port: on ESP-IDF it runs on the raw GPIO
//! wrappers from `hw_init`, on the host it runs on simulated pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use super::RangeReading;
use crate::app::ports::{Clock, RangePort};
use crate::config::SystemConfig;
use crate::error::SensorError;

/// Speed of sound, 0.034 cm/us, halved for the round trip.
pub const CM_PER_ECHO_US: f32 = 0.034 / 2.0;

/// Convert an echo high-time to a distance.
///
/// Zero means the transaction timed out and maps to `None`.  Distances
/// are quantised to the millimetre, the sensor's real resolution.
pub fn distance_from_echo_us(echo_us: u32) -> Option<f32> {
    if echo_us == 0 {
        return None;
    }
    let cm = echo_us as f32 * CM_PER_ECHO_US;
    Some((cm * 10.0).round() / 10.0)
}

// ───────────────────────────────────────────────────────────────
// Transaction driver
// ───────────────────────────────────────────────────────────────

/// Trigger and echo timing for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangerTiming {
    pub guard_us: u32,
    pub pulse_us: u32,
    pub echo_timeout_us: u32,
}

impl From<&SystemConfig> for RangerTiming {
    fn from(c: &SystemConfig) -> Self {
        Self {
            guard_us: c.trigger_guard_us,
            pulse_us: c.trigger_pulse_us.max(10),
            echo_timeout_us: c.echo_timeout_us,
        }
    }
}

/// Pulse-echo driver over one output (trigger) and one input (echo).
pub struct UltrasonicDriver<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
    timing: RangerTiming,
}

impl<T, E, D, C> UltrasonicDriver<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
{
    pub fn new(trigger: T, echo: E, delay: D, clock: C, timing: RangerTiming) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            timing,
        }
    }

    /// Run one transaction and return the echo high-time in microseconds.
    pub fn measure(&mut self) -> Result<u32, SensorError> {
        if self.echo_high()? {
            return Err(SensorError::EchoStuckHigh);
        }

        self.trigger.set_low().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(self.timing.guard_us);
        self.trigger.set_high().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(self.timing.pulse_us);
        self.trigger.set_low().map_err(|_| SensorError::PinFault)?;

        let timeout = self.timing.echo_timeout_us as u64;
        let start = self.clock.now_us();

        while !self.echo_high()? {
            if self.clock.now_us().saturating_sub(start) >= timeout {
                return Err(SensorError::EchoTimeout);
            }
        }
        let rise = self.clock.now_us();

        while self.echo_high()? {
            if self.clock.now_us().saturating_sub(start) >= timeout {
                return Err(SensorError::EchoTimeout);
            }
        }
        let fall = self.clock.now_us();

        Ok(fall.saturating_sub(rise) as u32)
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::PinFault)
    }
}

impl<T, E, D, C> RangePort for UltrasonicDriver<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
{
    fn measure_echo_us(&mut self) -> Result<u32, SensorError> {
        self.measure()
    }
}

// ───────────────────────────────────────────────────────────────
// RangeSampler
// ───────────────────────────────────────────────────────────────

/// Owns the latest [`RangeReading`].  Read-only to everything else.
#[derive(Debug, Default)]
pub struct RangeSampler {
    latest: RangeReading,
    failed_transactions: u32,
}

impl RangeSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one transaction and overwrite the latest reading.
    ///
    /// Any failure degrades to the invalid reading; there is no retry
    /// inside the tick, the next scheduled sample retries naturally.
    pub fn sample(&mut self, port: &mut impl RangePort, now_ms: u64) -> RangeReading {
        let distance_cm = match port.measure_echo_us() {
            Ok(echo_us) => distance_from_echo_us(echo_us),
            Err(e) => {
                self.failed_transactions = self.failed_transactions.saturating_add(1);
                debug!("Range: {} (no object)", e);
                None
            }
        };

        self.latest = RangeReading {
            distance_cm,
            measured_at_ms: now_ms,
        };
        self.latest
    }

    pub fn latest(&self) -> RangeReading {
        self.latest
    }

    /// Transactions that ended without a usable echo.
    pub fn failed_transactions(&self) -> u32 {
        self.failed_transactions
    }
}
