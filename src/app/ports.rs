//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (ranger, microphone, buzzer, serial line, clock)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every path runs on the host under test.

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Pulse-echo ranging transaction.
pub trait RangePort {
    /// Fire one trigger pulse and return the echo high-time in microseconds.
    ///
    /// Must return within the configured echo timeout.  A missing echo is
    /// reported as [`SensorError::EchoTimeout`], never as a zero width.
    fn measure_echo_us(&mut self) -> Result<u32, SensorError>;
}

/// One analog sample from the acoustic channel.
pub trait AcousticPort {
    /// Raw ADC sample in `[0, adc_max]`.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Start a continuous square-wave tone on the buzzer.
    fn tone(&mut self, freq_hz: u32);

    /// Silence the buzzer.
    fn silence(&mut self);

    /// Drive the sound indicator LED.
    fn set_indicator(&mut self, on: bool);

    /// Kill every actuator (safe boot state).
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → serial line)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide how they are presented.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock started at boot.
pub trait Clock {
    /// Microseconds since boot.
    fn now_us(&self) -> u64;

    /// Milliseconds since boot.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1_000
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the samplers)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a task interval elapses.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) knows nothing about
/// sensors or sinks; the service implements this to run the step.
pub trait SchedulerDelegate {
    /// Called once per fired task, in firing order.
    fn on_task_due(&mut self, task: TaskKind, now_ms: u64);
}

/// Discriminant passed to [`SchedulerDelegate::on_task_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Ultrasonic ranging (500 ms).
    Range,
    /// Acoustic sampling (100 ms).  The only task during warm-up.
    Acoustic,
    /// Status report emission (200 ms).
    Report,
}
