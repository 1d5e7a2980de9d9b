//! Mock hardware, sink and clock for integration tests.
//!
//! `MockHardware` plays back scripted echo widths and microphone samples
//! and records every actuator call, so tests can assert on the full
//! command history without touching real GPIO/ADC/LEDC registers.

use std::cell::Cell;
use std::collections::VecDeque;

use echosense::alert::AlertClass;
use echosense::app::events::AppEvent;
use echosense::app::ports::{AcousticPort, ActuatorPort, Clock, EventSink, RangePort};
use echosense::app::service::AppService;
use echosense::error::SensorError;
use echosense::reporter::StatusReport;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Tone(u32),
    Silence,
    Indicator(bool),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Result of every ranging transaction.
    pub echo: Result<u32, SensorError>,
    /// Microphone samples consumed first, in order.
    pub raw_script: VecDeque<Result<u16, SensorError>>,
    /// Microphone sample once the script is exhausted.
    pub raw: Result<u16, SensorError>,
    pub calls: Vec<ActuatorCall>,
    pub range_reads: u32,
    pub acoustic_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            echo: Err(SensorError::EchoTimeout),
            raw_script: VecDeque::new(),
            raw: Ok(0),
            calls: Vec::new(),
            range_reads: 0,
            acoustic_reads: 0,
        }
    }

    pub fn tones(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Tone(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    pub fn buzzer_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Tone(_) => Some(true),
                ActuatorCall::Silence | ActuatorCall::AllOff => Some(false),
                ActuatorCall::Indicator(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn indicator_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Indicator(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl RangePort for MockHardware {
    fn measure_echo_us(&mut self) -> Result<u32, SensorError> {
        self.range_reads += 1;
        self.echo
    }
}

impl AcousticPort for MockHardware {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.acoustic_reads += 1;
        self.raw_script.pop_front().unwrap_or(self.raw)
    }
}

impl ActuatorPort for MockHardware {
    fn tone(&mut self, freq_hz: u32) {
        self.calls.push(ActuatorCall::Tone(freq_hz));
    }

    fn silence(&mut self) {
        self.calls.push(ActuatorCall::Silence);
    }

    fn set_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Indicator(on));
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<StatusReport> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Status(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<AlertClass> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Alert(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Monotonic clock the test advances by hand.
#[derive(Default)]
pub struct ManualClock {
    now_us: Cell<u64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at_ms(ms: u64) -> Self {
        Self {
            now_us: Cell::new(ms * 1_000),
        }
    }

    pub fn set_ms(&self, ms: u64) {
        self.now_us.set(ms * 1_000);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_us.set(self.now_us.get() + ms * 1_000);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.now_us.get()
    }
}

// ── Loop driver ───────────────────────────────────────────────

/// Tick the service every `step_ms` from the clock's current time up to
/// and including `until_ms`.
pub fn run_until(
    app: &mut AppService,
    clock: &ManualClock,
    hw: &mut MockHardware,
    sink: &mut impl EventSink,
    until_ms: u64,
    step_ms: u64,
) {
    while clock.now_ms() <= until_ms {
        app.tick(clock.now_ms(), hw, sink);
        clock.advance_ms(step_ms);
    }
}

/// Run the warm-up window on a flat `lo` signal with one `hi` spike,
/// leaving the clock at 10 000 ms (the transition tick).
#[allow(dead_code)]
pub fn warm_up(
    app: &mut AppService,
    clock: &ManualClock,
    hw: &mut MockHardware,
    sink: &mut impl EventSink,
    lo: u16,
    hi: u16,
) {
    hw.raw_script.extend(std::iter::repeat_n(Ok(lo), 50));
    hw.raw_script.push_back(Ok(hi));
    hw.raw = Ok(lo);
    run_until(app, clock, hw, sink, 9_990, 10);
}
