//! Alert tone plans and the deadline-driven sequencer that plays them.
//!
//! Each alert class maps to a short list of `(frequency, duration)` steps.
//! The sequencer starts the first step, arms a [`Deadline`] for its end,
//! and returns.  Every later `advance()` either does nothing (step still
//! sounding), moves to the next step, or silences the buzzer after the
//! last one.  The control loop never sleeps inside a tone.
//!
//! | Class                 | Plan                         | Length |
//! |-----------------------|------------------------------|--------|
//! | `ProximityAndSound`   | high 100 ms, low 100 ms      | 200 ms |
//! | `ProximityOnly`       | short 50 ms                  | 50 ms  |
//! | `None`                | (empty)                      | 0      |

use heapless::Vec;
use log::debug;

use crate::alert::AlertClass;
use crate::app::ports::ActuatorPort;
use crate::config::SystemConfig;
use crate::scheduler::Deadline;

/// Longest plan, in steps.
pub const MAX_STEPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneStep {
    pub freq_hz: u32,
    pub duration_ms: u32,
}

pub type TonePlan = Vec<ToneStep, MAX_STEPS>;

/// Tone plan for an alert class.
pub fn plan_for(class: AlertClass, config: &SystemConfig) -> TonePlan {
    let steps: &[ToneStep] = match class {
        AlertClass::ProximityAndSound => &[
            ToneStep { freq_hz: config.tone_high_hz, duration_ms: config.tone_step_ms },
            ToneStep { freq_hz: config.tone_low_hz, duration_ms: config.tone_step_ms },
        ],
        AlertClass::ProximityOnly => &[ToneStep {
            freq_hz: config.tone_short_hz,
            duration_ms: config.tone_short_ms,
        }],
        AlertClass::None => &[],
    };
    // Never exceeds MAX_STEPS.
    Vec::from_slice(steps).unwrap_or_default()
}

/// Total length of a plan.
pub fn plan_duration_ms(plan: &TonePlan) -> u32 {
    plan.iter().map(|s| s.duration_ms).sum()
}

// ───────────────────────────────────────────────────────────────
// Sequencer
// ───────────────────────────────────────────────────────────────

/// Plays one plan at a time against the monotonic clock.
pub struct ToneSequencer {
    plan: TonePlan,
    step: usize,
    step_end: Deadline,
    sequences_played: u32,
}

impl Default for ToneSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneSequencer {
    pub fn new() -> Self {
        Self {
            plan: TonePlan::new(),
            step: 0,
            step_end: Deadline::idle(),
            sequences_played: 0,
        }
    }

    /// A step is sounding, or its deadline has not been serviced yet.
    pub fn is_playing(&self) -> bool {
        self.step_end.is_armed()
    }

    /// Start `plan` from its first step.  Ignored while a plan is playing
    /// or when the plan is empty.
    pub fn start(&mut self, plan: TonePlan, now_ms: u64, hw: &mut impl ActuatorPort) -> bool {
        if self.is_playing() || plan.is_empty() {
            return false;
        }
        debug!(
            "Tone: {} step(s), {} ms",
            plan.len(),
            plan_duration_ms(&plan)
        );
        self.plan = plan;
        self.step = 0;
        self.sequences_played = self.sequences_played.saturating_add(1);
        self.sound_step(now_ms, hw);
        true
    }

    /// Service the current step's deadline.
    ///
    /// Returns `true` on the call that finishes the plan.
    pub fn advance(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) -> bool {
        if !self.step_end.expired(now_ms) {
            return false;
        }
        self.step += 1;
        if self.step < self.plan.len() {
            self.sound_step(now_ms, hw);
            return false;
        }
        hw.silence();
        self.step_end.clear();
        self.plan.clear();
        self.step = 0;
        true
    }

    /// Abort immediately and silence the buzzer.
    pub fn stop(&mut self, hw: &mut impl ActuatorPort) {
        if self.is_playing() {
            hw.silence();
        }
        self.step_end.clear();
        self.plan.clear();
        self.step = 0;
    }

    pub fn sequences_played(&self) -> u32 {
        self.sequences_played
    }

    fn sound_step(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) {
        let step = self.plan[self.step];
        hw.tone(step.freq_hz);
        self.step_end.arm(now_ms, step.duration_ms);
    }
}
