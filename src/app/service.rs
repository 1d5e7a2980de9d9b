//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the fusion context, the scheduler, and the tone
//! sequencer.  All I/O flows through port traits injected at call sites,
//! so the whole loop body runs on the host against mock adapters.
//!
//! ```text
//!   RangePort    ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   AcousticPort ──▶ │          AppService          │
//!   ActuatorPort ◀── │ Calibrator · Scheduler · Alert│
//!                    └──────────────────────────────┘
//! ```
//!
//! Order within one tick:
//!
//! 1. calibration gating (close the warm-up window, emit READY once)
//! 2. scheduled tasks: range, acoustic, report (acoustic only while warming up)
//! 3. alert re-evaluation, every tick, not interval-gated

use log::{debug, info};

use crate::alert::AlertClass;
use crate::config::SystemConfig;
use crate::drivers::tone_patterns::{plan_for, ToneSequencer};
use crate::scheduler::Scheduler;
use crate::sensors::calibration::CalibrationPhase;

use super::context::FusionContext;
use super::events::AppEvent;
use super::ports::{AcousticPort, ActuatorPort, EventSink, RangePort, SchedulerDelegate, TaskKind};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    ctx: FusionContext,
    scheduler: Scheduler,
    tones: ToneSequencer,
    last_alert: AlertClass,
    alerts_emitted: u32,
    tick_count: u64,
}

impl AppService {
    /// Construct the service.  The warm-up window (if enabled) and every
    /// task timer are anchored at `boot_ms`.
    pub fn new(config: SystemConfig, boot_ms: u64) -> Self {
        let ctx = FusionContext::new(&config, boot_ms);
        let scheduler = Scheduler::new(&config, boot_ms);
        Self {
            config,
            ctx,
            scheduler,
            tones: ToneSequencer::new(),
            last_alert: AlertClass::None,
            alerts_emitted: 0,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put every actuator in its safe state and announce calibration.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        if self.config.calibration_enabled {
            sink.emit(&AppEvent::Calibrating);
        }
        info!(
            "AppService started ({:?} output, calibration {})",
            self.config.output_mode,
            if self.config.calibration_enabled { "on" } else { "off" }
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration at `now_ms`.
    ///
    /// The `hw` parameter satisfies all three hardware ports; this avoids
    /// a double mutable borrow while keeping the port boundary explicit.
    pub fn tick<H, S>(&mut self, now_ms: u64, hw: &mut H, sink: &mut S)
    where
        H: RangePort + AcousticPort + ActuatorPort,
        S: EventSink,
    {
        self.tick_count += 1;

        // 1. Calibration gating
        if let Some(out) = self.ctx.calibrator.poll(now_ms) {
            sink.emit(&AppEvent::Ready {
                min: out.min,
                max: out.max,
                threshold: out.threshold,
            });
        }
        let warming_up = self.ctx.is_warming_up();

        // 2. Scheduled tasks
        let mut tasks = TickTasks {
            ctx: &mut self.ctx,
            config: &self.config,
            hw: &mut *hw,
            sink: &mut *sink,
        };
        self.scheduler.tick(now_ms, warming_up, &mut tasks);

        if warming_up {
            return;
        }

        // 3. Alert re-evaluation
        self.alert_step(now_ms, hw, sink);
    }

    /// Classify the latest readings and drive the buzzer.
    ///
    /// While a tone plan is playing the stage only advances it; the next
    /// ALERT line and plan are issued once it has finished.
    fn alert_step(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let class = self.ctx.alert_class(&self.config);
        if class != self.last_alert {
            debug!("Alert: {} -> {}", self.last_alert, class);
            self.last_alert = class;
        }

        if self.tones.is_playing() {
            self.tones.advance(now_ms, hw);
            if self.tones.is_playing() {
                return;
            }
        }

        if class.is_active() {
            sink.emit(&AppEvent::Alert(class));
            self.alerts_emitted = self.alerts_emitted.saturating_add(1);
            self.tones.start(plan_for(class, &self.config), now_ms, hw);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn context(&self) -> &FusionContext {
        &self.ctx
    }

    pub fn calibration_phase(&self) -> CalibrationPhase {
        self.ctx.calibrator.phase()
    }

    /// Class computed on the most recent post-warm-up tick.
    pub fn last_alert(&self) -> AlertClass {
        self.last_alert
    }

    pub fn alerts_emitted(&self) -> u32 {
        self.alerts_emitted
    }

    pub fn is_sounding(&self) -> bool {
        self.tones.is_playing()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Borrows everything one tick's tasks touch, for the duration of
/// [`Scheduler::tick`].
struct TickTasks<'a, H, S> {
    ctx: &'a mut FusionContext,
    config: &'a SystemConfig,
    hw: &'a mut H,
    sink: &'a mut S,
}

impl<H, S> SchedulerDelegate for TickTasks<'_, H, S>
where
    H: RangePort + AcousticPort + ActuatorPort,
    S: EventSink,
{
    fn on_task_due(&mut self, task: TaskKind, now_ms: u64) {
        match task {
            TaskKind::Range => {
                self.ctx.range.sample(&mut *self.hw, now_ms);
            }
            TaskKind::Acoustic => {
                let sampled =
                    self.ctx
                        .acoustic
                        .sample(&mut *self.hw, &self.ctx.calibrator, now_ms);
                // A failed read is not a calibration sample.
                let Ok(reading) = sampled else {
                    return;
                };
                if let Some(p) = self.ctx.calibrator.observe(reading.raw, now_ms) {
                    self.sink.emit(&AppEvent::CalibrationProgress {
                        min: p.min,
                        max: p.max,
                        raw: p.raw,
                    });
                }
            }
            TaskKind::Report => {
                let report = self.ctx.report(now_ms, self.config);
                self.sink.emit(&AppEvent::Status(report));
            }
        }
    }
}
