//! Cooperative time-slice scheduler.
//!
//! One loop, no preemption.  Each sampling task owns an [`IntervalTimer`]
//! measured against the same monotonic millisecond clock.  When a timer
//! elapses the scheduler notifies a [`SchedulerDelegate`]; the
//! [`AppService`](crate::app::service::AppService) implements the
//! delegate and runs the matching step function.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Scheduler.tick(now)                    │
//! │                                                              │
//! │   warming up? ──yes──▶ Acoustic only                         │
//! │        │                                                     │
//! │        no                                                    │
//! │        ▼                                                     │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐                 │
//! │  │ Range     │─▶│ Acoustic  │─▶│ Report    │                 │
//! │  │ 500 ms    │  │ 100 ms    │  │ 200 ms    │                 │
//! │  └───────────┘  └───────────┘  └───────────┘                 │
//! │        │              │              │                       │
//! │        ▼              ▼              ▼                       │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate::on_task_due            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A late iteration is absorbed: the timer re-arms from `now`, so ticks
//! are never queued or duplicated.  Drift is tolerated, not corrected.

use crate::app::ports::{SchedulerDelegate, TaskKind};
use crate::config::SystemConfig;

// ═══════════════════════════════════════════════════════════════
//  Deadline
// ═══════════════════════════════════════════════════════════════

/// A single resumption time on the monotonic clock.
///
/// Used wherever the loop would otherwise spin-wait: tone steps and
/// calibration progress pacing arm a deadline and yield back to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    at_ms: Option<u64>,
}

impl Deadline {
    /// A deadline that is not armed.
    pub const fn idle() -> Self {
        Self { at_ms: None }
    }

    /// Arm to fire `delay_ms` after `now_ms`.
    pub fn arm(&mut self, now_ms: u64, delay_ms: u32) {
        self.at_ms = Some(now_ms.saturating_add(delay_ms as u64));
    }

    pub fn clear(&mut self) {
        self.at_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at_ms.is_some()
    }

    /// Armed and reached.
    pub fn expired(&self, now_ms: u64) -> bool {
        self.at_ms.is_some_and(|at| now_ms >= at)
    }

    /// Milliseconds left, or `None` when idle.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.at_ms.map(|at| at.saturating_sub(now_ms))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Interval timer
// ═══════════════════════════════════════════════════════════════

/// Fires when `now - last_fired >= interval`, then re-arms from `now`.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval_ms: u32,
    last_fired_ms: u64,
}

impl IntervalTimer {
    pub fn new(interval_ms: u32, start_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_ms: start_ms,
        }
    }

    /// Check the wall-clock delta.  Returns `true` at most once per call.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_fired_ms) >= self.interval_ms as u64 {
            self.last_fired_ms = now_ms;
            true
        } else {
            false
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn last_fired_ms(&self) -> u64 {
        self.last_fired_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// The scheduler engine.
///
/// Decoupled from the samplers: it only knows timers and task kinds.
/// Firing order within one tick is fixed: range, acoustic, report.
pub struct Scheduler {
    range: IntervalTimer,
    acoustic: IntervalTimer,
    report: IntervalTimer,
    /// Ticks processed since boot.
    ticks: u64,
}

impl Scheduler {
    /// Build the three task timers, all anchored at `boot_ms`.
    pub fn new(config: &SystemConfig, boot_ms: u64) -> Self {
        Self {
            range: IntervalTimer::new(config.range_interval_ms, boot_ms),
            acoustic: IntervalTimer::new(config.acoustic_interval_ms, boot_ms),
            report: IntervalTimer::new(config.report_interval_ms, boot_ms),
            ticks: 0,
        }
    }

    /// Tick the scheduler.  Call once per loop iteration.
    ///
    /// * `now_ms`: monotonic milliseconds since boot.
    /// * `warming_up`: while the acoustic channel calibrates, only the
    ///   acoustic task is polled; the others are skipped this tick.
    /// * `delegate`: receives one `on_task_due` per fired task.
    pub fn tick(&mut self, now_ms: u64, warming_up: bool, delegate: &mut dyn SchedulerDelegate) {
        self.ticks += 1;

        if warming_up {
            if self.acoustic.poll(now_ms) {
                delegate.on_task_due(TaskKind::Acoustic, now_ms);
            }
            return;
        }

        if self.range.poll(now_ms) {
            delegate.on_task_due(TaskKind::Range, now_ms);
        }
        if self.acoustic.poll(now_ms) {
            delegate.on_task_due(TaskKind::Acoustic, now_ms);
        }
        if self.report.poll(now_ms) {
            delegate.on_task_due(TaskKind::Report, now_ms);
        }
    }

    /// Number of ticks processed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
