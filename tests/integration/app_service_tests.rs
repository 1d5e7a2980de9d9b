//! Integration tests for the AppService → scheduler → samplers → alert
//! pipeline.
//!
//! These run on the host (x86_64) and drive the full loop body through
//! mock ports with a hand-advanced clock.

use crate::mock_hw::{run_until, warm_up, ActuatorCall, ManualClock, MockHardware, RecordingSink};

use echosense::alert::AlertClass;
use echosense::app::events::AppEvent;
use echosense::app::ports::Clock;
use echosense::app::service::AppService;
use echosense::config::SystemConfig;
use echosense::error::SensorError;
use echosense::sensors::calibration::CalibrationPhase;

fn boot(config: SystemConfig) -> (AppService, ManualClock, MockHardware, RecordingSink) {
    let clock = ManualClock::at_ms(0);
    let mut app = AppService::new(config, clock.now_ms());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, clock, hw, sink)
}

/// Booted, calibrated to 300..900 (threshold 480), events cleared.
fn calibrated() -> (AppService, ManualClock, MockHardware, RecordingSink) {
    let (mut app, clock, mut hw, mut sink) = boot(SystemConfig::default());
    warm_up(&mut app, &clock, &mut hw, &mut sink, 300, 900);
    sink.clear();
    hw.calls.clear();
    (app, clock, hw, sink)
}

fn is_ready(e: &AppEvent) -> bool {
    matches!(e, AppEvent::Ready { .. })
}

// ── Boot and warm-up ──────────────────────────────────────────

#[test]
fn boot_silences_actuators_and_announces_calibration() {
    let (_app, _clock, hw, sink) = boot(SystemConfig::default());
    assert_eq!(hw.calls, vec![ActuatorCall::AllOff]);
    assert_eq!(sink.events, vec![AppEvent::Calibrating]);
}

#[test]
fn warm_up_runs_only_the_acoustic_task() {
    let (mut app, clock, mut hw, mut sink) = boot(SystemConfig::default());
    hw.echo = Ok(882);
    hw.raw = Ok(900);
    run_until(&mut app, &clock, &mut hw, &mut sink, 9_990, 10);

    assert_eq!(app.calibration_phase(), CalibrationPhase::WarmingUp);
    assert_eq!(hw.range_reads, 0);
    assert_eq!(hw.acoustic_reads, 99);
    assert!(sink.statuses().is_empty());
    assert!(sink.alerts().is_empty(), "no alerts while warming up");
    assert!(hw.tones().is_empty());
    assert!(!hw.indicator_on(), "nothing is detected before a threshold exists");
}

#[test]
fn progress_lines_arrive_about_once_a_second() {
    let (mut app, clock, mut hw, mut sink) = boot(SystemConfig::default());
    warm_up(&mut app, &clock, &mut hw, &mut sink, 300, 900);

    let progress: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CalibrationProgress { min, max, raw } => Some((*min, *max, *raw)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 9);
    assert_eq!(progress[0], (300, 300, 300));
    // The spike is sample 51, at 5 100 ms.
    assert_eq!(progress[5], (300, 900, 300));
}

#[test]
fn ready_is_emitted_exactly_once_with_derived_threshold() {
    let (mut app, clock, mut hw, mut sink) = boot(SystemConfig::default());
    warm_up(&mut app, &clock, &mut hw, &mut sink, 300, 900);
    run_until(&mut app, &clock, &mut hw, &mut sink, 20_000, 10);

    assert_eq!(sink.count(is_ready), 1);
    let ready = sink.events.iter().position(is_ready).unwrap();
    assert_eq!(
        sink.events[ready],
        AppEvent::Ready { min: 300, max: 900, threshold: 480 }
    );
    let first_status = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::Status(_)))
        .unwrap();
    assert!(ready < first_status, "READY precedes the first DATA line");
    assert_eq!(app.calibration_phase(), CalibrationPhase::Done);
}

#[test]
fn failed_reads_do_not_widen_bounds() {
    let (mut app, clock, mut hw, mut sink) = boot(SystemConfig::default());
    hw.raw_script.extend(std::iter::repeat_n(Ok(300), 10));
    hw.raw_script.extend(std::iter::repeat_n(Err(SensorError::AdcReadFailed), 10));
    hw.raw_script.push_back(Ok(900));
    hw.raw = Ok(300);
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_000, 10);

    assert!(sink
        .events
        .contains(&AppEvent::Ready { min: 300, max: 900, threshold: 480 }));
}

#[test]
fn flat_warm_up_is_degenerate_but_safe() {
    let (mut app, clock, mut hw, mut sink) = boot(SystemConfig::default());
    warm_up(&mut app, &clock, &mut hw, &mut sink, 700, 700);
    hw.raw = Ok(4000);
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_000, 10);

    assert!(sink
        .events
        .contains(&AppEvent::Ready { min: 700, max: 700, threshold: 700 }));
    let s = sink.statuses()[0];
    assert_eq!(s.sound_level, 0);
    assert!(s.sound_detected);
}

#[test]
fn stalled_loop_is_absorbed() {
    let (mut app, clock, mut hw, mut sink) = boot(SystemConfig::default());
    hw.raw = Ok(500);
    app.tick(clock.now_ms(), &mut hw, &mut sink);

    // One iteration 10.75 s late: everything fires once, nothing is queued.
    clock.set_ms(10_750);
    app.tick(clock.now_ms(), &mut hw, &mut sink);

    assert_eq!(hw.range_reads, 1);
    assert_eq!(hw.acoustic_reads, 1);
    assert_eq!(sink.statuses().len(), 1);
    // No sample landed inside the window: detection is disabled.
    assert!(sink
        .events
        .contains(&AppEvent::Ready { min: 4095, max: 4095, threshold: 4095 }));
    assert!(!sink.statuses()[0].sound_detected);
}

// ── Reporting ─────────────────────────────────────────────────

#[test]
fn reports_every_200ms_and_ranges_every_500ms() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    let range_before = hw.range_reads;
    run_until(&mut app, &clock, &mut hw, &mut sink, 12_000, 10);

    let stamps: Vec<u64> = sink.statuses().iter().map(|s| s.timestamp).collect();
    let expected: Vec<u64> = (10_000..=12_000).step_by(200).collect();
    assert_eq!(stamps, expected);
    assert_eq!(hw.range_reads - range_before, 5);
}

// ── Alert scenarios ───────────────────────────────────────────

#[test]
fn close_and_loud_alerts_with_two_tones() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    hw.echo = Ok(882);
    hw.raw = Ok(900);
    run_until(&mut app, &clock, &mut hw, &mut sink, 11_000, 10);

    let s = sink.statuses()[0];
    assert_eq!(s.distance, Some(15.0));
    assert!(s.sound_detected);
    assert!(s.proximity_alert);
    assert_eq!(s.sound_level, 100);

    // One ALERT per finished 200 ms sequence.
    assert_eq!(sink.alerts(), vec![AlertClass::ProximityAndSound; 6]);
    assert_eq!(&hw.tones()[..4], &[2000, 1500, 2000, 1500]);
    assert_eq!(app.last_alert(), AlertClass::ProximityAndSound);
}

#[test]
fn boundary_distance_never_alerts() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    hw.echo = Ok(1176);
    hw.raw = Ok(900);
    run_until(&mut app, &clock, &mut hw, &mut sink, 11_000, 10);

    let s = sink.statuses()[0];
    assert_eq!(s.distance, Some(20.0));
    assert!(!s.proximity_alert);
    assert!(s.sound_detected);
    assert!(sink.alerts().is_empty());
    assert!(hw.tones().is_empty());
}

#[test]
fn no_echo_is_not_an_object() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    hw.echo = Err(SensorError::EchoTimeout);
    hw.raw = Ok(900);
    run_until(&mut app, &clock, &mut hw, &mut sink, 11_000, 10);

    let s = sink.statuses()[0];
    assert_eq!(s.distance, None);
    assert!(s.sound_detected, "sound detection is independent of range");
    assert!(!s.proximity_alert);
    assert!(sink.alerts().is_empty());
    assert!(!hw.buzzer_on());
}

#[test]
fn close_and_quiet_chirps() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    hw.echo = Ok(882);
    hw.raw = Ok(300);
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_200, 10);

    assert_eq!(sink.alerts(), vec![AlertClass::ProximityOnly; 5]);
    assert!(hw.tones().iter().all(|&f| f == 1000));
}

#[test]
fn alerts_stop_once_object_leaves() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    hw.echo = Ok(882);
    hw.raw = Ok(900);
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_150, 10);

    // The next ranging sample (10 500 ms) sees nothing.
    hw.echo = Err(SensorError::EchoTimeout);
    run_until(&mut app, &clock, &mut hw, &mut sink, 11_000, 10);

    assert_eq!(sink.alerts().len(), 3);
    assert_eq!(app.last_alert(), AlertClass::None);
    assert!(hw.calls.contains(&ActuatorCall::Silence));
    assert!(!hw.buzzer_on());
    assert!(!app.is_sounding());
}

#[test]
fn threshold_is_strict_for_indicator_and_report() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    hw.raw = Ok(480);
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_000, 10);
    assert!(!sink.statuses()[0].sound_detected);
    assert!(!hw.indicator_on());

    hw.raw = Ok(481);
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_100, 10);
    assert!(hw.indicator_on());
    assert_eq!(app.context().acoustic.latest().raw, 481);
}

#[test]
fn repeated_inputs_give_repeated_alerts() {
    let (mut app, clock, mut hw, mut sink) = calibrated();
    hw.echo = Ok(882);
    hw.raw = Ok(300);
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_000, 10);
    let first = app.last_alert();
    run_until(&mut app, &clock, &mut hw, &mut sink, 10_010, 10);
    assert_eq!(app.last_alert(), first);
}

// ── Calibration disabled ──────────────────────────────────────

#[test]
fn disabled_calibration_starts_live() {
    let config = SystemConfig {
        calibration_enabled: false,
        ..Default::default()
    };
    let (mut app, clock, mut hw, mut sink) = boot(config);
    assert!(sink.events.is_empty(), "no STATUS:CALIBRATING");

    hw.echo = Ok(882);
    hw.raw = Ok(300);
    run_until(&mut app, &clock, &mut hw, &mut sink, 500, 10);

    assert_eq!(sink.count(is_ready), 0);
    assert_eq!(hw.range_reads, 1);
    // 300 is below the fixed 1228 threshold.
    assert_eq!(sink.alerts(), vec![AlertClass::ProximityOnly]);
    assert!(sink.statuses().len() >= 2);
}
