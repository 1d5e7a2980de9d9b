//! End-to-end serial transcripts: AppService driving a `SerialLineSink`
//! over an in-memory UART.

use crate::mock_hw::{run_until, warm_up, ManualClock, MockHardware};

use echosense::adapters::serial_sink::SerialLineSink;
use echosense::app::ports::Clock;
use echosense::app::service::AppService;
use echosense::config::{OutputMode, SystemConfig};

fn transcript(mode: OutputMode, until_ms: u64) -> String {
    let config = SystemConfig {
        output_mode: mode,
        ..Default::default()
    };
    let clock = ManualClock::at_ms(0);
    let mut app = AppService::new(config, clock.now_ms());
    let mut hw = MockHardware::new();
    let mut sink = SerialLineSink::new(Vec::new(), mode);
    app.start(&mut hw, &mut sink);

    warm_up(&mut app, &clock, &mut hw, &mut sink, 300, 900);
    hw.echo = Ok(882);
    hw.raw = Ok(900);
    run_until(&mut app, &clock, &mut hw, &mut sink, until_ms, 10);

    assert_eq!(sink.lines_dropped(), 0);
    String::from_utf8(sink.into_inner()).unwrap()
}

#[test]
fn machine_transcript_from_boot_to_first_alerts() {
    let out = transcript(OutputMode::Machine, 10_200);
    assert!(out.ends_with('\n'));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 15, "{out}");
    assert_eq!(lines[0], "STATUS:CALIBRATING");
    assert_eq!(lines[1], "CALIBRATION:300,300,300");
    assert_eq!(lines[6], "CALIBRATION:300,900,300");
    assert!(lines[1..10].iter().all(|l| l.starts_with("CALIBRATION:")));
    assert_eq!(lines[10], "STATUS:READY");
    assert!(lines[11].starts_with("DATA:"));
    assert_eq!(lines[12], "ALERT:PROXIMITY_AND_SOUND");
    assert!(lines[13].starts_with("DATA:"));
    assert_eq!(lines[14], "ALERT:PROXIMITY_AND_SOUND");
    assert_eq!(lines.iter().filter(|l| **l == "STATUS:READY").count(), 1);
}

#[test]
fn data_lines_are_json_objects() {
    let out = transcript(OutputMode::Machine, 10_400);
    let data: Vec<serde_json::Value> = out
        .lines()
        .filter_map(|l| l.strip_prefix("DATA:"))
        .map(|json| serde_json::from_str(json).unwrap())
        .collect();

    assert_eq!(data.len(), 3);
    let first = &data[0];
    assert_eq!(first["timestamp"], 10_000);
    assert_eq!(first["distance"].as_f64(), Some(15.0));
    assert_eq!(first["sound_level"], 100);
    assert_eq!(first["sound_raw"], 900);
    assert_eq!(first["sound_detected"], true);
    assert_eq!(first["proximity_alert"], true);
    assert_eq!(data[1]["timestamp"], 10_200);
}

#[test]
fn human_transcript_reads_as_prose() {
    let out = transcript(OutputMode::Human, 10_000);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "Calibrating sound sensor, keep the area quiet...");
    assert!(out.contains("Calibration complete. min: 300 max: 900 threshold: 480"));
    assert!(out.contains(
        "Distance:   15.0cm | Sound: 100% | Raw:  900 | Detected: Yes | Proximity: Yes [CAUTION] LOUD"
    ));
    assert_eq!(lines.last(), Some(&"!! ALERT: object close and sound detected"));
    assert!(!out.contains("DATA:"));
}
