//! Serial line event sink.
//!
//! Implements [`EventSink`] by rendering each [`AppEvent`] into exactly one
//! newline-terminated line and writing it to the UART-backed stdout in a
//! single call.  A line is either written whole or dropped; nothing is
//! ever batched or split.
//!
//! Presentation is a strategy picked once at init from
//! [`OutputMode`]:
//!
//! | Event                 | Machine                          | Human                              |
//! |-----------------------|----------------------------------|------------------------------------|
//! | `Calibrating`         | `STATUS:CALIBRATING`             | `Calibrating sound sensor ...`     |
//! | `CalibrationProgress` | `CALIBRATION:<min>,<max>,<raw>`  | `Calibrating... min: ..`           |
//! | `Ready`               | `STATUS:READY`                   | `Calibration complete. ..`         |
//! | `Status`              | `DATA:{json}`                    | `Distance: .. \| Sound: .. \| ..`  |
//! | `Alert`               | `ALERT:<CLASS>`                  | `!! ALERT: ..`                     |

use core::fmt::Write as _;
use std::io::Write;

use heapless::String;
use log::warn;

use crate::alert::{AlertClass, DistanceBand};
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::config::OutputMode;
use crate::error::OutputError;
use crate::reporter::StatusReport;

/// Longest line either formatter produces, newline included.
pub const LINE_CAPACITY: usize = 192;

pub type Line = String<LINE_CAPACITY>;

/// Sound level above which the console marks a reading `LOUD`.
const LOUD_LEVEL_PCT: u8 = 80;

/// One presentation of the event stream.
pub trait LineFormatter {
    /// Render `event` into `out`, without the trailing newline.
    fn format(&self, event: &AppEvent, out: &mut Line) -> Result<(), OutputError>;
}

fn overflow(_: core::fmt::Error) -> OutputError {
    OutputError::LineOverflow
}

// ───────────────────────────────────────────────────────────────
// Machine formatter
// ───────────────────────────────────────────────────────────────

/// Tagged, machine-parsable lines.
pub struct MachineFormatter;

impl LineFormatter for MachineFormatter {
    fn format(&self, event: &AppEvent, out: &mut Line) -> Result<(), OutputError> {
        match event {
            AppEvent::Calibrating => out.push_str("STATUS:CALIBRATING").map_err(|_| OutputError::LineOverflow),
            AppEvent::CalibrationProgress { min, max, raw } => {
                write!(out, "CALIBRATION:{},{},{}", min, max, raw).map_err(overflow)
            }
            AppEvent::Ready { .. } => out.push_str("STATUS:READY").map_err(|_| OutputError::LineOverflow),
            AppEvent::Status(report) => {
                let json = serde_json::to_string(report).map_err(|_| OutputError::WriteFailed)?;
                write!(out, "DATA:{}", json).map_err(overflow)
            }
            AppEvent::Alert(class) => write!(out, "ALERT:{}", class.wire_name()).map_err(overflow),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Human formatter
// ───────────────────────────────────────────────────────────────

/// Console text carrying the same readings.  Not a stable format.
pub struct HumanFormatter;

impl HumanFormatter {
    fn status(report: &StatusReport, out: &mut Line) -> core::fmt::Result {
        match report.distance {
            Some(d) => write!(out, "Distance: {:6.1}cm", d)?,
            None => write!(out, "Distance:  no echo")?,
        }
        write!(
            out,
            " | Sound: {:3}% | Raw: {:4} | Detected: {} | Proximity: {}",
            report.sound_level,
            report.sound_raw,
            yes_no(report.sound_detected),
            yes_no(report.proximity_alert),
        )?;
        match DistanceBand::classify(report.distance) {
            DistanceBand::NoEcho | DistanceBand::Clear => {}
            band => write!(out, " [{}]", band.label())?,
        }
        if report.sound_level > LOUD_LEVEL_PCT {
            out.write_str(" LOUD")?;
        }
        Ok(())
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "Yes" } else { "No" }
}

impl LineFormatter for HumanFormatter {
    fn format(&self, event: &AppEvent, out: &mut Line) -> Result<(), OutputError> {
        match event {
            AppEvent::Calibrating => {
                write!(out, "Calibrating sound sensor, keep the area quiet...").map_err(overflow)
            }
            AppEvent::CalibrationProgress { min, max, raw } => {
                write!(out, "Calibrating... min: {} max: {} current: {}", min, max, raw)
                    .map_err(overflow)
            }
            AppEvent::Ready { min, max, threshold } => write!(
                out,
                "Calibration complete. min: {} max: {} threshold: {}",
                min, max, threshold
            )
            .map_err(overflow),
            AppEvent::Status(report) => Self::status(report, out).map_err(overflow),
            AppEvent::Alert(AlertClass::ProximityAndSound) => {
                write!(out, "!! ALERT: object close and sound detected").map_err(overflow)
            }
            AppEvent::Alert(AlertClass::ProximityOnly) => {
                write!(out, "!! ALERT: object close").map_err(overflow)
            }
            AppEvent::Alert(AlertClass::None) => Ok(()),
        }
    }
}

/// Formatter for a presentation mode.
pub fn formatter_for(mode: OutputMode) -> &'static dyn LineFormatter {
    match mode {
        OutputMode::Machine => &MachineFormatter,
        OutputMode::Human => &HumanFormatter,
    }
}

// ───────────────────────────────────────────────────────────────
// Sink
// ───────────────────────────────────────────────────────────────

/// Adapter that writes every [`AppEvent`] as one line to `W`.
pub struct SerialLineSink<W: Write> {
    writer: W,
    formatter: &'static dyn LineFormatter,
    lines_written: u32,
    lines_dropped: u32,
}

impl SerialLineSink<std::io::Stdout> {
    /// Sink on the console UART (stdout under ESP-IDF).
    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(std::io::stdout(), mode)
    }
}

impl<W: Write> SerialLineSink<W> {
    pub fn new(writer: W, mode: OutputMode) -> Self {
        Self {
            writer,
            formatter: formatter_for(mode),
            lines_written: 0,
            lines_dropped: 0,
        }
    }

    fn write_line(&mut self, event: &AppEvent) -> Result<(), OutputError> {
        let mut line = Line::new();
        self.formatter.format(event, &mut line)?;
        if line.is_empty() {
            return Ok(());
        }
        line.push('\n').map_err(|_| OutputError::LineOverflow)?;
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|_| OutputError::WriteFailed)
    }

    pub fn lines_written(&self) -> u32 {
        self.lines_written
    }

    pub fn lines_dropped(&self) -> u32 {
        self.lines_dropped
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for SerialLineSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        match self.write_line(event) {
            Ok(()) => self.lines_written = self.lines_written.saturating_add(1),
            Err(e) => {
                self.lines_dropped = self.lines_dropped.saturating_add(1);
                warn!("Serial: dropped {:?} line ({})", event, e);
            }
        }
    }
}
