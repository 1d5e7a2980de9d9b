//! Status report: one snapshot of the fused readings per report interval.
//!
//! The report is built from the latest readings only; it never batches
//! or averages.  Serialisation field order is the wire order:
//!
//! ```text
//! {"timestamp":..,"distance":..,"sound_level":..,"sound_raw":..,
//!  "sound_detected":..,"proximity_alert":..}
//! ```

use serde::{Serialize, Serializer};

use crate::alert::{proximity_alert, sound_detected};
use crate::sensors::{AcousticReading, RangeReading, DISTANCE_SENTINEL_CM};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// Milliseconds since boot at emission.
    pub timestamp: u64,
    /// Latest distance; the sentinel on the wire when `None`.
    #[serde(serialize_with = "distance_or_sentinel")]
    pub distance: Option<f32>,
    pub sound_level: u8,
    pub sound_raw: u16,
    pub sound_detected: bool,
    pub proximity_alert: bool,
}

fn distance_or_sentinel<S: Serializer>(d: &Option<f32>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f32(d.unwrap_or(DISTANCE_SENTINEL_CM))
}

impl StatusReport {
    pub fn build(
        now_ms: u64,
        range: &RangeReading,
        acoustic: &AcousticReading,
        threshold: Option<u16>,
        proximity_threshold_cm: f32,
    ) -> Self {
        Self {
            timestamp: now_ms,
            distance: range.distance_cm,
            sound_level: acoustic.level_pct,
            sound_raw: acoustic.raw,
            sound_detected: sound_detected(acoustic.raw, threshold),
            proximity_alert: proximity_alert(range.distance_cm, proximity_threshold_cm),
        }
    }

    pub fn wire_distance(&self) -> f32 {
        self.distance.unwrap_or(DISTANCE_SENTINEL_CM)
    }
}
