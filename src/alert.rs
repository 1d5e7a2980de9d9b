//! Combined-condition alert classification.
//!
//! Pure functions of the latest readings.  No hysteresis and no memory:
//! identical inputs on consecutive ticks give the identical class.
//!
//! | Proximity (`0 < d < 20`) | Sound (`raw > threshold`) | Class                 |
//! |--------------------------|---------------------------|-----------------------|
//! | yes                      | yes                       | `ProximityAndSound`   |
//! | yes                      | no                        | `ProximityOnly`       |
//! | no                       | any                       | `None`                |
//!
//! The sentinel distance is "no object", never a qualifying small value.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertClass {
    #[default]
    None,
    ProximityOnly,
    ProximityAndSound,
}

impl AlertClass {
    /// Tag carried after `ALERT:` on the serial line.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::ProximityOnly => "PROXIMITY_ONLY",
            Self::ProximityAndSound => "PROXIMITY_AND_SOUND",
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for AlertClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// `0 < distance < threshold_cm`.  `None` never qualifies.
pub fn proximity_alert(distance_cm: Option<f32>, threshold_cm: f32) -> bool {
    distance_cm.is_some_and(|d| d > 0.0 && d < threshold_cm)
}

/// `raw > threshold`, strictly.  No threshold yet means nothing is detected.
pub fn sound_detected(raw: u16, threshold: Option<u16>) -> bool {
    threshold.is_some_and(|t| raw > t)
}

/// Classify one set of readings.
pub fn evaluate(
    distance_cm: Option<f32>,
    raw: u16,
    threshold: Option<u16>,
    proximity_threshold_cm: f32,
) -> AlertClass {
    if !proximity_alert(distance_cm, proximity_threshold_cm) {
        return AlertClass::None;
    }
    if sound_detected(raw, threshold) {
        AlertClass::ProximityAndSound
    } else {
        AlertClass::ProximityOnly
    }
}

// ───────────────────────────────────────────────────────────────
// Distance bands (console presentation)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    NoEcho,
    Critical,
    Caution,
    InRange,
    Clear,
}

impl DistanceBand {
    pub fn classify(distance_cm: Option<f32>) -> Self {
        match distance_cm {
            None => Self::NoEcho,
            Some(d) if d < 5.0 => Self::Critical,
            Some(d) if d < 20.0 => Self::Caution,
            Some(d) if d < 50.0 => Self::InRange,
            Some(_) => Self::Clear,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoEcho => "NO ECHO",
            Self::Critical => "CRITICAL",
            Self::Caution => "CAUTION",
            Self::InRange => "IN RANGE",
            Self::Clear => "CLEAR",
        }
    }
}
