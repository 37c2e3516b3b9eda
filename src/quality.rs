//! Water-quality classification.
//!
//! ## Decision table (first match wins)
//!
//! | TDS (ppm)        | Vibration | Result              |
//! |------------------|-----------|---------------------|
//! | ≤ 300            | no        | `Clean`             |
//! | 300 < tds ≤ 400  | no        | `Unsafe`            |
//! | ≥ 500            | any       | `ExtremelyUnsafe`   |
//! | any other        | yes       | `VibrationDetected` |
//! | 400 < tds < 500  | no        | *previous status*   |
//!
//! The last row is a known quirk, kept on purpose: no rule covers a quiet
//! reading between 400 and 500 ppm, so the previous status carries over.
//! A reading that drifts from 390 to 450 ppm stays `Unsafe`, one that
//! drifts down from 520 to 450 stays `ExtremelyUnsafe`, and a first cycle
//! in the gap stays `Unknown`.

use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterStatus {
    Clean,
    Unsafe,
    ExtremelyUnsafe,
    VibrationDetected,
    #[default]
    Unknown,
}

impl WaterStatus {
    /// Wire name used in the JSON record and the console line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Unsafe => "unsafe",
            Self::ExtremelyUnsafe => "extremely_unsafe",
            Self::VibrationDetected => "vibration_detected",
            Self::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for WaterStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TDS band edges (ppm).  Must satisfy `clean_max < unsafe_max < extreme_min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub clean_max: f32,
    pub unsafe_max: f32,
    pub extreme_min: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            clean_max: 300.0,
            unsafe_max: 400.0,
            extreme_min: 500.0,
        }
    }
}

impl Thresholds {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            clean_max: config.tds_clean_max_ppm,
            unsafe_max: config.tds_unsafe_max_ppm,
            extreme_min: config.tds_extreme_min_ppm,
        }
    }
}

/// Classify one reading.  `previous` is returned unchanged inside the hold band.
pub fn classify(
    previous: WaterStatus,
    tds: f32,
    vibration_detected: bool,
    t: &Thresholds,
) -> WaterStatus {
    if tds <= t.clean_max && !vibration_detected {
        WaterStatus::Clean
    } else if tds > t.clean_max && tds <= t.unsafe_max && !vibration_detected {
        WaterStatus::Unsafe
    } else if tds >= t.extreme_min {
        WaterStatus::ExtremelyUnsafe
    } else if vibration_detected {
        WaterStatus::VibrationDetected
    } else {
        previous
    }
}
