//! Vibration detection from a single accelerometer event.
//!
//! The magnitude is the raw acceleration norm minus standard gravity, so a
//! probe at rest reads ≈ 0 regardless of orientation.  There is no
//! filtering across cycles: every sampling cycle looks at exactly one
//! instantaneous event.
//!
//! When the IMU is missing at boot and the device is allowed to continue,
//! [`MotionAnalyzer::simulate`] fabricates a quiet reading.  Those readings
//! carry [`ReadingSource::Simulated`](crate::app::reading::ReadingSource)
//! all the way to the log so they are never mistaken for telemetry.

use crate::app::ports::JitterSource;
use crate::config::SystemConfig;
use crate::sensors::Vec3;

/// Fallback vibration jitter bound (m/s²).
pub const SIM_VIBRATION_SPAN: f32 = 0.5;
/// Fallback temperature baseline (°C).
pub const SIM_TEMPERATURE_BASE_C: f32 = 22.0;
/// Fallback temperature jitter bound (°C).
pub const SIM_TEMPERATURE_SPAN_C: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionReading {
    /// Gravity-removed magnitude (m/s²); negative in free fall.
    pub vibration: f32,
    pub vibration_detected: bool,
    /// IMU die temperature (°C).
    pub temperature_c: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct MotionAnalyzer {
    threshold: f32,
    gravity: f32,
}

impl MotionAnalyzer {
    pub fn new(threshold: f32, gravity: f32) -> Self {
        Self { threshold, gravity }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.vibration_threshold, config.gravity)
    }

    /// Gravity-removed acceleration magnitude.
    pub fn magnitude(&self, accel: Vec3) -> f32 {
        accel.norm() - self.gravity
    }

    pub fn analyze(&self, accel: Vec3, die_temperature_c: f32) -> MotionReading {
        let vibration = self.magnitude(accel);
        MotionReading {
            vibration,
            vibration_detected: vibration.abs() > self.threshold,
            temperature_c: die_temperature_c,
        }
    }

    /// Stand-in values while the IMU is absent.  Never flags vibration.
    pub fn simulate(&self, jitter: &mut impl JitterSource) -> MotionReading {
        let vibration = jitter.uniform(-SIM_VIBRATION_SPAN, SIM_VIBRATION_SPAN);
        let temperature_c = SIM_TEMPERATURE_BASE_C
            + jitter.uniform(-SIM_TEMPERATURE_SPAN_C, SIM_TEMPERATURE_SPAN_C);
        MotionReading {
            vibration,
            vibration_detected: false,
            temperature_c,
        }
    }
}
