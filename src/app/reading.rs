//! The live reading owned by the sampling service.

use crate::quality::WaterStatus;

/// Whether motion-derived values came from the IMU or the fallback generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingSource {
    #[default]
    Measured,
    /// IMU absent: vibration and temperature are fabricated.
    Simulated,
}

impl ReadingSource {
    pub const fn is_simulated(self) -> bool {
        matches!(self, Self::Simulated)
    }
}

/// Latest derived values.  Overwritten wholesale every sampling cycle and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// ppm, `[0, 2000]`.
    pub tds: f32,
    /// °C, from the IMU die.
    pub temperature: f32,
    /// Gravity-removed magnitude (m/s²).
    pub vibration: f32,
    pub vibration_detected: bool,
    /// Synthetic, `[6.0, 9.0]`.
    pub ph: f32,
    /// Synthetic NTU, `[0.1, 10.0]`.
    pub turbidity: f32,
    pub water_status: WaterStatus,
    /// Uptime when the cycle ran (ms).
    pub timestamp_ms: u64,
    pub source: ReadingSource,
}

impl Default for Reading {
    /// Values reported before the first sampling cycle completes.
    fn default() -> Self {
        Self {
            tds: 150.0,
            temperature: 22.0,
            vibration: 0.0,
            vibration_detected: false,
            ph: 7.0,
            turbidity: 2.0,
            water_status: WaterStatus::Unknown,
            timestamp_ms: 0,
            source: ReadingSource::Measured,
        }
    }
}
