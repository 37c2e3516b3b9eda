//! Gravity TDS probe conversion.
//!
//! The probe outputs an analog voltage read through a 12-bit ADC.  The
//! vendor's cubic fit maps the temperature-compensated voltage to ppm:
//!
//! ```text
//! V      = adc * VREF / ADC_MAX
//! Vcomp  = V / (1 + 0.02 * (T - 25))
//! TDS    = (133.42 Vcomp³ − 255.86 Vcomp² + 857.39 Vcomp) × 0.5
//! ```
//!
//! `T` is the configured nominal probe temperature, not the IMU reading;
//! with the default 25 °C the compensation factor is exactly 1.
//!
//! Precision is fixed so readings match deployed units bit for bit: `V`,
//! the compensation factor and `Vcomp` are stored as `f32`, the cubic is
//! evaluated in `f64` and the result is narrowed to `f32` before clamping.

use crate::config::SystemConfig;

/// Lower clamp for the reported concentration (ppm).
pub const TDS_MIN_PPM: f32 = 0.0;
/// Upper clamp for the reported concentration (ppm).
pub const TDS_MAX_PPM: f32 = 2000.0;

const TEMP_COEFF: f64 = 0.02;
const REFERENCE_TEMP_C: f64 = 25.0;

#[derive(Debug, Clone, Copy)]
pub struct TdsConverter {
    vref: f32,
    adc_max: f32,
    compensation: f32,
}

impl TdsConverter {
    /// `adc_max` must be non-zero; [`SystemConfig::validate`] enforces it.
    pub fn new(vref: f32, adc_max: u16, sensor_temperature_c: f32) -> Self {
        Self {
            vref,
            adc_max: f32::from(adc_max),
            compensation: (1.0 + TEMP_COEFF * (f64::from(sensor_temperature_c) - REFERENCE_TEMP_C))
                as f32,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.vref, config.adc_max, config.sensor_temperature_c)
    }

    /// ADC count → probe voltage.
    pub fn voltage(&self, adc_value: u16) -> f32 {
        f32::from(adc_value) * self.vref / self.adc_max
    }

    /// ADC count → TDS in ppm, clamped to `[0, 2000]`.
    pub fn convert(&self, adc_value: u16) -> f32 {
        let v_comp = self.voltage(adc_value) / self.compensation;
        let v = f64::from(v_comp);
        let tds = (133.42 * v.powi(3) - 255.86 * v.powi(2) + 857.39 * v) * 0.5;
        (tds as f32).clamp(TDS_MIN_PPM, TDS_MAX_PPM)
    }
}
