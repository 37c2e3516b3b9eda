//! System configuration parameters
//!
//! All tunable parameters for the WaterSensor firmware.  Defaults match the
//! deployed board; values can be overridden from NVS (see
//! [`NvsAdapter`](crate::adapters::nvs::NvsAdapter)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- TDS probe ---
    /// ADC reference voltage (V).
    pub vref: f32,
    /// Full-scale ADC count (12-bit = 4095).
    pub adc_max: u16,
    /// Nominal probe temperature used for compensation (°C).
    /// Compensation deliberately ignores the live IMU temperature.
    pub sensor_temperature_c: f32,

    // --- Classification thresholds ---
    /// Upper bound (inclusive) of the clean band (ppm).
    pub tds_clean_max_ppm: f32,
    /// Upper bound (inclusive) of the unsafe band (ppm).
    pub tds_unsafe_max_ppm: f32,
    /// Lower bound (inclusive) of the extremely-unsafe band (ppm).
    pub tds_extreme_min_ppm: f32,

    // --- Motion ---
    /// Gravity-removed magnitude above which vibration is flagged (m/s²).
    pub vibration_threshold: f32,
    /// Gravity subtracted from the acceleration norm (m/s²).
    pub gravity: f32,

    // --- Timing ---
    /// Sampling cycle period (milliseconds).
    pub sample_interval_ms: u32,
    /// BLE notification period (milliseconds).
    pub notify_interval_ms: u32,
    /// Main loop poll period (milliseconds).
    pub loop_poll_interval_ms: u32,
    /// Delay after a disconnect before advertising restarts (milliseconds).
    pub readvertise_settle_ms: u32,
    /// Half period of the vibration blink (milliseconds).
    pub blink_half_period_ms: u32,

    // --- Policy ---
    /// Halt at boot when the MPU6050 is missing instead of simulating it.
    pub halt_on_sensor_missing: bool,
    /// Bring up the BLE notifier.
    pub ble_enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // TDS probe
            vref: 3.3,
            adc_max: 4095,
            sensor_temperature_c: 25.0,

            // Thresholds
            tds_clean_max_ppm: 300.0,
            tds_unsafe_max_ppm: 400.0,
            tds_extreme_min_ppm: 500.0,

            // Motion
            vibration_threshold: 1.5,
            gravity: 9.8,

            // Timing
            sample_interval_ms: 3000,
            notify_interval_ms: 1000,
            loop_poll_interval_ms: 100,
            readvertise_settle_ms: 500,
            blink_half_period_ms: 500,

            // Policy
            halt_on_sensor_missing: false,
            ble_enabled: true,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adc_max == 0 {
            return Err(ConfigError::ValidationFailed("adc_max must be > 0"));
        }
        if !(0.5..=5.5).contains(&self.vref) {
            return Err(ConfigError::ValidationFailed("vref must be 0.5–5.5 V"));
        }
        if !(-10.0..=60.0).contains(&self.sensor_temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "sensor_temperature_c must be -10–60 °C",
            ));
        }
        if !(self.tds_clean_max_ppm < self.tds_unsafe_max_ppm
            && self.tds_unsafe_max_ppm < self.tds_extreme_min_ppm)
        {
            return Err(ConfigError::ValidationFailed(
                "TDS thresholds must satisfy clean < unsafe < extreme",
            ));
        }
        if !(0.0..=2000.0).contains(&self.tds_clean_max_ppm)
            || self.tds_extreme_min_ppm > 2000.0
        {
            return Err(ConfigError::ValidationFailed(
                "TDS thresholds must lie within 0–2000 ppm",
            ));
        }
        if !(self.vibration_threshold > 0.0 && self.vibration_threshold < 80.0) {
            return Err(ConfigError::ValidationFailed(
                "vibration_threshold must be 0–80 m/s²",
            ));
        }
        if self.sample_interval_ms == 0 || self.notify_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "sample/notify intervals must be > 0",
            ));
        }
        if !(10..=1000).contains(&self.loop_poll_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "loop_poll_interval_ms must be 10–1000",
            ));
        }
        if self.blink_half_period_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "blink_half_period_ms must be > 0",
            ));
        }
        if self.loop_poll_interval_ms > self.blink_half_period_ms {
            return Err(ConfigError::ValidationFailed(
                "loop_poll_interval_ms must not exceed blink_half_period_ms",
            ));
        }
        Ok(())
    }
}
