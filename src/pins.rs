//! GPIO / peripheral pin assignments for the WaterSensor board (ESP32-S3).
//!
//! Single source of truth; drivers reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// TDS probe (ADC1)
// ---------------------------------------------------------------------------

/// Gravity TDS analog output.
/// ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const TDS_ADC_GPIO: i32 = 1;
pub const TDS_ADC1_CHANNEL: u32 = 0;

// ---------------------------------------------------------------------------
// Status LEDs (discrete, active HIGH)
// ---------------------------------------------------------------------------

pub const LED_GREEN_GPIO: i32 = 2;
pub const LED_YELLOW_GPIO: i32 = 4;
pub const LED_RED_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// I²C bus (MPU6050)
// ---------------------------------------------------------------------------

// SDA is GPIO 8 and SCL is GPIO 9.  The HAL binds them by type, so they
// are named in `main` as `pins.gpio8` / `pins.gpio9`.
pub const I2C_BAUDRATE_HZ: u32 = 400_000;
