//! Sensor math — raw samples in, physical quantities out.
//!
//! | Module      | Input                 | Output                         |
//! |-------------|-----------------------|--------------------------------|
//! | `tds`       | 12-bit ADC count      | TDS (ppm), clamped 0–2000      |
//! | `motion`    | acceleration (m/s²)   | vibration magnitude + flag     |
//! | `synthetic` | uptime (ms) + jitter  | placeholder pH and turbidity   |
//!
//! Nothing here touches hardware; drivers produce [`RawSample`]s and the
//! [`MonitorService`](crate::app::service::MonitorService) feeds them in.

pub mod motion;
pub mod synthetic;
pub mod tds;

/// Three-axis vector in m/s².
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// One capture of every hardware input, taken at the start of a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// TDS probe ADC count in `[0, adc_max]`.
    pub adc_value: u16,
    /// Accelerometer event.
    pub acceleration: Vec3,
    /// MPU6050 on-die thermometer (°C), same event as `acceleration`.
    pub die_temperature_c: f32,
}
