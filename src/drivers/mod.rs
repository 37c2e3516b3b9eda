//! Peripheral drivers, hardware initialisation, and LED signalling.

pub mod hw_init;
pub mod led_patterns;
pub mod mpu6050;
pub mod status_led;
pub mod watchdog;
