//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the MPU6050 driver, the TDS ADC channel and the status LEDs,
//! exposing them through [`SensorPort`] and [`StatusLedPort`].  This is
//! the only module in the system that touches actual hardware.  On
//! non-espidf targets the ADC and GPIO calls resolve to simulation stubs
//! and the IMU runs on whatever bus the caller hands in.

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::app::ports::{SensorPort, StatusLedPort};
use crate::drivers::hw_init;
use crate::drivers::led_patterns::{LedChannel, LedState};
use crate::drivers::mpu6050::{self, Mpu6050};
use crate::drivers::status_led::StatusLeds;
use crate::error::SensorError;
use crate::pins;
use crate::sensors::RawSample;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C> {
    imu: Option<Mpu6050<I2C>>,
    leds: StatusLeds,
    /// Last good ADC count, reused if a oneshot read fails.
    last_adc: u16,
}

impl<I2C: I2c> HardwareAdapter<I2C> {
    /// Bring up the IMU on `i2c`.  A missing or misidentified device is
    /// not an error here; the adapter reports it via `motion_available`.
    pub fn new(i2c: I2C) -> Self {
        let mut imu = Mpu6050::new(i2c, mpu6050::DEFAULT_ADDRESS);
        let imu = match imu.init() {
            Ok(()) => Some(imu),
            Err(e) => {
                warn!("MPU6050 not found: {}", e);
                None
            }
        };
        Self {
            imu,
            leds: StatusLeds::new(),
            last_adc: 0,
        }
    }

    pub fn leds(&self) -> &StatusLeds {
        &self.leds
    }
}

impl<I2C: I2c> SensorPort for HardwareAdapter<I2C> {
    fn read_raw(&mut self) -> Result<RawSample, SensorError> {
        let adc_value = self.read_tds_adc();
        let imu = self.imu.as_mut().ok_or(SensorError::MotionUnavailable)?;
        let motion = imu.read_motion().map_err(|e| {
            warn!("MPU6050 read failed: {}", e);
            SensorError::BusFailed
        })?;
        Ok(RawSample {
            adc_value,
            acceleration: motion.acceleration,
            die_temperature_c: motion.temperature_c,
        })
    }

    fn read_tds_adc(&mut self) -> u16 {
        match hw_init::adc1_read(pins::TDS_ADC1_CHANNEL) {
            Some(raw) => {
                self.last_adc = raw;
                raw
            }
            None => {
                debug!("ADC1 read failed, reusing {}", self.last_adc);
                self.last_adc
            }
        }
    }

    fn motion_available(&self) -> bool {
        self.imu.is_some()
    }
}

impl<I2C: I2c> StatusLedPort for HardwareAdapter<I2C> {
    fn set_led(&mut self, channel: LedChannel, state: LedState) {
        self.leds.set(channel, state);
    }
}
