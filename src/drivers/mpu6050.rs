//! MPU6050 accelerometer / thermometer driver.
//!
//! Register-level driver generic over [`embedded_hal::i2c::I2c`], so the
//! same code runs on the ESP-IDF I2C master and on a host mock bus.
//! Only the accelerometer and the on-die thermometer are used; the gyro is
//! left at its power-on defaults.
//!
//! Configuration applied by [`Mpu6050::init`]:
//! - clock source internal, sleep cleared
//! - DLPF 21 Hz
//! - accelerometer full scale ±8 g (4096 LSB/g)

use core::fmt;

use embedded_hal::i2c::I2c;

use crate::sensors::Vec3;

pub const DEFAULT_ADDRESS: u8 = 0x68;

const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // start of the 14-byte burst
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

const DLPF_21HZ: u8 = 0x04;
const ACCEL_RANGE_8G: u8 = 0x10;
const ACCEL_LSB_PER_G: f32 = 4096.0;
const STANDARD_GRAVITY: f32 = 9.806_65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mpu6050Error<E> {
    /// The bus transfer failed.
    Bus(E),
    /// Something answered, but WHO_AM_I did not read 0x68.
    WrongDevice(u8),
}

impl<E: fmt::Debug> fmt::Display for Mpu6050Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "MPU6050 bus error: {:?}", e),
            Self::WrongDevice(id) => write!(f, "unexpected WHO_AM_I 0x{:02x}", id),
        }
    }
}

/// One accelerometer event plus the die temperature captured with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// m/s²
    pub acceleration: Vec3,
    /// °C
    pub temperature_c: f32,
}

pub struct Mpu6050<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mpu6050<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Check the identity register.
    pub fn probe(&mut self) -> Result<(), Mpu6050Error<I2C::Error>> {
        let mut id = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_WHO_AM_I], &mut id)
            .map_err(Mpu6050Error::Bus)?;
        if id[0] != WHO_AM_I_EXPECTED {
            return Err(Mpu6050Error::WrongDevice(id[0]));
        }
        Ok(())
    }

    /// Probe, wake, and configure range and filter.
    pub fn init(&mut self) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.probe()?;
        self.write_reg(REG_PWR_MGMT_1, 0x00)?;
        self.write_reg(REG_CONFIG, DLPF_21HZ)?;
        self.write_reg(REG_ACCEL_CONFIG, ACCEL_RANGE_8G)?;
        log::info!("MPU6050 initialised (±8g, DLPF 21Hz)");
        Ok(())
    }

    /// Burst-read accel + temperature in one transaction.
    pub fn read_motion(&mut self) -> Result<MotionSample, Mpu6050Error<I2C::Error>> {
        let mut raw = [0u8; 14];
        self.i2c
            .write_read(self.address, &[REG_ACCEL_XOUT_H], &mut raw)
            .map_err(Mpu6050Error::Bus)?;

        let axis = |hi: usize| {
            f32::from(i16::from_be_bytes([raw[hi], raw[hi + 1]])) / ACCEL_LSB_PER_G * STANDARD_GRAVITY
        };
        let temp_raw = i16::from_be_bytes([raw[6], raw[7]]);

        Ok(MotionSample {
            acceleration: Vec3::new(axis(0), axis(2), axis(4)),
            temperature_c: f32::from(temp_raw) / 340.0 + 36.53,
        })
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Mpu6050Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Mpu6050Error::Bus)
    }
}
