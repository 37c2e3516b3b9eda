//! Unified error types for the WaterSensor firmware.
//!
//! Every subsystem error converts into the top-level [`Error`] so the
//! startup path in `main` can report failures uniformly.  All variants are
//! `Copy`; nothing here allocates.
//!
//! Steady-state sampling never surfaces these: range violations are clamped
//! and a missing subscriber simply skips the publish.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The MPU6050 was not detected at boot, so no motion event exists.
    MotionUnavailable,
    /// I2C transfer to the IMU failed mid-run.
    BusFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MotionUnavailable => write!(f, "motion sensor unavailable"),
            Self::BusFailed => write!(f, "I2C transfer failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    BleInitFailed,
    /// Stack not running or no subscriber attached.
    NotConnected,
    /// Serialised record does not fit the characteristic buffer.
    PayloadTooLarge,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BleInitFailed => write!(f, "BLE init failed"),
            Self::NotConnected => write!(f, "no BLE subscriber"),
            Self::PayloadTooLarge => write!(f, "payload exceeds characteristic buffer"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<crate::app::ports::ConfigError> for Error {
    fn from(e: crate::app::ports::ConfigError) -> Self {
        match e {
            crate::app::ports::ConfigError::ValidationFailed(msg) => Self::Config(msg),
            crate::app::ports::ConfigError::Corrupted => Self::Config("stored config corrupted"),
            crate::app::ports::ConfigError::IoError => Self::Config("storage I/O error"),
        }
    }
}
