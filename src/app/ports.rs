//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (IMU + ADC, status LEDs, BLE notifier, console, NVS,
//! RNG) implement these traits.  The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the sampling pipeline never touches
//! hardware directly and runs unchanged on the host under test.

use crate::app::record::StatusRecord;
use crate::config::SystemConfig;
use crate::drivers::led_patterns::{LedChannel, LedState};
use crate::error::{CommsError, SensorError};
use crate::sensors::RawSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per sampling cycle.
pub trait SensorPort {
    /// Capture the TDS ADC sample and one IMU event together.
    ///
    /// Fails with [`SensorError::MotionUnavailable`] when the IMU was not
    /// found at boot; the caller then falls back to [`read_tds_adc`](Self::read_tds_adc).
    fn read_raw(&mut self) -> Result<RawSample, SensorError>;

    /// ADC-only read, valid regardless of IMU state.
    fn read_tds_adc(&mut self) -> u16;

    /// Whether the IMU answered its identity probe at boot.
    fn motion_available(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Status LED port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the three discrete status LEDs.
pub trait StatusLedPort {
    fn set_led(&mut self, channel: LedChannel, state: LedState);

    /// Switch every channel off.
    fn all_off(&mut self) {
        for channel in LedChannel::ALL {
            self.set_led(channel, LedState::Off);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Notifier port (driven adapter: domain → BLE characteristic)
// ───────────────────────────────────────────────────────────────

/// Best-effort push channel to the companion app.
///
/// `is_subscriber_connected` reads a flag written from the Bluetooth
/// stack's own task; implementations must back it with an atomic.
pub trait NotifierPort {
    fn is_subscriber_connected(&self) -> bool;

    /// Write the record to the characteristic and notify the subscriber.
    fn publish(&mut self, record: &StatusRecord) -> Result<(), CommsError>;

    /// Make the device discoverable again after a disconnect.
    fn restart_advertising(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Jitter port (driven adapter: RNG → domain)
// ───────────────────────────────────────────────────────────────

/// Bounded random jitter for the synthetic channels and the IMU fallback.
pub trait JitterSource {
    /// Uniform sample in `[lo, hi]`.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST call [`SystemConfig::validate`] before persisting.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the service)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the [`Scheduler`](crate::scheduler::Scheduler)
/// invokes when a periodic task is due.
pub trait SchedulerDelegate {
    fn on_task_due(&mut self, task: TaskId, now_ms: u64);
}

/// The two periodic actions of the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Full sampling cycle (sensor read → classify → LEDs → log).
    Sample,
    /// Push the current reading to a connected subscriber.
    Notify,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
