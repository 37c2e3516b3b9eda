//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production).  Each sampling cycle produces
//! one human-readable summary line followed by the exact JSON record the
//! companion app receives.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::reading::Reading;
use crate::app::record::StatusRecord;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// `TDS: … ppm | Vibration: … m/s² | …` line for one reading.
pub fn summary_line(r: &Reading) -> String {
    format!(
        "TDS: {:.1} ppm | Vibration: {:.2} m/s\u{00b2} | Vibration Detected: {} | \
         Temperature: {:.1}\u{00b0}C | Water Status: {}{}",
        r.tds,
        r.vibration,
        if r.vibration_detected { "YES" } else { "NO" },
        r.temperature,
        r.water_status,
        if r.source.is_simulated() { " (simulated)" } else { "" },
    )
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { motion_available } => {
                info!(
                    "START | motion sensor {}",
                    if *motion_available { "online" } else { "simulated" }
                );
            }
            AppEvent::DegradedMode => {
                warn!("DEGRADED | MPU6050 missing, vibration and temperature are simulated");
            }
            AppEvent::Halted => {
                warn!("HALT | MPU6050 missing and halt_on_sensor_missing is set");
            }
            AppEvent::CycleCompleted(reading) => {
                info!("{}", summary_line(reading));
                match StatusRecord::from_reading(reading).to_wire_json() {
                    Ok(json) => info!("JSON: {}", json),
                    Err(e) => warn!("JSON: {}", e),
                }
            }
            AppEvent::StatusChanged { from, to } => {
                info!("STATUS | {} -> {}", from, to);
            }
            AppEvent::RecordPublished(record) => {
                debug!("BLE | notified (timestamp {})", record.timestamp_ms);
            }
            AppEvent::PublishFailed(e) => {
                warn!("BLE | publish failed: {}", e);
            }
            AppEvent::SubscriberConnected => {
                info!("BLE | device connected");
            }
            AppEvent::SubscriberDisconnected => {
                info!("BLE | device disconnected");
            }
            AppEvent::AdvertisingRestarted => {
                info!("BLE | advertising restarted");
            }
        }
    }
}
