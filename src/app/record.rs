//! Wire record pushed to the companion app.
//!
//! The app parses a flat JSON object with a fixed key order and fixed
//! decimal precision:
//!
//! ```json
//! {"pH":7.23,"temperature":24.5,"tds":287.4,"turbidity":2.81,
//!  "vibration":0.12,"vibrationDetected":false,"waterStatus":"clean",
//!  "timestamp":"123456","deviceId":"ESP32-WaterSensor","status":"active"}
//! ```
//!
//! `timestamp` is the uptime in milliseconds rendered as a *string*; older
//! app builds read it that way.  Serialization is hand-written into a
//! fixed-capacity buffer so precision and ordering are exact and nothing
//! allocates; parsing goes through serde.

use core::fmt::{self, Write};

use serde::Deserialize;

use crate::app::reading::Reading;
use crate::error::CommsError;
use crate::quality::WaterStatus;

pub const DEVICE_ID: &str = "ESP32-WaterSensor";
pub const DEVICE_STATE: &str = "active";

/// Upper bound on a serialized record (bytes).
pub const RECORD_CAPACITY: usize = 256;

pub type RecordBuf = heapless::String<RECORD_CAPACITY>;

/// Snapshot of a [`Reading`] in the shape the app expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusRecord {
    pub ph: f32,
    pub temperature: f32,
    pub tds: f32,
    pub turbidity: f32,
    pub vibration: f32,
    pub vibration_detected: bool,
    pub water_status: WaterStatus,
    pub timestamp_ms: u64,
}

impl StatusRecord {
    pub fn from_reading(r: &Reading) -> Self {
        Self {
            ph: r.ph,
            temperature: r.temperature,
            tds: r.tds,
            turbidity: r.turbidity,
            vibration: r.vibration,
            vibration_detected: r.vibration_detected,
            water_status: r.water_status,
            timestamp_ms: r.timestamp_ms,
        }
    }

    /// Render the wire JSON into a fresh buffer.
    pub fn to_wire_json(&self) -> Result<RecordBuf, CommsError> {
        let mut buf = RecordBuf::new();
        self.write_wire_json(&mut buf)
            .map_err(|_| CommsError::PayloadTooLarge)?;
        Ok(buf)
    }

    pub fn write_wire_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "{{\"pH\":{:.2},\"temperature\":{:.1},\"tds\":{:.1},\"turbidity\":{:.2},\
             \"vibration\":{:.2},\"vibrationDetected\":{},\"waterStatus\":\"{}\",\
             \"timestamp\":\"{}\",\"deviceId\":\"{}\",\"status\":\"{}\"}}",
            self.ph,
            self.temperature,
            self.tds,
            self.turbidity,
            self.vibration,
            self.vibration_detected,
            self.water_status.as_str(),
            self.timestamp_ms,
            DEVICE_ID,
            DEVICE_STATE,
        )
    }

    /// Parse a wire record back.  Values carry the wire precision.
    pub fn from_wire(json: &str) -> Result<Self, RecordError> {
        let wire: WireRecord =
            serde_json::from_str(json).map_err(|_| RecordError::Malformed)?;
        let timestamp_ms = wire
            .timestamp
            .parse::<u64>()
            .map_err(|_| RecordError::BadTimestamp)?;
        Ok(Self {
            ph: wire.ph,
            temperature: wire.temperature,
            tds: wire.tds,
            turbidity: wire.turbidity,
            vibration: wire.vibration,
            vibration_detected: wire.vibration_detected,
            water_status: wire.water_status,
            timestamp_ms,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Not JSON, or a key is missing or mistyped.
    Malformed,
    /// `timestamp` is not a decimal millisecond count.
    BadTimestamp,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed status record"),
            Self::BadTimestamp => write!(f, "timestamp is not a millisecond count"),
        }
    }
}

#[derive(Deserialize)]
struct WireRecord {
    #[serde(rename = "pH")]
    ph: f32,
    temperature: f32,
    tds: f32,
    turbidity: f32,
    vibration: f32,
    #[serde(rename = "vibrationDetected")]
    vibration_detected: bool,
    #[serde(rename = "waterStatus")]
    water_status: WaterStatus,
    timestamp: heapless::String<24>,
    #[allow(dead_code)]
    #[serde(rename = "deviceId")]
    device_id: heapless::String<32>,
    #[allow(dead_code)]
    status: heapless::String<16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::reading::ReadingSource;

    fn sample_reading() -> Reading {
        Reading {
            tds: 287.43,
            temperature: 24.46,
            vibration: 0.1234,
            vibration_detected: false,
            ph: 7.2345,
            turbidity: 2.8061,
            water_status: WaterStatus::Clean,
            timestamp_ms: 123_456,
            source: ReadingSource::Measured,
        }
    }

    #[test]
    fn exact_wire_format() {
        let json = StatusRecord::from_reading(&sample_reading())
            .to_wire_json()
            .unwrap();
        assert_eq!(
            json.as_str(),
            "{\"pH\":7.23,\"temperature\":24.5,\"tds\":287.4,\"turbidity\":2.81,\
             \"vibration\":0.12,\"vibrationDetected\":false,\"waterStatus\":\"clean\",\
             \"timestamp\":\"123456\",\"deviceId\":\"ESP32-WaterSensor\",\"status\":\"active\"}"
        );
    }

    #[test]
    fn parses_back() {
        let rec = StatusRecord::from_reading(&sample_reading());
        let json = rec.to_wire_json().unwrap();
        let back = StatusRecord::from_wire(&json).unwrap();
        assert!((back.ph - 7.23).abs() < 1e-4);
        assert!((back.temperature - 24.5).abs() < 1e-4);
        assert!((back.tds - 287.4).abs() < 1e-3);
        assert!((back.turbidity - 2.81).abs() < 1e-4);
        assert!((back.vibration - 0.12).abs() < 1e-4);
        assert!(!back.vibration_detected);
        assert_eq!(back.water_status, WaterStatus::Clean);
        assert_eq!(back.timestamp_ms, 123_456);
    }

    #[test]
    fn worst_case_fits_buffer() {
        let rec = StatusRecord {
            ph: 9.0,
            temperature: -40.0,
            tds: 2000.0,
            turbidity: 10.0,
            vibration: -136.0,
            vibration_detected: true,
            water_status: WaterStatus::VibrationDetected,
            timestamp_ms: u64::MAX,
        };
        let json = rec.to_wire_json().unwrap();
        assert!(json.len() < RECORD_CAPACITY);
        assert_eq!(StatusRecord::from_wire(&json).unwrap().timestamp_ms, u64::MAX);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(StatusRecord::from_wire("not json"), Err(RecordError::Malformed));
        assert_eq!(StatusRecord::from_wire("{}"), Err(RecordError::Malformed));
    }

    #[test]
    fn rejects_numeric_timestamp() {
        let json = "{\"pH\":7.0,\"temperature\":22.0,\"tds\":150.0,\"turbidity\":2.0,\
                    \"vibration\":0.0,\"vibrationDetected\":false,\"waterStatus\":\"unknown\",\
                    \"timestamp\":\"12ab\",\"deviceId\":\"ESP32-WaterSensor\",\"status\":\"active\"}";
        assert_eq!(StatusRecord::from_wire(json), Err(RecordError::BadTimestamp));
    }
}
