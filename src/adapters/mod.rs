//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements               | Connects to                 |
//! |------------|--------------------------|-----------------------------|
//! | `ble`      | NotifierPort             | Bluedroid GATT server       |
//! | `hardware` | SensorPort, StatusLedPort| ESP32 ADC, I²C IMU, GPIO    |
//! | `jitter`   | JitterSource             | SmallRng (hardware-seeded)  |
//! | `log_sink` | EventSink                | Serial log output           |
//! | `nvs`      | ConfigPort               | NVS / in-memory store       |
//! | `time`     |                          | ESP32 system timer          |

pub mod ble;
pub mod hardware;
pub mod jitter;
pub mod log_sink;
pub mod nvs;
pub mod time;
