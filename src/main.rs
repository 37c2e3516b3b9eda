//! WaterSensor Firmware — Main Entry Point
//!
//! Hexagonal architecture with a cooperative, scheduler-driven loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Sensor+LEDs)     (EventSink)    (Config)     (uptime)        │
//! │  BleNotifier       RngJitter                                   │
//! │  (Notifier)        (Jitter)                                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  TDS · motion · classify · LED directive · link        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven): sample 3 s · notify 1 s          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use watersensor::adapters::ble::BleNotifier;
use watersensor::adapters::hardware::HardwareAdapter;
use watersensor::adapters::jitter::RngJitter;
use watersensor::adapters::log_sink::LogEventSink;
use watersensor::adapters::nvs::NvsAdapter;
use watersensor::adapters::time::Esp32TimeAdapter;
use watersensor::app::ports::ConfigPort;
use watersensor::app::service::{MonitorService, StartupOutcome};
use watersensor::config::SystemConfig;
use watersensor::error::Error;
use watersensor::drivers::{hw_init, watchdog::Watchdog};
use watersensor::pins;
use watersensor::scheduler::Scheduler;

const HALT_LOG_INTERVAL_MS: u32 = 1000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WaterSensor v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS load failed ({}), using defaults", Error::from(e));
            SystemConfig::default()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )?;
    let mut hw = HardwareAdapter::new(i2c);

    // ── 4. BLE notifier ───────────────────────────────────────
    let mut ble = BleNotifier::new();
    if config.ble_enabled {
        if let Err(e) = ble.start() {
            error!("{}, continuing without notifications", Error::from(e));
        }
    } else {
        info!("BLE disabled by config");
    }

    // ── 5. Application service ────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut sched = Scheduler::from_config(&config);
    let time = Esp32TimeAdapter::new();
    let poll_ms = config.loop_poll_interval_ms;
    let mut app = MonitorService::new(config, RngJitter::from_hardware());

    let mut delay = FreeRtos;
    let watchdog = Watchdog::from_config(app.config());
    if app.startup(&mut hw, &mut delay, &mut sink) == StartupOutcome::Halted {
        loop {
            error!("MPU6050 not found, halted");
            watchdog.feed();
            FreeRtos::delay_ms(HALT_LOG_INTERVAL_MS);
        }
    }

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        app.tick(time.uptime_ms(), &mut sched, &mut hw, &mut ble, &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(poll_ms);
    }
}
