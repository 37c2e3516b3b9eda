//! Integration tests for the sensor → classifier → LED / record pipeline.
//!
//! These run on the host and drive `MonitorService::tick` through the
//! scheduler exactly as the firmware main loop does, with a simulated
//! 100 ms poll clock.

use watersensor::app::events::AppEvent;
use watersensor::app::reading::ReadingSource;
use watersensor::app::record::StatusRecord;
use watersensor::app::service::StartupOutcome;
use watersensor::config::SystemConfig;
use watersensor::drivers::led_patterns::{LedChannel, LedDirective};
use watersensor::error::CommsError;
use watersensor::quality::WaterStatus;
use watersensor::sensors::Vec3;

use crate::mock_hw::{
    ADC_CLEAN, ADC_EXTREME, ADC_HOLD_BAND, ADC_UNSAFE, MockHardware, ScriptedJitter,
};
use crate::rig::Rig;

/// First sampling cycle with the default 3000 ms period and 100 ms poll.
const FIRST_SAMPLE_MS: u64 = 3100;
const SECOND_SAMPLE_MS: u64 = 6200;

fn rig(adc: u16) -> Rig {
    let mut rig = Rig::new(SystemConfig::default(), MockHardware::new(adc));
    assert_eq!(rig.start(), StartupOutcome::Ready);
    rig
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn startup_with_imu_plays_init_signal_only() {
    let rig = rig(ADC_CLEAN);
    assert_eq!(rig.delay.total_ns, 1_000_000_000);
    assert!(rig.sink.events.contains(&AppEvent::Started {
        motion_available: true
    }));
    assert_eq!(rig.hw.leds.lit(), None, "init signal ends with all LEDs dark");
}

#[test]
fn missing_imu_degrades_and_simulates() {
    let mut rig = Rig::with_jitter(
        SystemConfig::default(),
        MockHardware::without_imu(ADC_CLEAN),
        ScriptedJitter::new(&[1.0, 0.0]),
    );
    assert_eq!(rig.start(), StartupOutcome::Degraded);
    // Five red flashes (2 s) then the green init signal (1 s).
    assert_eq!(rig.delay.total_ns, 3_000_000_000);
    assert!(rig.sink.events.contains(&AppEvent::DegradedMode));
    assert!(rig.sink.events.contains(&AppEvent::Started {
        motion_available: false
    }));

    rig.run_until(FIRST_SAMPLE_MS);
    let r = *rig.app.reading();
    assert_eq!(r.source, ReadingSource::Simulated);
    assert!((r.vibration - 0.5).abs() < 1e-6);
    assert!((r.temperature - 19.0).abs() < 1e-6);
    assert!(!r.vibration_detected);
    assert_eq!(r.water_status, WaterStatus::Clean);
    assert_eq!(rig.hw.raw_reads, 0, "absent IMU is never polled");
    assert_eq!(rig.hw.adc_reads, 1);
}

#[test]
fn missing_imu_with_halt_policy_stops() {
    let config = SystemConfig {
        halt_on_sensor_missing: true,
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config, MockHardware::without_imu(ADC_CLEAN));
    assert_eq!(rig.start(), StartupOutcome::Halted);
    assert_eq!(rig.delay.total_ns, 2_000_000_000);
    assert!(rig.sink.events.contains(&AppEvent::Halted));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Started { .. })),
        0
    );
}

// ── Classification → LEDs ─────────────────────────────────────

#[test]
fn nothing_lit_before_first_cycle() {
    let mut rig = rig(ADC_CLEAN);
    rig.run_until(FIRST_SAMPLE_MS - 100);
    assert_eq!(rig.app.status(), WaterStatus::Unknown);
    assert_eq!(rig.app.cycle_count(), 0);
    assert_eq!(rig.hw.leds.lit(), None);
}

#[test]
fn clean_water_lights_green() {
    let mut rig = rig(ADC_CLEAN);
    rig.run_until(FIRST_SAMPLE_MS);
    let r = *rig.app.reading();
    assert_eq!(r.water_status, WaterStatus::Clean);
    assert_eq!(r.timestamp_ms, FIRST_SAMPLE_MS);
    assert!((r.tds - 156.3).abs() < 0.5, "tds {}", r.tds);
    assert_eq!(r.temperature, 24.0);
    assert_eq!(rig.hw.leds.lit(), Some(LedChannel::Green));
}

#[test]
fn unsafe_water_lights_yellow() {
    let mut rig = rig(ADC_UNSAFE);
    rig.run_until(FIRST_SAMPLE_MS);
    assert_eq!(rig.app.status(), WaterStatus::Unsafe);
    assert_eq!(rig.hw.leds.lit(), Some(LedChannel::Yellow));
}

#[test]
fn extreme_water_lights_red() {
    let mut rig = rig(ADC_EXTREME);
    rig.run_until(FIRST_SAMPLE_MS);
    assert_eq!(rig.app.status(), WaterStatus::ExtremelyUnsafe);
    assert_eq!(rig.hw.leds.lit(), Some(LedChannel::Red));
}

#[test]
fn hold_band_keeps_previous_status() {
    let mut rig = rig(ADC_CLEAN);
    rig.run_until(FIRST_SAMPLE_MS);
    assert_eq!(rig.app.status(), WaterStatus::Clean);

    rig.hw.adc = ADC_HOLD_BAND;
    rig.run_until(SECOND_SAMPLE_MS);
    let r = *rig.app.reading();
    assert!(r.tds > 400.0 && r.tds < 500.0, "tds {}", r.tds);
    assert_eq!(r.water_status, WaterStatus::Clean);
    assert_eq!(rig.hw.leds.lit(), Some(LedChannel::Green));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::StatusChanged { .. })),
        1,
        "only Unknown -> Clean"
    );
}

#[test]
fn hold_band_on_first_cycle_stays_unknown() {
    let mut rig = rig(ADC_HOLD_BAND);
    rig.run_until(FIRST_SAMPLE_MS);
    assert_eq!(rig.app.status(), WaterStatus::Unknown);
    assert_eq!(rig.app.led_directive(), LedDirective::Off);
    assert_eq!(rig.hw.leds.lit(), None);
}

#[test]
fn vibration_blinks_yellow() {
    let mut rig = rig(ADC_CLEAN);
    rig.hw.accel = Vec3::new(0.0, 0.0, 12.0); // 2.2 m/s² above gravity
    rig.run_until(FIRST_SAMPLE_MS);
    assert_eq!(rig.app.status(), WaterStatus::VibrationDetected);
    assert!(rig.app.reading().vibration_detected);
    assert_eq!(rig.app.led_directive(), LedDirective::Blink(LedChannel::Yellow));

    // 3100 / 500 = 6: even half-period, dark.
    assert_eq!(rig.hw.leds.lit(), None);
    rig.run_until(3500);
    assert_eq!(rig.hw.leds.lit(), Some(LedChannel::Yellow));
    rig.run_until(4000);
    assert_eq!(rig.hw.leds.lit(), None);
}

#[test]
fn extreme_tds_overrides_vibration() {
    let mut rig = rig(ADC_EXTREME);
    rig.hw.accel = Vec3::new(0.0, 0.0, 12.0);
    rig.run_until(FIRST_SAMPLE_MS);
    assert_eq!(rig.app.status(), WaterStatus::ExtremelyUnsafe);
    assert_eq!(rig.hw.leds.lit(), Some(LedChannel::Red));
}

#[test]
fn imu_bus_fault_simulates_that_cycle() {
    let mut rig = rig(ADC_UNSAFE);
    rig.hw.imu_bus_fault = true;
    rig.run_until(FIRST_SAMPLE_MS);
    let r = *rig.app.reading();
    assert_eq!(r.source, ReadingSource::Simulated);
    assert_eq!(r.water_status, WaterStatus::Unsafe);
    assert_eq!(rig.hw.adc_reads, 1);

    rig.hw.imu_bus_fault = false;
    rig.run_until(SECOND_SAMPLE_MS);
    assert_eq!(rig.app.reading().source, ReadingSource::Measured);
}

#[test]
fn every_cycle_is_logged() {
    let mut rig = rig(ADC_CLEAN);
    rig.run_until(30_000);
    assert_eq!(rig.app.cycle_count(), 9);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CycleCompleted(_))),
        9
    );
}

// ── Notifications ─────────────────────────────────────────────

#[test]
fn no_publish_without_subscriber() {
    let mut rig = rig(ADC_CLEAN);
    rig.run_until(10_000);
    assert!(rig.ble.published.is_empty());
    assert_eq!(rig.app.publish_count(), 0);
}

#[test]
fn connected_subscriber_gets_a_record_every_notify_tick() {
    let mut rig = rig(ADC_CLEAN);
    rig.ble.connected = true;
    rig.run_until(30_000);
    assert_eq!(rig.ble.published.len(), 27);
    assert_eq!(rig.app.publish_count(), 27);

    // Records before the first cycle carry the startup values.
    let first = rig.ble.published[0];
    assert_eq!(first.water_status, WaterStatus::Unknown);
    assert_eq!(first.timestamp_ms, 0);

    let last = rig.ble.published.last().copied().unwrap();
    assert_eq!(last, StatusRecord::from_reading(rig.app.reading()));
}

#[test]
fn published_record_serializes_for_the_app() {
    let mut rig = rig(ADC_CLEAN);
    rig.ble.connected = true;
    rig.run_until(FIRST_SAMPLE_MS + 200);
    let rec = rig.ble.published.last().copied().unwrap();
    let json = rec.to_wire_json().unwrap();
    assert!(json.contains("\"waterStatus\":\"clean\""));
    assert!(json.contains("\"timestamp\":\"3100\""));
    assert!(json.contains("\"deviceId\":\"ESP32-WaterSensor\""));
    assert_eq!(StatusRecord::from_wire(&json).unwrap().timestamp_ms, 3100);
}

#[test]
fn publish_failure_is_reported_and_retried() {
    let mut rig = rig(ADC_CLEAN);
    rig.ble.connected = true;
    rig.ble.fail_publish = Some(CommsError::NotConnected);
    rig.run_until(2500);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::PublishFailed(CommsError::NotConnected))),
        2
    );
    assert_eq!(rig.app.publish_count(), 0);

    rig.ble.fail_publish = None;
    rig.run_until(3500);
    assert_eq!(rig.ble.published.len(), 1);
}

#[test]
fn ble_disabled_never_notifies() {
    let config = SystemConfig {
        ble_enabled: false,
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config, MockHardware::new(ADC_CLEAN));
    rig.start();
    rig.ble.connected = true;
    rig.run_until(10_000);
    assert!(rig.ble.published.is_empty());
    assert_eq!(rig.app.cycle_count(), 3);
}
