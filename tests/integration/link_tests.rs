//! Integration tests for the subscriber link: connect / disconnect edges,
//! the non-blocking re-advertise deadline, and the real BLE adapter's
//! atomic flag.

use std::sync::atomic::{AtomicBool, Ordering};

use watersensor::adapters::ble::BleNotifier;
use watersensor::app::events::AppEvent;
use watersensor::app::link::LinkState;
use watersensor::app::record::StatusRecord;
use watersensor::app::service::MonitorService;
use watersensor::config::SystemConfig;
use watersensor::quality::WaterStatus;
use watersensor::scheduler::Scheduler;

use crate::mock_hw::{ADC_CLEAN, MockHardware, RecordingDelay, RecordingSink, ScriptedJitter};
use crate::rig::Rig;

fn rig() -> Rig {
    let mut rig = Rig::new(SystemConfig::default(), MockHardware::new(ADC_CLEAN));
    rig.start();
    rig.sink.clear();
    rig
}

#[test]
fn connect_edge_is_reported_once() {
    let mut rig = rig();
    rig.ble.connected = true;
    rig.run_until(2000);
    assert_eq!(rig.app.link_state(), LinkState::Connected);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::SubscriberConnected),
        1
    );
}

#[test]
fn disconnect_readvertises_after_settle_delay() {
    let mut rig = rig();
    rig.ble.connected = true;
    rig.run_until(1900);
    rig.ble.connected = false;
    rig.run_until(5000);

    assert_eq!(rig.app.link_state(), LinkState::Disconnected);
    assert_eq!(rig.ble.readvertised_at, vec![2500]);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::SubscriberDisconnected),
        1
    );
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::AdvertisingRestarted),
        1
    );
}

#[test]
fn settle_delay_does_not_block_sampling() {
    let mut rig = rig();
    rig.ble.connected = true;
    rig.run_until(2900);
    rig.ble.connected = false;
    // Disconnect observed at 3000; the sample at 3100 falls inside the
    // settle window and must still run.
    rig.run_until(3100);
    assert_eq!(rig.app.cycle_count(), 1);
    assert!(rig.ble.readvertised_at.is_empty());
    rig.run_until(3500);
    assert_eq!(rig.ble.readvertised_at, vec![3500]);
}

#[test]
fn reconnect_inside_settle_window_cancels_readvertise() {
    let mut rig = rig();
    rig.ble.connected = true;
    rig.run_until(1000);
    rig.ble.connected = false;
    rig.run_until(1200);
    rig.ble.connected = true;
    rig.run_until(5000);
    assert!(rig.ble.readvertised_at.is_empty());
    assert_eq!(rig.app.link_state(), LinkState::Connected);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::SubscriberConnected),
        2
    );
}

#[test]
fn each_disconnect_readvertises_once() {
    let mut rig = rig();
    for cycle in 0..3u64 {
        let base = cycle * 2000;
        rig.ble.connected = true;
        rig.run_until(base + 900);
        rig.ble.connected = false;
        rig.run_until(base + 1900);
    }
    assert_eq!(rig.ble.readvertised_at, vec![1500, 3500, 5500]);
}

#[test]
fn no_publish_after_disconnect() {
    let mut rig = rig();
    rig.ble.connected = true;
    rig.run_until(2500);
    let before = rig.ble.published.len();
    assert_eq!(before, 2);
    rig.ble.connected = false;
    rig.run_until(10_000);
    assert_eq!(rig.ble.published.len(), before);
}

// ── Real adapter ──────────────────────────────────────────────

#[test]
fn ble_notifier_follows_atomic_flag() {
    static FLAG: AtomicBool = AtomicBool::new(false);

    let config = SystemConfig::default();
    let mut sched = Scheduler::from_config(&config);
    let mut app = MonitorService::new(config, ScriptedJitter::default());
    let mut hw = MockHardware::new(ADC_CLEAN);
    let mut sink = RecordingSink::default();
    let mut ble = BleNotifier::with_flag(&FLAG);
    ble.start().unwrap();
    app.startup(&mut hw, &mut RecordingDelay::default(), &mut sink);

    let mut now = 0;
    while now <= 3300 {
        if now == 1500 {
            // What the GATTS connect callback does.
            FLAG.store(true, Ordering::Release);
        }
        app.tick(now, &mut sched, &mut hw, &mut ble, &mut sink);
        now += 100;
    }

    // Notifies at 2200 and 3300; the one at 1100 preceded the connection.
    assert_eq!(ble.published(), 2);
    let sent = StatusRecord::from_wire(ble.last_payload().unwrap()).unwrap();
    assert_eq!(sent.water_status, WaterStatus::Clean);
    assert_eq!(sent.timestamp_ms, 3100);

    FLAG.store(false, Ordering::Release);
    while now <= 4000 {
        app.tick(now, &mut sched, &mut hw, &mut ble, &mut sink);
        now += 100;
    }
    assert_eq!(ble.advertise_restarts(), 1);
}
