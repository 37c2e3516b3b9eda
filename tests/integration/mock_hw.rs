//! Mock adapters for integration tests.
//!
//! Each mock records what the service asked of it so tests can assert on
//! the full history without touching real ADC, GPIO or Bluetooth.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use watersensor::app::events::AppEvent;
use watersensor::app::ports::{EventSink, JitterSource, NotifierPort, SensorPort, StatusLedPort};
use watersensor::app::record::StatusRecord;
use watersensor::drivers::led_patterns::{LedChannel, LedState};
use watersensor::error::{CommsError, SensorError};
use watersensor::sensors::{RawSample, Vec3};

/// Resting board: gravity on Z only.
pub const AT_REST: Vec3 = Vec3::new(0.0, 0.0, 9.8);

/// ADC counts that land in each TDS band with the default calibration.
pub const ADC_CLEAN: u16 = 500; // ~156 ppm
pub const ADC_UNSAFE: u16 = 1200; // ~355 ppm
pub const ADC_HOLD_BAND: u16 = 1500; // ~449 ppm
pub const ADC_EXTREME: u16 = 2048; // ~659 ppm

// ── MockLeds ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockLeds {
    lit: [bool; 3],
    pub writes: Vec<(LedChannel, LedState)>,
}

#[allow(dead_code)]
impl MockLeds {
    pub fn is_on(&self, channel: LedChannel) -> bool {
        self.lit[index(channel)]
    }

    /// The single lit channel, or `None` if all are dark.
    pub fn lit(&self) -> Option<LedChannel> {
        let on: Vec<_> = LedChannel::ALL.into_iter().filter(|&c| self.is_on(c)).collect();
        assert!(on.len() <= 1, "more than one LED lit: {:?}", on);
        on.first().copied()
    }

    fn set(&mut self, channel: LedChannel, state: LedState) {
        self.lit[index(channel)] = state.is_on();
        self.writes.push((channel, state));
    }
}

fn index(channel: LedChannel) -> usize {
    match channel {
        LedChannel::Green => 0,
        LedChannel::Yellow => 1,
        LedChannel::Red => 2,
    }
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub adc: u16,
    pub accel: Vec3,
    pub die_temperature_c: f32,
    pub imu_present: bool,
    /// Make `read_raw` fail with a bus error (IMU present but not answering).
    pub imu_bus_fault: bool,
    pub raw_reads: u32,
    pub adc_reads: u32,
    pub leds: MockLeds,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(adc: u16) -> Self {
        Self {
            adc,
            accel: AT_REST,
            die_temperature_c: 24.0,
            imu_present: true,
            imu_bus_fault: false,
            raw_reads: 0,
            adc_reads: 0,
            leds: MockLeds::default(),
        }
    }

    pub fn without_imu(adc: u16) -> Self {
        Self {
            imu_present: false,
            ..Self::new(adc)
        }
    }
}

impl SensorPort for MockHardware {
    fn read_raw(&mut self) -> Result<RawSample, SensorError> {
        self.raw_reads += 1;
        if !self.imu_present {
            return Err(SensorError::MotionUnavailable);
        }
        if self.imu_bus_fault {
            return Err(SensorError::BusFailed);
        }
        Ok(RawSample {
            adc_value: self.adc,
            acceleration: self.accel,
            die_temperature_c: self.die_temperature_c,
        })
    }

    fn read_tds_adc(&mut self) -> u16 {
        self.adc_reads += 1;
        self.adc
    }

    fn motion_available(&self) -> bool {
        self.imu_present
    }
}

impl StatusLedPort for MockHardware {
    fn set_led(&mut self, channel: LedChannel, state: LedState) {
        self.leds.set(channel, state);
    }
}

// ── MockNotifier ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockNotifier {
    pub connected: bool,
    pub fail_publish: Option<CommsError>,
    pub published: Vec<StatusRecord>,
    pub readvertised_at: Vec<u64>,
    /// Set by the test before each tick so re-advertise calls can be timed.
    pub now_ms: u64,
}

impl NotifierPort for MockNotifier {
    fn is_subscriber_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, record: &StatusRecord) -> Result<(), CommsError> {
        if let Some(e) = self.fail_publish {
            return Err(e);
        }
        self.published.push(*record);
        Ok(())
    }

    fn restart_advertising(&mut self) {
        self.readvertised_at.push(self.now_ms);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── ScriptedJitter ────────────────────────────────────────────

/// Replays scripted fractions of each requested range (0.0 = `lo`,
/// 1.0 = `hi`), then holds at the midpoint once the script runs out.
#[derive(Default)]
pub struct ScriptedJitter {
    script: VecDeque<f32>,
    pub draws: u32,
}

#[allow(dead_code)]
impl ScriptedJitter {
    pub fn new(fractions: &[f32]) -> Self {
        Self {
            script: fractions.iter().copied().collect(),
            draws: 0,
        }
    }
}

impl JitterSource for ScriptedJitter {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        self.draws += 1;
        let f = self.script.pop_front().unwrap_or(0.5);
        lo + (hi - lo) * f
    }
}

// ── RecordingDelay ────────────────────────────────────────────

/// Accumulates requested delay instead of sleeping.
#[derive(Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
