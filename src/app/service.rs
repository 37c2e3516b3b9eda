//! Application service: the hexagonal core.
//!
//! [`MonitorService`] owns the live [`Reading`], the LED pattern engine,
//! and the subscriber link tracker.  It exposes a hardware-agnostic API;
//! all I/O flows through port traits injected at call sites, so the whole
//! pipeline runs on the host against mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                 │        MonitorService        │
//! StatusLedPort ◀─│ TDS · motion · classify · LED│──▶ NotifierPort
//!                 └─────────────────────────────┘
//! ```
//!
//! One [`tick`](MonitorService::tick) per main-loop poll:
//!
//! 1. sample the subscriber flag and advance the link state machine
//! 2. run whichever scheduled tasks are due (sample, notify)
//! 3. refresh the LEDs so the vibration blink keeps its phase

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::drivers::led_patterns::{
    INIT_OK, LedDirective, LedFrame, LedPatternEngine, LedState, SENSOR_MISSING_FLASH, SignalStep,
};
use crate::error::Error;
use crate::quality::{self, Thresholds, WaterStatus};
use crate::scheduler::Scheduler;
use crate::sensors::motion::MotionAnalyzer;
use crate::sensors::synthetic;
use crate::sensors::tds::TdsConverter;

use super::events::AppEvent;
use super::link::{LinkState, LinkTracker, LinkTransition};
use super::ports::{
    EventSink, JitterSource, NotifierPort, SchedulerDelegate, SensorPort, StatusLedPort, TaskId,
};
use super::reading::{Reading, ReadingSource};
use super::record::StatusRecord;

/// Result of [`MonitorService::startup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// Every sensor answered.
    Ready,
    /// IMU missing; running on simulated motion values.
    Degraded,
    /// IMU missing and `halt_on_sensor_missing` is set.  The caller stalls.
    Halted,
}

pub struct MonitorService<J: JitterSource> {
    config: SystemConfig,
    tds: TdsConverter,
    motion: MotionAnalyzer,
    thresholds: Thresholds,
    reading: Reading,
    leds: LedPatternEngine,
    link: LinkTracker,
    jitter: J,
    motion_available: bool,
    cycle_count: u64,
    publish_count: u64,
}

impl<J: JitterSource> MonitorService<J> {
    /// Construct the service.  `config` should already be validated.
    pub fn new(config: SystemConfig, jitter: J) -> Self {
        Self {
            tds: TdsConverter::from_config(&config),
            motion: MotionAnalyzer::from_config(&config),
            thresholds: Thresholds::from_config(&config),
            reading: Reading::default(),
            leds: LedPatternEngine::new(config.blink_half_period_ms),
            link: LinkTracker::new(config.readvertise_settle_ms),
            jitter,
            motion_available: true,
            cycle_count: 0,
            publish_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence: LEDs off, probe the IMU, play the boot signals.
    ///
    /// Blocks for the duration of the signals (about 3 s worst case).
    pub fn startup(
        &mut self,
        hw: &mut (impl SensorPort + StatusLedPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> StartupOutcome {
        hw.all_off();

        let mut outcome = StartupOutcome::Ready;
        if hw.motion_available() {
            info!("MonitorService: motion sensor online");
        } else {
            warn!("MonitorService: motion sensor not found");
            play_signal(&SENSOR_MISSING_FLASH, hw, delay);
            if self.config.halt_on_sensor_missing {
                sink.emit(&AppEvent::Halted);
                return StartupOutcome::Halted;
            }
            warn!("MonitorService: continuing with simulated motion values");
            self.motion_available = false;
            sink.emit(&AppEvent::DegradedMode);
            outcome = StartupOutcome::Degraded;
        }

        play_signal(&INIT_OK, hw, delay);
        self.leds.invalidate();
        sink.emit(&AppEvent::Started {
            motion_available: self.motion_available,
        });
        info!("MonitorService started ({:?})", outcome);
        outcome
    }

    // ── Per-poll orchestration ────────────────────────────────

    /// One main-loop poll.  `hw` satisfies both the sensor and LED ports,
    /// which avoids a double mutable borrow of the hardware adapter.
    pub fn tick(
        &mut self,
        now_ms: u64,
        scheduler: &mut Scheduler,
        hw: &mut (impl SensorPort + StatusLedPort),
        notifier: &mut impl NotifierPort,
        sink: &mut impl EventSink,
    ) {
        self.poll_link(now_ms, notifier, sink);

        let mut dispatch = Dispatch {
            service: self,
            hw: &mut *hw,
            notifier: &mut *notifier,
            sink: &mut *sink,
        };
        scheduler.tick(now_ms, &mut dispatch);

        self.refresh_leds(now_ms, hw);
    }

    /// Observe the subscriber flag and restart advertising once the
    /// settle deadline after a disconnect has passed.
    pub fn poll_link(
        &mut self,
        now_ms: u64,
        notifier: &mut impl NotifierPort,
        sink: &mut impl EventSink,
    ) {
        match self.link.observe(notifier.is_subscriber_connected(), now_ms) {
            Some(LinkTransition::Connected) => sink.emit(&AppEvent::SubscriberConnected),
            Some(LinkTransition::Disconnected) => sink.emit(&AppEvent::SubscriberDisconnected),
            None => {}
        }
        if self.link.take_readvertise_due(now_ms) {
            notifier.restart_advertising();
            sink.emit(&AppEvent::AdvertisingRestarted);
        }
    }

    /// Full sampling cycle: read, convert, classify, retarget the LEDs.
    pub fn sample(
        &mut self,
        now_ms: u64,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> &Reading {
        let (adc_value, motion, source) = if self.motion_available {
            match hw.read_raw() {
                Ok(raw) => (
                    raw.adc_value,
                    self.motion.analyze(raw.acceleration, raw.die_temperature_c),
                    ReadingSource::Measured,
                ),
                Err(e) => {
                    warn!("MonitorService: {}, simulating this cycle", Error::from(e));
                    (
                        hw.read_tds_adc(),
                        self.motion.simulate(&mut self.jitter),
                        ReadingSource::Simulated,
                    )
                }
            }
        } else {
            (
                hw.read_tds_adc(),
                self.motion.simulate(&mut self.jitter),
                ReadingSource::Simulated,
            )
        };

        let tds = self.tds.convert(adc_value);
        let synth = synthetic::sample(now_ms, &mut self.jitter);
        let previous = self.reading.water_status;
        let status = quality::classify(previous, tds, motion.vibration_detected, &self.thresholds);

        self.reading = Reading {
            tds,
            temperature: motion.temperature_c,
            vibration: motion.vibration,
            vibration_detected: motion.vibration_detected,
            ph: synth.ph,
            turbidity: synth.turbidity,
            water_status: status,
            timestamp_ms: now_ms,
            source,
        };
        self.cycle_count += 1;
        self.leds.set_directive(LedDirective::for_status(status));

        if status != previous {
            sink.emit(&AppEvent::StatusChanged {
                from: previous,
                to: status,
            });
        }
        sink.emit(&AppEvent::CycleCompleted(self.reading));
        &self.reading
    }

    /// Push the current reading if a subscriber is connected.
    /// Returns `true` when a record went out.
    pub fn notify(&mut self, notifier: &mut impl NotifierPort, sink: &mut impl EventSink) -> bool {
        if !self.link.is_connected() {
            return false;
        }
        let record = StatusRecord::from_reading(&self.reading);
        match notifier.publish(&record) {
            Ok(()) => {
                self.publish_count += 1;
                sink.emit(&AppEvent::RecordPublished(record));
                true
            }
            Err(e) => {
                sink.emit(&AppEvent::PublishFailed(e));
                false
            }
        }
    }

    /// Resolve the LED directive at `now_ms` and write any change.
    pub fn refresh_leds(&mut self, now_ms: u64, leds: &mut impl StatusLedPort) {
        if let Some(frame) = self.leds.tick(now_ms) {
            apply_frame(frame, leds);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    pub fn status(&self) -> WaterStatus {
        self.reading.water_status
    }

    pub fn led_directive(&self) -> LedDirective {
        self.leds.directive()
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    pub fn motion_available(&self) -> bool {
        self.motion_available
    }

    /// Sampling cycles completed since boot.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Records successfully published since boot.
    pub fn publish_count(&self) -> u64 {
        self.publish_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}

// ── Scheduler dispatch ────────────────────────────────────────

/// Borrows the service and its ports for the length of one scheduler tick.
struct Dispatch<'a, J: JitterSource, H, N, E> {
    service: &'a mut MonitorService<J>,
    hw: &'a mut H,
    notifier: &'a mut N,
    sink: &'a mut E,
}

impl<J, H, N, E> SchedulerDelegate for Dispatch<'_, J, H, N, E>
where
    J: JitterSource,
    H: SensorPort,
    N: NotifierPort,
    E: EventSink,
{
    fn on_task_due(&mut self, task: TaskId, now_ms: u64) {
        match task {
            TaskId::Sample => {
                self.service.sample(now_ms, &mut *self.hw, &mut *self.sink);
            }
            TaskId::Notify => {
                self.service.notify(&mut *self.notifier, &mut *self.sink);
            }
        }
    }
}

// ── LED helpers ───────────────────────────────────────────────

/// All off first, then light the chosen LED.
fn apply_frame(frame: LedFrame, leds: &mut impl StatusLedPort) {
    leds.all_off();
    if let Some(channel) = frame.lit {
        leds.set_led(channel, LedState::On);
    }
}

fn play_signal(steps: &[SignalStep], leds: &mut impl StatusLedPort, delay: &mut impl DelayNs) {
    for step in steps {
        leds.set_led(step.channel, step.state);
        if step.hold_ms > 0 {
            delay.delay_ms(step.hold_ms);
        }
    }
}
