//! Test rig: a `MonitorService` wired to the mock adapters and driven by
//! a simulated clock in fixed poll steps.

use watersensor::app::service::{MonitorService, StartupOutcome};
use watersensor::config::SystemConfig;
use watersensor::scheduler::Scheduler;

use crate::mock_hw::{MockHardware, MockNotifier, RecordingDelay, RecordingSink, ScriptedJitter};

pub struct Rig {
    pub app: MonitorService<ScriptedJitter>,
    pub sched: Scheduler,
    pub hw: MockHardware,
    pub ble: MockNotifier,
    pub sink: RecordingSink,
    pub delay: RecordingDelay,
    /// Time of the next poll.
    pub now_ms: u64,
    poll_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: SystemConfig, hw: MockHardware) -> Self {
        Self::with_jitter(config, hw, ScriptedJitter::default())
    }

    pub fn with_jitter(config: SystemConfig, hw: MockHardware, jitter: ScriptedJitter) -> Self {
        let poll_ms = u64::from(config.loop_poll_interval_ms);
        Self {
            sched: Scheduler::from_config(&config),
            app: MonitorService::new(config, jitter),
            hw,
            ble: MockNotifier::default(),
            sink: RecordingSink::default(),
            delay: RecordingDelay::default(),
            now_ms: 0,
            poll_ms,
        }
    }

    pub fn start(&mut self) -> StartupOutcome {
        self.app.startup(&mut self.hw, &mut self.delay, &mut self.sink)
    }

    /// Poll once at every step up to and including `end_ms`.
    pub fn run_until(&mut self, end_ms: u64) {
        while self.now_ms <= end_ms {
            self.ble.now_ms = self.now_ms;
            self.app
                .tick(self.now_ms, &mut self.sched, &mut self.hw, &mut self.ble, &mut self.sink);
            self.now_ms += self.poll_ms;
        }
    }
}
