//! Cooperative periodic-task scheduler.
//!
//! The main loop polls [`Scheduler::tick`] with the current uptime; every
//! task whose period has strictly elapsed since its last run is handed to
//! the [`SchedulerDelegate`].  Nothing here blocks or spawns.
//!
//! ```text
//!  main loop ── now_ms ──▶ Scheduler ──on_task_due──▶ SchedulerDelegate
//!                          ┌──────────┬─────────┐        (MonitorService)
//!                          │ Sample   │ 3000 ms │
//!                          │ Notify   │ 1000 ms │
//!                          └──────────┴─────────┘
//! ```
//!
//! A task fires when `now - last_run > period`.  `last_run` starts at
//! zero, so the first sample lands one full period after boot.  A late
//! poll fires a task once, never a burst of catch-up runs.

use log::info;

use crate::app::ports::{SchedulerDelegate, TaskId};
use crate::config::SystemConfig;

/// Maximum number of concurrent tasks (stack-allocated).
const MAX_TASKS: usize = 4;

#[derive(Debug, Clone)]
struct TaskEntry {
    id: TaskId,
    label: &'static str,
    period_ms: u32,
    last_run_ms: u64,
    enabled: bool,
}

pub struct Scheduler {
    tasks: [Option<TaskEntry>; MAX_TASKS],
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None, None, None, None],
        }
    }

    /// Sample and notify tasks at the configured periods.  Notify is
    /// disabled when BLE is turned off.
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut sched = Self::new();
        sched.add(TaskId::Sample, "sample", config.sample_interval_ms);
        sched.add(TaskId::Notify, "notify", config.notify_interval_ms);
        if !config.ble_enabled {
            sched.set_enabled(TaskId::Notify, false);
        }
        sched
    }

    /// Register a periodic task.  Returns the slot, or `None` if full.
    pub fn add(&mut self, id: TaskId, label: &'static str, period_ms: u32) -> Option<usize> {
        for (i, slot) in self.tasks.iter_mut().enumerate() {
            if slot.is_none() {
                info!("Scheduler: '{}' every {} ms (slot {})", label, period_ms, i);
                *slot = Some(TaskEntry {
                    id,
                    label,
                    period_ms,
                    last_run_ms: 0,
                    enabled: true,
                });
                return Some(i);
            }
        }
        None
    }

    pub fn set_enabled(&mut self, id: TaskId, enabled: bool) {
        for entry in self.tasks.iter_mut().flatten() {
            if entry.id == id {
                entry.enabled = enabled;
            }
        }
    }

    pub fn is_enabled(&self, id: TaskId) -> bool {
        self.tasks
            .iter()
            .flatten()
            .any(|e| e.id == id && e.enabled)
    }

    /// Fire every due task in slot order.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.tasks.iter_mut().flatten() {
            if !entry.enabled {
                continue;
            }
            if now_ms.saturating_sub(entry.last_run_ms) > u64::from(entry.period_ms) {
                entry.last_run_ms = now_ms;
                log::trace!("Scheduler: '{}' due at {} ms", entry.label, now_ms);
                delegate.on_task_due(entry.id, now_ms);
            }
        }
    }

    /// Number of enabled tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().flatten().filter(|e| e.enabled).count()
    }
}
