//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the main loop stops feeding it.  The longest gap
//! between feeds is the blocking boot signal followed by one poll, so the
//! timeout is sized from the loop configuration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::config::SystemConfig;
use crate::drivers::led_patterns::boot_signal_ms;

/// Floor for the TWDT timeout (milliseconds).
pub const MIN_TIMEOUT_MS: u32 = 10_000;

/// Headroom multiplier over the longest expected gap between feeds.
const GAP_MARGIN: u32 = 3;

/// TWDT timeout for a loop running with `config`.
pub fn timeout_for(config: &SystemConfig) -> u32 {
    let longest_gap = boot_signal_ms().saturating_add(config.loop_poll_interval_ms);
    longest_gap.saturating_mul(GAP_MARGIN).max(MIN_TIMEOUT_MS)
}

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT to `timeout_ms` and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT API calls from the main task during boot.
            let subscribed = unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("Watchdog: reconfigure returned {}", ret);
                }
                esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
            };
            if subscribed {
                info!("Watchdog: main task subscribed, {} ms", timeout_ms);
            } else {
                log::warn!("Watchdog: main task not subscribed, loop stalls go unnoticed");
            }
            Self {
                timeout_ms,
                subscribed,
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {} ms, never fires", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(timeout_for(config))
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Call once per loop iteration, including while halted.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the subscribed calling task.
            unsafe { esp_task_wdt_reset() };
        }
    }
}
