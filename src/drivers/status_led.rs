//! Discrete status LED driver.
//!
//! Three plain GPIO outputs (green, yellow, red), active HIGH.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the pins via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::drivers::led_patterns::{LedChannel, LedState};
use crate::pins;

pub struct StatusLeds {
    lit: [bool; 3],
}

impl Default for StatusLeds {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLeds {
    pub fn new() -> Self {
        Self { lit: [false; 3] }
    }

    pub fn set(&mut self, channel: LedChannel, state: LedState) {
        hw_init::gpio_write(gpio_for(channel), state.is_on());
        self.lit[index(channel)] = state.is_on();
    }

    pub fn is_on(&self, channel: LedChannel) -> bool {
        self.lit[index(channel)]
    }

    pub fn lit_count(&self) -> usize {
        self.lit.iter().filter(|&&on| on).count()
    }
}

const fn gpio_for(channel: LedChannel) -> i32 {
    match channel {
        LedChannel::Green => pins::LED_GREEN_GPIO,
        LedChannel::Yellow => pins::LED_YELLOW_GPIO,
        LedChannel::Red => pins::LED_RED_GPIO,
    }
}

const fn index(channel: LedChannel) -> usize {
    match channel {
        LedChannel::Green => 0,
        LedChannel::Yellow => 1,
        LedChannel::Red => 2,
    }
}
