//! Status LED pattern engine.
//!
//! Maps a [`WaterStatus`] to a directive for the three discrete LEDs and
//! resolves that directive against wall time.  The main loop calls
//! [`LedPatternEngine::tick`] on every poll; the engine reports a new
//! [`LedFrame`] only when the lit LED actually changes, so GPIO writes
//! stay minimal.
//!
//! | Status               | Directive         |
//! |----------------------|-------------------|
//! | `Clean`              | green steady      |
//! | `Unsafe`             | yellow steady     |
//! | `ExtremelyUnsafe`    | red steady        |
//! | `VibrationDetected`  | yellow blinking   |
//! | `Unknown`            | all off           |
//!
//! At most one LED is lit in any frame.

use crate::quality::WaterStatus;

/// One of the three discrete status LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedChannel {
    Green,
    Yellow,
    Red,
}

impl LedChannel {
    pub const ALL: [LedChannel; 3] = [LedChannel::Green, LedChannel::Yellow, LedChannel::Red];

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    On,
    Off,
}

impl LedState {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedDirective {
    Steady(LedChannel),
    /// Square wave: lit on odd half-periods, `(now / half_period) % 2 == 1`.
    Blink(LedChannel),
    #[default]
    Off,
}

impl LedDirective {
    pub const fn for_status(status: WaterStatus) -> Self {
        match status {
            WaterStatus::Clean => Self::Steady(LedChannel::Green),
            WaterStatus::Unsafe => Self::Steady(LedChannel::Yellow),
            WaterStatus::ExtremelyUnsafe => Self::Steady(LedChannel::Red),
            WaterStatus::VibrationDetected => Self::Blink(LedChannel::Yellow),
            WaterStatus::Unknown => Self::Off,
        }
    }

    /// Which LED is lit at `now_ms`, if any.
    pub fn resolve(self, now_ms: u64, half_period_ms: u32) -> LedFrame {
        let lit = match self {
            Self::Steady(ch) => Some(ch),
            Self::Blink(ch) => {
                let half = u64::from(half_period_ms.max(1));
                ((now_ms / half) % 2 == 1).then_some(ch)
            }
            Self::Off => None,
        };
        LedFrame { lit }
    }
}

/// Resolved output for all three LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedFrame {
    pub lit: Option<LedChannel>,
}

impl LedFrame {
    pub const OFF: LedFrame = LedFrame { lit: None };

    pub fn state(&self, channel: LedChannel) -> LedState {
        if self.lit == Some(channel) {
            LedState::On
        } else {
            LedState::Off
        }
    }
}

/// Tracks the active directive and the last frame pushed to the pins.
pub struct LedPatternEngine {
    directive: LedDirective,
    half_period_ms: u32,
    applied: Option<LedFrame>,
}

impl LedPatternEngine {
    pub fn new(half_period_ms: u32) -> Self {
        Self {
            directive: LedDirective::Off,
            half_period_ms,
            applied: None,
        }
    }

    pub fn directive(&self) -> LedDirective {
        self.directive
    }

    pub fn set_directive(&mut self, directive: LedDirective) {
        self.directive = directive;
    }

    /// Forget the applied frame so the next tick rewrites every pin.
    pub fn invalidate(&mut self) {
        self.applied = None;
    }

    /// Resolve the directive at `now_ms`.  Returns the frame only if it
    /// differs from what is already on the pins.
    pub fn tick(&mut self, now_ms: u64) -> Option<LedFrame> {
        let frame = self.directive.resolve(now_ms, self.half_period_ms);
        if self.applied == Some(frame) {
            return None;
        }
        self.applied = Some(frame);
        Some(frame)
    }
}

// ── Boot signals ──────────────────────────────────────────────

/// One timed step of a blocking boot signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalStep {
    pub channel: LedChannel,
    pub state: LedState,
    pub hold_ms: u32,
}

const fn step(channel: LedChannel, state: LedState, hold_ms: u32) -> SignalStep {
    SignalStep {
        channel,
        state,
        hold_ms,
    }
}

/// Red 5× at 200 ms on / 200 ms off: motion sensor not found.
pub const SENSOR_MISSING_FLASH: [SignalStep; 10] = [
    step(LedChannel::Red, LedState::On, 200),
    step(LedChannel::Red, LedState::Off, 200),
    step(LedChannel::Red, LedState::On, 200),
    step(LedChannel::Red, LedState::Off, 200),
    step(LedChannel::Red, LedState::On, 200),
    step(LedChannel::Red, LedState::Off, 200),
    step(LedChannel::Red, LedState::On, 200),
    step(LedChannel::Red, LedState::Off, 200),
    step(LedChannel::Red, LedState::On, 200),
    step(LedChannel::Red, LedState::Off, 200),
];

/// Green for one second: initialisation complete.
pub const INIT_OK: [SignalStep; 2] = [
    step(LedChannel::Green, LedState::On, 1000),
    step(LedChannel::Green, LedState::Off, 0),
];

/// Worst-case time spent blocking in boot signals: the missing-sensor
/// flash followed by the init signal.
pub fn boot_signal_ms() -> u32 {
    SENSOR_MISSING_FLASH
        .iter()
        .chain(INIT_OK.iter())
        .map(|s| s.hold_ms)
        .sum()
}
