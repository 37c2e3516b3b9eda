//! Placeholder pH and turbidity channels.
//!
//! The board has no pH or turbidity probe yet.  These values are
//! **synthetic**: a slow sine over process uptime plus bounded uniform
//! jitter, kept only so the companion app has something plausible to plot.
//! Do not treat them as measurements.
//!
//! ```text
//! pH        = clamp(7.0 + 0.8·sin(t/15000) ± 0.10, 6.0, 9.0)
//! turbidity = clamp(2.0 + 1.5·sin(t/18000) ± 0.30, 0.1, 10.0)
//! ```

use crate::app::ports::JitterSource;

pub const PH_BASE: f32 = 7.0;
pub const PH_AMPLITUDE: f32 = 0.8;
pub const PH_PERIOD_MS: f32 = 15_000.0;
pub const PH_JITTER: f32 = 0.10;
pub const PH_MIN: f32 = 6.0;
pub const PH_MAX: f32 = 9.0;

pub const TURBIDITY_BASE: f32 = 2.0;
pub const TURBIDITY_AMPLITUDE: f32 = 1.5;
pub const TURBIDITY_PERIOD_MS: f32 = 18_000.0;
pub const TURBIDITY_JITTER: f32 = 0.30;
pub const TURBIDITY_MIN: f32 = 0.1;
pub const TURBIDITY_MAX: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticReading {
    pub ph: f32,
    pub turbidity: f32,
}

/// Synthetic pH at uptime `t_ms`.
pub fn ph(t_ms: u64, jitter: &mut impl JitterSource) -> f32 {
    let t = t_ms as f64;
    let wave = (t / f64::from(PH_PERIOD_MS)).sin() as f32;
    (PH_BASE + PH_AMPLITUDE * wave + jitter.uniform(-PH_JITTER, PH_JITTER)).clamp(PH_MIN, PH_MAX)
}

/// Synthetic turbidity (NTU) at uptime `t_ms`.
pub fn turbidity(t_ms: u64, jitter: &mut impl JitterSource) -> f32 {
    let t = t_ms as f64;
    let wave = (t / f64::from(TURBIDITY_PERIOD_MS)).sin() as f32;
    (TURBIDITY_BASE
        + TURBIDITY_AMPLITUDE * wave
        + jitter.uniform(-TURBIDITY_JITTER, TURBIDITY_JITTER))
    .clamp(TURBIDITY_MIN, TURBIDITY_MAX)
}

/// Both channels for one cycle.  pH draws its jitter first.
pub fn sample(t_ms: u64, jitter: &mut impl JitterSource) -> SyntheticReading {
    let ph = ph(t_ms, jitter);
    let turbidity = turbidity(t_ms, jitter);
    SyntheticReading { ph, turbidity }
}
