//! Random jitter adapter.
//!
//! Implements [`JitterSource`] on top of `rand`'s `SmallRng`.  On target
//! the seed comes from the hardware RNG; host builds take an explicit
//! seed so test runs are reproducible.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::JitterSource;

/// Fixed seed for host builds.
#[cfg(not(target_os = "espidf"))]
const HOST_SEED: u64 = 0x5EED_0000_0000_7D55;

pub struct RngJitter {
    rng: SmallRng,
}

impl RngJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed from `esp_random()`.  The RF subsystem must be up for the
    /// hardware RNG to be a true entropy source, so call this after BLE start.
    #[cfg(target_os = "espidf")]
    pub fn from_hardware() -> Self {
        // SAFETY: esp_random() has no preconditions.
        let (hi, lo) = unsafe { (esp_idf_svc::sys::esp_random(), esp_idf_svc::sys::esp_random()) };
        Self::new((u64::from(hi) << 32) | u64::from(lo))
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn from_hardware() -> Self {
        Self::new(HOST_SEED)
    }
}

impl JitterSource for RngJitter {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}
