//! Randomness and time sources used by the simulated report fields.
//!
//! Inventory allocation, headcount availability, equipment utilization and
//! condition, delivery/service dates and current sustainability levels are
//! simulated. They draw from a [`Sampler`] so tests can pin them, and
//! completion percentages read "now" from a [`Clock`].

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform samples in `[0, 1)`.
pub trait Sampler {
    fn unit(&mut self) -> f64;

    /// Uniform sample in `[low, high)`.
    fn between(&mut self, low: f64, high: f64) -> f64 {
        low + self.unit() * (high - low)
    }
}

/// Sampler backed by `rand`'s standard RNG.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible stream: the same seed yields the same report.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Sampler for RandomSampler {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Always returns the same value (clamped into `[0, 1)`).
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler(pub f64);

impl Sampler for FixedSampler {
    fn unit(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A date 0-59 days after `now`, rendered like `Mar 4, 2025`.
pub fn future_date_label(sampler: &mut impl Sampler, now: DateTime<Utc>) -> String {
    let offset = (sampler.unit() * 60.0).floor() as i64;
    (now + Duration::days(offset)).format("%b %-d, %Y").to_string()
}
