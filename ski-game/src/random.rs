//! Uniform randomness helpers shared by every stochastic rule.
//!
//! All draws funnel through [`RandomSource::uniform01`]; `random` and `percent`
//! are defined on top of it so that alternative sources (seeded or fixed)
//! keep the exact distribution shape the balance depends on.
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::constants::{PERCENT_DRAW_SCALE, PERCENT_DRAW_SPAN};

/// Source of uniform draws for the simulation.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn uniform01(&mut self) -> f64;

    /// `floor(uniform01() * max) + min`, i.e. a value in `[min, min + max)`.
    ///
    /// Note that `max` is a span, not an upper bound.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn random(&mut self, min: i64, max: i64) -> i64 {
        (self.uniform01() * max as f64).floor() as i64 + min
    }

    /// True when a draw on the 0 to 100 scale (0.01 resolution) is `<= p`.
    #[allow(clippy::cast_precision_loss)]
    fn percent(&mut self, p: f64) -> bool {
        let draw = self.random(0, PERCENT_DRAW_SPAN) as f64 / PERCENT_DRAW_SCALE;
        draw <= p
    }
}

/// Seeded source backed by [`SmallRng`], counting draws for instrumentation.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
    seed: u64,
    draws: u64,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Pick a fresh seed from the thread-local generator.
    #[must_use]
    pub fn from_entropy_seed() -> Self {
        Self::new(rand::random())
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of uniform draws taken so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for SeededRandom {
    fn uniform01(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.r#gen::<f64>()
    }
}

/// Deterministic source returning the same uniform draw every time.
///
/// `percent` can be pinned to a fixed outcome, which makes it possible to
/// script sessions where no mishap ever happens (or where every one does).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRandom {
    uniform: f64,
    percent: Option<bool>,
}

impl FixedRandom {
    /// Every `random(min, max)` returns `min`.
    #[must_use]
    pub const fn floor() -> Self {
        Self {
            uniform: 0.0,
            percent: None,
        }
    }

    /// Use a specific uniform draw, clamped into `[0, 1)`.
    #[must_use]
    pub fn with_uniform(uniform: f64) -> Self {
        Self {
            uniform: uniform.clamp(0.0, 1.0 - f64::EPSILON),
            percent: None,
        }
    }

    /// Force every `percent` roll to the given outcome.
    #[must_use]
    pub const fn with_percent(mut self, outcome: bool) -> Self {
        self.percent = Some(outcome);
        self
    }
}

impl RandomSource for FixedRandom {
    fn uniform01(&mut self) -> f64 {
        self.uniform
    }

    fn percent(&mut self, p: f64) -> bool {
        match self.percent {
            Some(outcome) => outcome,
            None => {
                #[allow(clippy::cast_precision_loss)]
                let draw = self.random(0, PERCENT_DRAW_SPAN) as f64 / PERCENT_DRAW_SCALE;
                draw <= p
            }
        }
    }
}
