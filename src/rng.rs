//! Shared pseudo-random stream for the simulation.
//!
//! All randomness (world generation, AI re-targeting, weapon spread, spawn
//! rolls) is drawn from this single resource. Determinism across runs is not
//! guaranteed by default; tests that need it construct the stream with a
//! fixed seed.

use crate::math::Vec2;
use bevy_ecs::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// The simulation's random stream.
#[derive(Resource)]
pub struct SimRng(SmallRng);

impl SimRng {
    /// Entropy-seeded stream.
    pub fn new() -> Self {
        Self(SmallRng::from_entropy())
    }

    /// Fixed-seed stream for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Uniform float in `[0, 1)`.
    pub fn f32(&mut self) -> f32 {
        self.0.gen::<f32>()
    }

    /// Uniform float in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.0.gen_range(lo..hi)
    }

    /// Uniform integer in `[lo, hi]`.
    pub fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        self.0.gen_range(lo..=hi)
    }

    /// Bernoulli trial.
    pub fn chance(&mut self, p: f32) -> bool {
        self.f32() < p
    }

    /// Uniform point in the closed unit disc, by rejection sampling.
    pub fn in_unit_disc(&mut self) -> Vec2 {
        loop {
            let v = Vec2::new(self.range(-1.0, 1.0), self.range(-1.0, 1.0));
            if v.len_sq() <= 1.0 {
                return v;
            }
        }
    }

    /// Uniform direction on the unit circle.
    pub fn unit_dir(&mut self) -> Vec2 {
        loop {
            let v = self.in_unit_disc();
            if v.len_sq() > 1e-6 {
                return v.normalized();
            }
        }
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new()
    }
}
