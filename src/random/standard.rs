//! This module implements the RandomSource interface on top of the
//! abstractions of the standard "rand" crate.

use super::RandomSource;
use crate::numeric::Float;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

// Select random number generation engine in use
type Engine = rand_xoshiro::Xoshiro256Plus;

/// Seedable generator which can be split into non-overlapping substreams
#[derive(Clone, Debug)]
pub struct RandGenerator {
    rng: Engine,
    seed: u64,
}
//
impl RandGenerator {
    /// Spawn a new random number generator from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Engine::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed which this generator was initialized with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Switch to the next non-overlapping substream.
    ///
    /// Equivalent to 2^128 calls to the underlying engine, so substreams
    /// reached by different numbers of jumps never overlap in practice.
    pub fn jump(&mut self) {
        self.rng.jump();
    }
}

impl RandomSource for RandGenerator {
    fn uniform(&mut self) -> Float {
        self.rng.gen()
    }

    fn gaussian(&mut self, mean: Float, stddev: Float) -> Float {
        let z: Float = StandardNormal.sample(&mut self.rng);
        mean + stddev * z
    }

    fn integer(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }
}
