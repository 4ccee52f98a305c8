//! Random number generation module
//!
//! Samplers only ever see the `RandomSource` capability, so that they can be
//! fed from a scripted source in tests. Actual runs use `RandomGenerator`, a
//! seedable facade over the "rand" crate ecosystem.

mod standard;

pub use self::standard::RandGenerator as RandomGenerator;

use crate::numeric::Float;

/// Capabilities which the samplers expect from a source of randomness
pub trait RandomSource {
    /// Generate a floating-point number uniformly distributed in [0, 1)
    fn uniform(&mut self) -> Float;

    /// Generate a normally distributed floating-point number
    fn gaussian(&mut self, mean: Float, stddev: Float) -> Float;

    /// Generate an integer uniformly distributed in [0, bound), bound must
    /// not be zero
    fn integer(&mut self, bound: u32) -> u32;

    /// Generate a floating-point number uniformly distributed in [low, high)
    fn uniform_in(&mut self, low: Float, high: Float) -> Float {
        low + (high - low) * self.uniform()
    }
}
