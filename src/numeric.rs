//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

// Floating-point precision is configured here
//
// NOTE: There is no f32 mode. Momenta are written with six decimals, which is
//       more than single precision holds around 10 GeV/c.
pub type Float = f64;
pub use std::f64 as floats;
