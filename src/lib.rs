//! Beam envelope: a simple Monte Carlo event generator
//!
//!
//! # Introduction (for the physicist)
//!
//! This small program synthesizes beam particles for detector and analysis
//! studies. Each event is a single hadron or light nucleus leaving a planar
//! source, with a Gaussian momentum spectrum cut to a momentum window, a
//! direction uniformly spread within a narrow forward cone, and a Gaussian
//! transverse spot cut to a square region. Runs either use a single species or
//! a fixed mixture such as proton:pion:kaon = 5:3:1.
//!
//!
//! # Introduction (for the numerical guy)
//!
//! Hard cutoffs on top of Gaussian distributions are achieved by rejection
//! sampling. Every loop has a retry ceiling, hitting it is an error rather
//! than an excuse to clamp. All randomness comes from one seedable generator,
//! split into one substream per batch of events, so a given seed reproduces
//! the same document bit-for-bit whatever the scheduling.
//!
//!
//! # Introduction (for the computer guy)
//!
//! * read in and check the configuration
//! * loop over events, streaming each of them to the output document:
//!     * select the species (fixed, or drawn from the mixture),
//!     * sample the momentum and the production vertex,
//!     * derive the energy from the momentum and the rest mass,
//!     * encode the event as HepMC3 ASCII records
//! * then display a summary of the run.
//!
//! The `codec` module also decodes documents back, skipping malformed lines,
//! for downstream analysis tools.

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod evgen;
pub mod kinematics;
pub mod logging;
pub mod numeric;
pub mod output;
pub mod random;
pub mod scheduling;
pub mod selector;
pub mod species;
pub mod stats;

pub use crate::{
    config::Configuration,
    error::{Error, Result},
    scheduling::run_generation,
};
