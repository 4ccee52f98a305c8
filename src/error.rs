//! Error taxonomy of the event generator
//!
//! Every error defined here is fatal to a generation run. Malformed records
//! found while decoding a document are not errors: see `codec::ParseWarning`.

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Things which can go wrong while configuring or running a generation
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration is inconsistent, detected before generation starts
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A species key is not present in the catalog
    #[error("unknown particle species \"{0}\"")]
    UnknownSpecies(String),

    /// A rejection sampling loop did not accept any draw within its budget.
    ///
    /// With sane bounds this only happens if the random source is broken,
    /// and we refuse to hand out an out-of-bounds value in that case.
    #[error("{what} sampling stalled after {attempts} rejected draws")]
    SamplingStall {
        /// Quantity which was being sampled
        what: &'static str,
        /// Number of draws which were rejected
        attempts: u32,
    },

    /// The output sink failed, the document on disk must not be trusted
    #[error("failed to write the event document")]
    Sink(#[from] std::io::Error),
}
