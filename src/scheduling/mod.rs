//! This module takes care of scheduling the generation work, encapsulating use
//! of multiple threads and anything else that will come in the future

// The sequential back-end is also the reference of multi-threaded tests
#[cfg(any(test, not(feature = "multi-threading")))] mod sequential;
#[cfg(feature = "multi-threading")] mod multi_threading;

use crate::{
    codec, config::Configuration, error::Result, evgen::EventGenerator,
    random::RandomGenerator, stats::RunStatistics,
};

use std::io::Write;


/// Size of the generated event batches
///
/// Events are generated in batches, each of which draws its random numbers
/// from a dedicated substream of the random number generator. This makes the
/// output independent of how batches are scheduled, so that sequential and
/// parallel runs produce byte-identical documents.
///
/// Changing this constant changes the output of every seeded run.
///
pub const EVENT_BATCH_SIZE: usize = 10_000;


/// Generate a full event document into a sink, in the manner that was
/// configured at build time.
///
/// The document header is written first, then every event in increasing
/// event_id order, then the footer. If anything fails midway, the run is
/// aborted and the footer is never written, which marks the document as
/// incomplete for readers.
///
/// Returns the statistics of the generated events
///
pub fn run_generation(cfg: &Configuration, sink: &mut impl Write) -> Result<RunStatistics> {
    // Refuse to generate anything from a broken configuration
    cfg.validate()?;
    log::info!(
        "Generating {} events with seed {} in batches of {}",
        cfg.num_events,
        cfg.seed,
        EVENT_BATCH_SIZE
    );

    // Initialize the event generator and the random number generator
    let generator = EventGenerator::new(cfg);
    let rng = RandomGenerator::new(cfg.seed);

    codec::write_header(sink)?;

    // Generate the events...
    let stats = {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        { sequential::run_generation_impl(cfg.num_events, rng, &generator, sink)? }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        { multi_threading::run_generation_impl(cfg.num_events, rng, &generator, sink)? }
    };

    codec::write_footer(sink)?;
    sink.flush()?;
    log::info!("Generated {} events", stats.events());
    Ok(stats)
}

/// Event_id range of each batch, in order
fn batch_ranges(num_events: usize) -> impl Iterator<Item = std::ops::Range<usize>> {
    (0..num_events)
        .step_by(EVENT_BATCH_SIZE)
        .map(move |first| first..(first + EVENT_BATCH_SIZE).min(num_events))
}
