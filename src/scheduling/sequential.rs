//! Sequential back-end of the event generation

use crate::{
    error::Result,
    evgen::EventGenerator,
    random::RandomGenerator,
    scheduling::batch_ranges,
    stats::RunStatistics,
};

use std::io::Write;

/// Generate events in sequential mode, streaming them straight to the sink
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs: each batch owns a
/// substream of the RNG and its own statistics accumulator.
///
pub fn run_generation_impl(
    num_events: usize,
    mut rng: RandomGenerator,
    generator: &EventGenerator,
    sink: &mut impl Write,
) -> Result<RunStatistics> {
    let mut stats = RunStatistics::new(generator.species());
    for event_ids in batch_ranges(num_events) {
        // Give this batch the current substream, then move to the next one
        let mut batch_rng = rng.clone();
        rng.jump();

        let mut batch_stats = RunStatistics::new(generator.species());
        let first = event_ids.start;
        generator.generate_batch(event_ids, &mut batch_rng, sink, &mut batch_stats)?;
        log::debug!("Generated events {}..{}", first, first + batch_stats.events());
        stats.merge(batch_stats);
    }
    Ok(stats)
}
