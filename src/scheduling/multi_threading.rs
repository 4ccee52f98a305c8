//! Multi-threaded back-end of the event generation

use crate::{
    error::Result,
    evgen::EventGenerator,
    random::RandomGenerator,
    scheduling::batch_ranges,
    stats::RunStatistics,
};

use rayon::prelude::*;

use std::io::Write;

/// Rough size of one encoded event, used to preallocate batch buffers
const BYTES_PER_EVENT_HINT: usize = 320;

/// Generate events in multi-threaded mode
///
/// Batches are generated in parallel into in-memory buffers, a window of them
/// at a time, and written out in event_id order since the document format is
/// order-sensitive. Bounding the window keeps memory usage bounded too.
///
pub fn run_generation_impl(
    num_events: usize,
    mut rng: RandomGenerator,
    generator: &EventGenerator,
    sink: &mut impl Write,
) -> Result<RunStatistics> {
    let window = rayon::current_num_threads().max(1);
    let mut stats = RunStatistics::new(generator.species());
    let mut batches = batch_ranges(num_events).peekable();

    while batches.peek().is_some() {
        // Hand out RNG substreams in batch order, exactly like the sequential
        // back-end does, so that both produce the same events.
        let tasks = batches
            .by_ref()
            .take(window)
            .map(|event_ids| {
                let task_rng = rng.clone();
                rng.jump();
                (event_ids, task_rng)
            })
            .collect::<Vec<_>>();

        // Generate the batches of this window in parallel. Collecting an
        // indexed parallel iterator preserves the batch order.
        let outputs = tasks
            .into_par_iter()
            .map(|(event_ids, mut task_rng)| -> Result<(Vec<u8>, RunStatistics)> {
                let mut buffer = Vec::with_capacity(event_ids.len() * BYTES_PER_EVENT_HINT);
                let mut batch_stats = RunStatistics::new(generator.species());
                generator.generate_batch(event_ids, &mut task_rng, &mut buffer, &mut batch_stats)?;
                Ok((buffer, batch_stats))
            })
            .collect::<Result<Vec<_>>>()?;

        // Write them out in order
        for (buffer, batch_stats) in outputs {
            sink.write_all(&buffer)?;
            log::debug!("Wrote a batch of {} events", batch_stats.events());
            stats.merge(batch_stats);
        }
    }
    Ok(stats)
}
