//! This module provides event generation facilities

use crate::{
    codec,
    config::Configuration,
    error::Result,
    event::Event,
    kinematics::KinematicsSampler,
    random::RandomSource,
    selector::SpeciesSelector,
    species::Species,
    stats::RunStatistics,
};

use std::{io::Write, ops::Range, slice};

/// How the species of each event is chosen
#[derive(Clone, Debug)]
pub enum SpeciesMode {
    /// Every event carries the same species
    Fixed(Species),

    /// Each event draws its species from a categorical mixture
    Mixed(SpeciesSelector),
}
//
impl SpeciesMode {
    /// Species which may appear in the run
    pub fn species(&self) -> &[Species] {
        match self {
            Self::Fixed(species) => slice::from_ref(species),
            Self::Mixed(selector) => selector.species(),
        }
    }
}

/// Generator of single-particle beam events
pub struct EventGenerator {
    /// Species selection policy
    mode: SpeciesMode,

    /// Momentum and vertex sampler
    kinematics: KinematicsSampler,
}
//
impl EventGenerator {
    // ### CONSTRUCTION ###

    /// Set up event generation as configured
    pub fn new(cfg: &Configuration) -> Self {
        Self {
            mode: cfg.species.clone(),
            kinematics: KinematicsSampler::new(cfg.kinematics.clone()),
        }
    }

    /// Species which may appear in generated events
    pub fn species(&self) -> &[Species] {
        self.mode.species()
    }

    // ### EVENT GENERATION ###

    /// Generate one event
    ///
    /// Random numbers are always consumed in the same order: species (mixed
    /// runs only), then momentum, then vertex. Changing this order changes
    /// the output of every seeded run.
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        event_id: usize,
        rng: &mut R,
    ) -> Result<Event<'_>> {
        let species = match &self.mode {
            SpeciesMode::Fixed(species) => species,
            SpeciesMode::Mixed(selector) => selector.select(rng.uniform()),
        };
        let momentum = self.kinematics.sample_momentum(rng)?;
        let vertex = self.kinematics.sample_vertex(rng)?;
        Ok(Event::new(event_id, species, momentum, vertex))
    }

    /// Generate a contiguous range of events, streaming them to a sink
    pub fn generate_batch<R: RandomSource + ?Sized>(
        &self,
        event_ids: Range<usize>,
        rng: &mut R,
        sink: &mut impl Write,
        stats: &mut RunStatistics,
    ) -> Result<()> {
        for event_id in event_ids {
            let event = self.generate(event_id, rng)?;
            codec::write_event(sink, &event)?;
            stats.record(&event);
        }
        Ok(())
    }
}
