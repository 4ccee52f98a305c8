//! This module accumulates statistics of the generated events, which are
//! reported at the end of a run
//!
//! Statistics are gathered per batch of events and merged in batch order, so
//! that sequential and multi-threaded runs end up with bit-identical sums.

use crate::{event::Event, numeric::Float, species::Species};

use prefix_num_ops::real::*;

/// Accumulated properties of the events generated so far
#[derive(Clone, Debug)]
pub struct RunStatistics {
    /// Species which may appear in the run
    species: Vec<Species>,

    /// Number of generated events of each species
    species_counts: Vec<usize>,

    /// Total number of generated events
    events: usize,

    /// Sum of momentum magnitudes
    sum_p: Float,

    /// Sum of squared momentum magnitudes
    sum_p2: Float,

    /// Sum of squared vertex coordinates (x, y)
    sum_v2: (Float, Float),
}
//
impl RunStatistics {
    /// Prepare for accumulating events of the given species
    ///
    /// These species are reported in the given order, even when no event of
    /// theirs is generated. Other species are appended as they show up.
    pub fn new(species: &[Species]) -> Self {
        Self {
            species: species.to_vec(),
            species_counts: vec![0; species.len()],
            events: 0,
            sum_p: 0.,
            sum_p2: 0.,
            sum_v2: (0., 0.),
        }
    }

    /// Account for one generated event
    pub fn record(&mut self, event: &Event) {
        self.events += 1;
        *self.species_count_mut(event.species()) += 1;
        let p = event.momentum().magnitude();
        self.sum_p += p;
        self.sum_p2 += p.powi(2);
        let v = event.vertex();
        self.sum_v2.0 += v.vx().powi(2);
        self.sum_v2.1 += v.vy().powi(2);
    }

    /// Integrate statistics from a later batch of events
    pub fn merge(&mut self, other: Self) {
        for (species, count) in other.species.iter().zip(other.species_counts) {
            *self.species_count_mut(species) += count;
        }
        self.events += other.events;
        self.sum_p += other.sum_p;
        self.sum_p2 += other.sum_p2;
        self.sum_v2.0 += other.sum_v2.0;
        self.sum_v2.1 += other.sum_v2.1;
    }

    /// Event counter of a species, created on first use
    fn species_count_mut(&mut self, species: &Species) -> &mut usize {
        let idx = match self.species.iter().position(|s| s == species) {
            Some(idx) => idx,
            None => {
                self.species.push(species.clone());
                self.species_counts.push(0);
                self.species.len() - 1
            }
        };
        &mut self.species_counts[idx]
    }

    /// Number of generated events
    pub fn events(&self) -> usize {
        self.events
    }

    /// Number of generated events of each species
    pub fn species_counts(&self) -> impl Iterator<Item = (&Species, usize)> {
        self.species.iter().zip(self.species_counts.iter().copied())
    }

    /// Mean momentum magnitude
    pub fn mean_momentum(&self) -> Float {
        self.sum_p / self.events as Float
    }

    /// Standard deviation of the momentum magnitude
    pub fn momentum_stddev(&self) -> Float {
        let n = self.events as Float;
        let variance = (self.sum_p2 - self.sum_p.powi(2) / n) / (n - 1.);
        sqrt(variance.max(0.))
    }

    /// Root mean square of the vertex coordinates (x, y)
    pub fn vertex_rms(&self) -> (Float, Float) {
        let n = self.events as Float;
        (sqrt(self.sum_v2.0 / n), sqrt(self.sum_v2.1 / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        kinematics::{MomentumVector, VertexPosition},
        species::SpeciesCatalog,
    };
    use approx::assert_relative_eq;

    #[test]
    fn record_and_merge() {
        let catalog = SpeciesCatalog::standard();
        let species = vec![
            catalog.lookup("proton").unwrap().clone(),
            catalog.lookup("pion").unwrap().clone(),
        ];
        let event = |id, sp, p| {
            Event::new(
                id,
                sp,
                MomentumVector::from_spherical(p, 0., 0.),
                VertexPosition::planar(3., -4.),
            )
        };

        let mut first = RunStatistics::new(&species);
        first.record(&event(0, &species[0], 4.));
        first.record(&event(1, &species[1], 6.));
        let mut second = RunStatistics::new(&species);
        second.record(&event(2, &species[0], 8.));
        first.merge(second);

        assert_eq!(first.events(), 3);
        let counts = first.species_counts().map(|(s, c)| (s.name.as_str(), c)).collect::<Vec<_>>();
        assert_eq!(counts, vec![("proton", 2), ("pion", 1)]);
        assert_relative_eq!(first.mean_momentum(), 6.);
        assert_relative_eq!(first.momentum_stddev(), 2.);
        assert_eq!(first.vertex_rms(), (3., 4.));
    }

    #[test]
    fn unlisted_species_get_their_own_counter() {
        let catalog = SpeciesCatalog::standard();
        let proton = catalog.lookup("proton").unwrap();
        let alpha = catalog.lookup("alpha").unwrap();
        let event = |id, sp| {
            Event::new(
                id,
                sp,
                MomentumVector::from_spherical(5., 0., 0.),
                VertexPosition::planar(0., 0.),
            )
        };

        let mut first = RunStatistics::new(std::slice::from_ref(proton));
        first.record(&event(0, alpha));
        let mut second = RunStatistics::new(&[]);
        second.record(&event(1, proton));
        second.record(&event(2, alpha));
        first.merge(second);

        let counts = first.species_counts().map(|(s, c)| (s.name.as_str(), c)).collect::<Vec<_>>();
        assert_eq!(counts, vec![("proton", 1), ("alpha", 2)]);
        assert_eq!(first.events(), 3);
    }
}
