//! Species selection for mixed-particle runs
//!
//! A mixture is an ordered list of (species, integer weight) pairs. We turn
//! it into a table of cumulative thresholds once, then each selection is a
//! binary search of a uniform draw in that table.

use crate::{
    error::{Error, Result},
    numeric::Float,
    species::Species,
};

/// Categorical distribution over an arbitrary number of species
#[derive(Clone, Debug)]
pub struct SpeciesSelector {
    /// Species which can be selected, in configuration order
    species: Vec<Species>,

    /// Integer weights, as configured
    weights: Vec<u32>,

    /// Upper (exclusive) cumulative probability bound of each species
    thresholds: Vec<Float>,

    /// Index of the last species with a nonzero weight
    last_selectable: usize,
}
//
impl SpeciesSelector {
    /// Build a selector from (species, weight) pairs
    ///
    /// With a proton:pion:kaon = 5:3:1 mixture, the thresholds are 5/9, 8/9
    /// and 1. Species with a zero weight are kept but never selected.
    pub fn new(mixture: Vec<(Species, u32)>) -> Result<Self> {
        if mixture.is_empty() {
            return Err(Error::Config("species mixture is empty".into()));
        }
        let total: u64 = mixture.iter().map(|(_, w)| u64::from(*w)).sum();
        if total == 0 {
            return Err(Error::Config(
                "species mixture weights sum up to zero".into(),
            ));
        }

        let mut cumulative = 0;
        let thresholds = mixture
            .iter()
            .map(|(_, w)| {
                cumulative += u64::from(*w);
                cumulative as Float / total as Float
            })
            .collect();
        let last_selectable = mixture.iter().rposition(|(_, w)| *w > 0).unwrap_or(0);
        let (species, weights) = mixture.into_iter().unzip();
        Ok(Self {
            species,
            weights,
            thresholds,
            last_selectable,
        })
    }

    /// Index of the species selected by a uniform draw in [0, 1)
    pub fn select_index(&self, u: Float) -> usize {
        // First species whose threshold lies strictly above u. Values of u at
        // or above 1 would find none, they go to the last selectable species.
        let idx = self.thresholds.partition_point(|&t| t <= u);
        idx.min(self.last_selectable)
    }

    /// Species selected by a uniform draw in [0, 1)
    pub fn select(&self, u: Float) -> &Species {
        &self.species[self.select_index(u)]
    }

    /// Species of the mixture, in configuration order
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Configured weight of each species
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Expected fraction of events of each species
    pub fn probabilities(&self) -> impl Iterator<Item = Float> + '_ {
        let mut previous = 0.;
        self.thresholds.iter().map(move |&t| {
            let p = t - previous;
            previous = t;
            p
        })
    }
}
