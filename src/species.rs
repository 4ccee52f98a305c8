//! Catalog of the particle species which the generator knows about

use crate::{
    error::{Error, Result},
    numeric::Float,
};

/// Identity of a particle species
#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    /// Human-readable name
    pub name: String,

    /// Particle Data Group Monte Carlo identifier
    pub particle_id: i64,

    /// Rest mass (GeV/c²)
    pub mass: Float,
}
//
impl Species {
    /// Build a species description
    pub fn new(name: impl Into<String>, particle_id: i64, mass: Float) -> Self {
        Self {
            name: name.into(),
            particle_id,
            mass,
        }
    }

    /// Proton, the species of single-species runs unless told otherwise
    pub fn proton() -> Self {
        Self::new("proton", 2212, 0.93827208816)
    }
}

/// Read-only registry of species, indexed by a lookup key
///
/// The catalog is assembled once at configuration time. There is no way to
/// alter an entry afterwards, extending the catalog means building a new one.
#[derive(Clone, Debug)]
pub struct SpeciesCatalog {
    entries: Vec<(String, Species)>,
}
//
impl SpeciesCatalog {
    /// Catalog of the hadrons and light nuclei found in the beam line
    pub fn standard() -> Self {
        Self { entries: Vec::new() }
            .with_entry("pion", Species::new("pion", 211, 0.13957039))
            .with_entry("kaon", Species::new("kaon", 321, 0.493677))
            .with_entry("proton", Species::proton())
            .with_entry(
                "deuteron",
                Species::new("deuteron", 1_000_010_020, 1.87561294257),
            )
            .with_entry("alpha", Species::new("alpha", 1_000_020_040, 3.7273794066))
    }

    /// Add (or replace) an entry, consuming the catalog being built
    pub fn with_entry(mut self, key: &str, species: Species) -> Self {
        let key = key.to_lowercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = species,
            None => self.entries.push((key, species)),
        }
        self
    }

    /// Look up a species by key (case-insensitive)
    pub fn lookup(&self, key: &str) -> Result<&Species> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, species)| species)
            .ok_or(Error::UnknownSpecies(key))
    }

    /// Iterate over the catalog's keys, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Default for SpeciesCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
