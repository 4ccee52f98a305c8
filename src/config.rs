//! Mechanism for loading and sharing the generator configuration

use crate::{
    error::{Error, Result as GenResult},
    evgen::SpeciesMode,
    kinematics::KinematicsConfig,
    numeric::Float,
    selector::SpeciesSelector,
    species::{Species, SpeciesCatalog},
};

use eyre::{eyre, Result, WrapErr};

use std::{fs, path::PathBuf, str::FromStr};

/// Keyword selecting mixed-species generation
pub const MIXED_KEYWORD: &str = "mixed";

/// Keyword requesting a seed drawn from system entropy
pub const AUTO_SEED_KEYWORD: &str = "auto";

/// Generator configuration
#[derive(Clone, Debug)]
pub struct Configuration {
    /// Number of events to be generated
    pub num_events: usize,

    /// Species selection policy
    pub species: SpeciesMode,

    /// Beam envelope
    pub kinematics: KinematicsConfig,

    /// Seed of the random number generator
    pub seed: u64,

    /// Path of the output document
    pub output: PathBuf,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: &str) -> Result<Self> {
        // Read out the configuration file or die trying
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Could not read configuration file {file_name}"))?;

        let config = Self::parse(&config_str, &SpeciesCatalog::standard())?;

        // Display it so that the run log records what was simulated
        config.print();

        Ok(config)
    }

    /// Parse and validate configuration file contents
    pub fn parse(config_str: &str, catalog: &SpeciesCatalog) -> Result<Self> {
        // We will iterate over the configuration items. These are the first
        // non-whitespace chunk of text on each line, the rest of the line is a
        // free-form comment. Blank lines are ignored.
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill to
        // ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        // Decode the configuration items into concrete values
        let num_events = next_item("num_events")?.parse::<usize>()?;
        let species = next_item("species")?.data;
        let mixture = next_item("mixture")?.data;
        let kinematics = KinematicsConfig {
            min_mom: next_item("min_mom")?.parse::<Float>()?,
            max_mom: next_item("max_mom")?.parse::<Float>()?,
            mom_mean: next_item("mom_mean")?.parse::<Float>()?,
            mom_sigma: next_item("mom_sigma")?.parse::<Float>()?,
            theta_max: next_item("theta_max")?.parse::<Float>()?,
            half_side: next_item("square_side")?.parse::<Float>()? / 2.,
            vertex_sigma: next_item("vertex_sigma")?.parse::<Float>()?,
        };
        let seed = next_item("seed")?.parse_seed()?;
        let output = PathBuf::from(next_item("output")?.data);

        let config = Configuration {
            num_events,
            species: parse_species_mode(species, mixture, catalog)?,
            kinematics,
            seed,
            output,
        };

        // If nothing bad occured, we can now return the configuration
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration's consistency before anything is generated
    pub fn validate(&self) -> GenResult<()> {
        // A sensible run must generate at least one event
        if self.num_events == 0 {
            return Err(Error::Config("please generate at least one event".into()));
        }
        self.kinematics.validate()
    }

    /// Display the configuration
    pub fn print(&self) {
        let cfg = &self.kinematics;
        println!("NUM_EVENTS     : {}", self.num_events);
        match &self.species {
            SpeciesMode::Fixed(species) => println!("SPECIES        : {}", species.name),
            SpeciesMode::Mixed(selector) => {
                let mixture = selector
                    .species()
                    .iter()
                    .zip(selector.weights())
                    .map(|(species, weight)| format!("{}:{}", species.name, weight))
                    .collect::<Vec<_>>();
                println!("SPECIES        : {} ({})", MIXED_KEYWORD, mixture.join(","));
            }
        }
        println!("MIN_MOM        : {}", cfg.min_mom);
        println!("MAX_MOM        : {}", cfg.max_mom);
        println!("MOM_MEAN       : {}", cfg.mom_mean);
        println!("MOM_SIGMA      : {}", cfg.mom_sigma);
        println!("THETA_MAX      : {}", cfg.theta_max);
        println!("SQUARE_SIDE    : {}", 2. * cfg.half_side);
        println!("VERTEX_SIGMA   : {}", cfg.vertex_sigma);
        println!("SEED           : {}", self.seed);
        println!("OUTPUT         : {}", self.output.display());
    }
}

impl Default for Configuration {
    /// Proton beam with the envelope of the reference beam line
    fn default() -> Self {
        Self {
            num_events: 10_000,
            species: SpeciesMode::Fixed(Species::proton()),
            kinematics: KinematicsConfig::default(),
            seed: 0,
            output: PathBuf::from("flat_particle_ascii.hepmc"),
        }
    }
}

/// Resolve the species configuration against the catalog
///
/// `species` is either a catalog key or the mixed keyword, in which case
/// `mixture` lists comma-separated `key:weight` pairs.
pub fn parse_species_mode(
    species: &str,
    mixture: &str,
    catalog: &SpeciesCatalog,
) -> GenResult<SpeciesMode> {
    if !species.eq_ignore_ascii_case(MIXED_KEYWORD) {
        return Ok(SpeciesMode::Fixed(catalog.lookup(species)?.clone()));
    }
    let entries = mixture
        .split(',')
        .map(|entry| {
            let (key, weight) = entry.split_once(':').ok_or_else(|| {
                Error::Config(format!("mixture entry \"{entry}\" is not of the form key:weight"))
            })?;
            let weight = weight.parse::<u32>().map_err(|_| {
                Error::Config(format!("mixture weight \"{weight}\" is not a non-negative integer"))
            })?;
            Ok((catalog.lookup(key)?.clone(), weight))
        })
        .collect::<GenResult<Vec<_>>>()?;
    Ok(SpeciesMode::Mixed(SpeciesSelector::new(entries)?))
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse a seed, which may be a fixed integer or a request for entropy
    fn parse_seed(self) -> Result<u64> {
        if self.data.eq_ignore_ascii_case(AUTO_SEED_KEYWORD) {
            // Picking the seed here rather than letting the generator seed
            // itself means that it gets printed, and the run can be replayed
            let seed = rand::random::<u64>();
            log::info!("Drew random seed {seed}");
            Ok(seed)
        } else {
            self.parse::<u64>()
        }
    }
}
