//! Command-line front-end of the beam envelope generator
//!
//! `beam_envelope [config]` generates a document as configured in the given
//! file (`beam.cfg` by default). `beam_envelope inspect <document>` reads a
//! document back and reports what downstream analysis would see in it.

use beam_envelope::{codec, logging, output, run_generation, Configuration};

use eyre::{bail, eyre, Result, WrapErr};

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    time::Instant,
};

/// Configuration file used when none is specified
const DEFAULT_CONFIG: &str = "beam.cfg";

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    // Keep the logger alive until the end of the program
    let _logger = logging::init_logging("info").wrap_err("Failed to start logging")?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("inspect") => {
            let path = args
                .next()
                .ok_or_else(|| eyre!("Usage: beam_envelope inspect <document>"))?;
            inspect(&path)
        }
        Some(config_path) => generate(config_path),
        None => generate(DEFAULT_CONFIG),
    }
}

/// Generate a document as configured
fn generate(config_path: &str) -> Result<()> {
    // ### CONFIGURATION READOUT ###

    let cfg = Configuration::load(config_path).wrap_err("Failed to load the configuration")?;

    // ### GENERATION ###

    // NOTE: We start the clock after configuration I/O, to avoid IO-induced
    //       timing fluctuations
    let saved_time = Instant::now();

    // The output file is opened once for the whole run and closed when the
    // writer goes out of scope, whether the run succeeded or not
    let stats = {
        let file = File::create(&cfg.output)
            .wrap_err_with(|| format!("Failed to create {}", cfg.output.display()))?;
        let mut sink = BufWriter::new(file);
        run_generation(&cfg, &mut sink).wrap_err_with(|| {
            format!(
                "Event generation failed, {} is incomplete",
                cfg.output.display()
            )
        })?
    };

    // ### RESULTS DISPLAY ###

    let elapsed_time = saved_time.elapsed();
    output::dump_summary(&cfg, &stats, elapsed_time).wrap_err("Failed to output the summary")?;

    // ...and we're done
    Ok(())
}

/// Read a document back and report its contents
fn inspect(path: &str) -> Result<()> {
    let file = File::open(path).wrap_err_with(|| format!("Failed to open {path}"))?;
    let doc = codec::read_document(BufReader::new(file))
        .wrap_err_with(|| format!("Failed to read {path}"))?;

    println!(" Format version                 : {}", doc.version.as_deref().unwrap_or("?"));
    println!(" Events                         : {}", doc.events);
    println!(" Vertex records                 : {}", doc.vertices.len());
    println!(" Particle records               : {}", doc.momenta.len());
    if let Some(mean) = doc.mean_momentum() {
        println!(" Mean momentum          (GeV/c) : {mean:.4}");
    }
    println!(" Skipped records                : {}", doc.warnings.len());
    for warning in &doc.warnings {
        println!("   {warning}");
    }

    if !doc.complete {
        bail!("{path} lacks its end marker, the generation which produced it did not complete");
    }
    Ok(())
}
