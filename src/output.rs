//! This module is in charge of reporting the outcome of a generation run to
//! the standard output

use crate::{config::Configuration, numeric::Float, stats::RunStatistics};

use std::{
    io::{Result, Write},
    time::Duration,
};

/// Print a summary of the run on stdout
pub fn dump_summary(
    cfg: &Configuration,
    stats: &RunStatistics,
    elapsed_time: Duration,
) -> eyre::Result<()> {
    // Compute a timestamp of when the run ended
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)?;

    let stdout = std::io::stdout();
    write_summary(&mut stdout.lock(), cfg, stats, elapsed_time, &timestamp)?;
    Ok(())
}

/// Write the run summary using fixed-size key columns
pub fn write_summary(
    out: &mut impl Write,
    cfg: &Configuration,
    stats: &RunStatistics,
    elapsed_time: Duration,
    timestamp: &str,
) -> Result<()> {
    writeln!(out, " {timestamp}")?;
    writeln!(out, " ---------------------------------------------")?;
    writeln_kv(
        out,
        "Events written",
        format!("{} to {}", stats.events(), cfg.output.display()),
    )?;
    writeln_kv(out, "Seed", cfg.seed)?;

    // Species composition of the run
    let n_ev = stats.events() as Float;
    for (species, count) in stats.species_counts() {
        let fraction = count as Float / n_ev;
        writeln_kv(
            out,
            &format!("Events of {}", species.name),
            format!("{count} ({fraction:.4})"),
        )?;
    }
    writeln!(out, " ---------------------------------------------")?;

    // Shape of the beam envelope
    writeln_kv(
        out,
        "Mean momentum          (GeV/c)",
        format!("{:.4}", stats.mean_momentum()),
    )?;
    writeln_kv(
        out,
        "Momentum std. dev.     (GeV/c)",
        format!("{:.4}", stats.momentum_stddev()),
    )?;
    let (rms_x, rms_y) = stats.vertex_rms();
    writeln_kv(out, "Vertex RMS x              (mm)", format!("{rms_x:.3}"))?;
    writeln_kv(out, "Vertex RMS y              (mm)", format!("{rms_y:.3}"))?;
    writeln!(out, " ---------------------------------------------")?;

    // Program performance stats
    let elapsed_secs = elapsed_time.as_secs_f64();
    writeln_kv(out, "Elapsed time               (s)", format!("{elapsed_secs:.3}"))?;
    writeln_kv(
        out,
        "Elapsed time per event     (s)",
        format!("{:.3e}", elapsed_secs / n_ev),
    )
}

/// Key-value output that uses fixed-size columns for better readability
fn writeln_kv(out: &mut impl Write, key: &str, value: impl std::fmt::Display) -> Result<()> {
    writeln!(out, " {key:<31}: {value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        kinematics::{MomentumVector, VertexPosition},
        event::Event,
    };

    #[test]
    fn summary_layout() {
        let cfg = Configuration::default();
        let species = cfg.species.species();
        let mut stats = RunStatistics::new(species);
        for (id, p) in [5., 7.].into_iter().enumerate() {
            stats.record(&Event::new(
                id,
                &species[0],
                MomentumVector::from_spherical(p, 0., 0.),
                VertexPosition::planar(0., 0.),
            ));
        }

        let mut out = Vec::new();
        write_summary(&mut out, &cfg, &stats, Duration::from_millis(20), "2024-01-01T00:00:00Z")
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], " 2024-01-01T00:00:00Z");
        assert_eq!(
            lines[2],
            " Events written                 : 2 to flat_particle_ascii.hepmc"
        );
        assert!(text.contains(" Events of proton               : 2 (1.0000)\n"));
        assert!(text.contains(" Mean momentum          (GeV/c) : 6.0000\n"));
        assert!(text.contains(" Elapsed time               (s) : 0.020\n"));
    }
}
