//! End-to-end checks of generated documents

use beam_envelope::{
    codec::{self, Record},
    config::parse_species_mode,
    kinematics::KinematicsConfig,
    run_generation,
    species::SpeciesCatalog,
    Configuration, Error,
};

use approx::assert_relative_eq;

use std::io::{self, BufReader, Write};

fn generate(cfg: &Configuration) -> String {
    let mut sink = Vec::new();
    run_generation(cfg, &mut sink).unwrap();
    String::from_utf8(sink).unwrap()
}

fn config(num_events: usize, seed: u64) -> Configuration {
    Configuration {
        num_events,
        seed,
        ..Configuration::default()
    }
}

fn records(text: &str) -> Vec<Record> {
    text.lines()
        .map(|line| codec::decode_line(line).unwrap().unwrap())
        .collect()
}

#[test]
fn three_proton_events() {
    let text = generate(&config(3, 42));
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2 + 3 * 5 + 1);
    assert_eq!(lines[0], "HepMC::Version 3.02.02");
    assert_eq!(lines[1], "HepMC::Asciiv3-START_EVENT_LISTING");
    assert_eq!(lines[17], "HepMC::Asciiv3-END_EVENT_LISTING");

    for (event_id, event) in lines[2..17].chunks(5).enumerate() {
        assert_eq!(event[0], format!("E {event_id} 1 2"));
        assert_eq!(event[1], "U GEV MM");
        assert!(event[2].starts_with("P 1 0 2212 "));
        assert!(event[3].starts_with("V -1 0 [1] "));
        assert!(event[4].starts_with("P 2 -1 2212 "));
        for line in &event[2..] {
            for field in line.split(' ').skip(3).filter(|f| !f.starts_with('[')) {
                assert!(field.parse::<f64>().is_ok(), "{field} in {line}");
            }
        }
    }
    assert_eq!(text.matches("\nU ").count(), 3);
}

#[test]
fn same_seed_same_bytes() {
    let cfg = config(2_000, 7);
    assert_eq!(generate(&cfg), generate(&cfg));
    assert_ne!(generate(&cfg), generate(&config(2_000, 8)));
}

#[test]
fn event_ids_are_sequential_across_batches() {
    let text = generate(&config(25_001, 3));
    let ids = records(&text)
        .into_iter()
        .filter_map(|record| match record {
            Record::Event { event_id, .. } => Some(event_id),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(ids, (0..25_001).collect::<Vec<_>>());
}

#[test]
fn records_respect_the_envelope() {
    let text = generate(&config(10_000, 11));
    let mut particles = 0;
    let mut vertices = 0;
    for record in records(&text) {
        match record {
            Record::Particle(particle) => {
                particles += 1;
                // Allow for the 6 decimals of the text format
                let p = particle.momentum_magnitude();
                assert!((3. - 1e-5..=10. + 1e-5).contains(&p), "{p}");
                let p2 = particle.momentum.iter().map(|x| x * x).sum::<f64>();
                assert_relative_eq!(
                    particle.energy.powi(2),
                    p2 + particle.mass.powi(2),
                    epsilon = 1e-4
                );
            }
            Record::Vertex(vertex) => {
                vertices += 1;
                assert!(vertex.position[0].abs() <= 150.);
                assert!(vertex.position[1].abs() <= 150.);
                assert_eq!(vertex.position[2], 0.);
            }
            _ => {}
        }
    }
    assert_eq!((particles, vertices), (20_000, 10_000));
}

#[test]
fn mixture_converges_to_its_ratio() {
    let catalog = SpeciesCatalog::standard();
    let cfg = Configuration {
        species: parse_species_mode("mixed", "proton:5,pion:3,kaon:1", &catalog).unwrap(),
        ..config(90_000, 5)
    };
    let mut sink = io::sink();
    let stats = run_generation(&cfg, &mut sink).unwrap();
    let counts = stats
        .species_counts()
        .map(|(species, count)| (species.name.clone(), count))
        .collect::<Vec<_>>();
    assert_eq!(stats.events(), 90_000);
    assert_eq!(counts.iter().map(|(_, c)| c).sum::<usize>(), 90_000);
    assert_eq!(counts[0].0, "proton");
    assert!((49_000..=51_000).contains(&counts[0].1), "{counts:?}");
    assert!((29_000..=31_000).contains(&counts[1].1), "{counts:?}");
    assert!((9_500..=10_500).contains(&counts[2].1), "{counts:?}");
}

#[test]
fn truncated_vertex_costs_one_record() {
    let text = generate(&config(100, 1));
    let damaged = text
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            // Cut the vertex record of the 10th event short
            if idx == 2 + 9 * 5 + 3 {
                assert!(line.starts_with("V "));
                line.split(' ').take(5).collect::<Vec<_>>().join(" ")
            } else {
                line.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(damaged.as_bytes()).unwrap();
    file.flush().unwrap();
    let reader = BufReader::new(file.reopen().unwrap());
    let doc = codec::read_document(reader).unwrap();

    assert!(doc.complete);
    assert_eq!(doc.events, 100);
    assert_eq!(doc.vertices.len(), 99);
    assert_eq!(doc.momenta.len(), 200);
    assert_eq!(doc.warnings.len(), 1);
    assert_eq!(doc.warnings[0].line, 2 + 9 * 5 + 3 + 1);
}

#[test]
fn invalid_configuration_generates_nothing() {
    let cfg = Configuration {
        kinematics: KinematicsConfig {
            min_mom: 10.,
            max_mom: 3.,
            ..KinematicsConfig::default()
        },
        ..config(10, 1)
    };
    let mut sink = Vec::new();
    assert!(matches!(run_generation(&cfg, &mut sink), Err(Error::Config(_))));
    assert!(sink.is_empty());

    let mut sink = Vec::new();
    assert!(matches!(
        run_generation(&config(0, 1), &mut sink),
        Err(Error::Config(_))
    ));
    assert!(sink.is_empty());
}

#[test]
fn unreachable_window_stalls() {
    // Consistent bounds, but 100 sigmas away from the mean
    let cfg = Configuration {
        kinematics: KinematicsConfig {
            min_mom: 106.5,
            max_mom: 107.,
            ..KinematicsConfig::default()
        },
        ..config(10, 1)
    };
    let mut sink = Vec::new();
    assert!(matches!(
        run_generation(&cfg, &mut sink),
        Err(Error::SamplingStall {
            what: "momentum",
            ..
        })
    ));
    let text = String::from_utf8(sink).unwrap();
    assert!(!text.contains(codec::LISTING_END));
}

/// Sink which fails once a given number of bytes has been written
struct FailingSink {
    remaining: usize,
    written: Vec<u8>,
}
//
impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "device full"));
        }
        let len = buf.len().min(self.remaining);
        self.remaining -= len;
        self.written.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_failure_aborts_the_run() {
    let mut sink = FailingSink {
        remaining: 1_000,
        written: Vec::new(),
    };
    assert!(matches!(
        run_generation(&config(100, 1), &mut sink),
        Err(Error::Sink(_))
    ));
    let doc = codec::read_document(sink.written.as_slice()).unwrap();
    assert!(!doc.complete);
    assert!(doc.events < 100);
}
