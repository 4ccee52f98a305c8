//! Text encoding and decoding of event documents
//!
//! Documents follow the HepMC3 ASCII layout. Each event is a single particle
//! entering and leaving one production vertex:
//!
//! ```text
//! HepMC::Version 3.02.02
//! HepMC::Asciiv3-START_EVENT_LISTING
//! E <event_id> 1 2
//! U GEV MM
//! P 1 0 <pdg_id> <px> <py> <pz> <E> <m> 1
//! V -1 0 [1] <x> <y> <z> 0.0
//! P 2 -1 <pdg_id> <px> <py> <pz> <E> <m> 1
//! ...
//! HepMC::Asciiv3-END_EVENT_LISTING
//! ```
//!
//! Momenta, energies and masses carry 6 decimals, positions 3. Rust's float
//! formatting does not depend on the locale, so the decimal separator is
//! always a dot.

use crate::{event::Event, numeric::Float};

use std::{
    fmt,
    io::{self, BufRead, Write},
    str::{FromStr, SplitWhitespace},
};

use prefix_num_ops::real::*;
use thiserror::Error;

/// First line of every document
pub const VERSION_LINE: &str = "HepMC::Version 3.02.02";

/// Line which opens the event listing
pub const LISTING_START: &str = "HepMC::Asciiv3-START_EVENT_LISTING";

/// Line which closes the event listing
pub const LISTING_END: &str = "HepMC::Asciiv3-END_EVENT_LISTING";

/// Token introducing the version line
const VERSION_MARKER: &str = "HepMC::Version";

/// Unit in which momenta and energies are expressed
pub const MOMENTUM_UNIT: &str = "GEV";

/// Unit in which positions are expressed
pub const LENGTH_UNIT: &str = "MM";

/// Number of vertex records per event
pub const VERTICES_PER_EVENT: usize = 1;

/// Number of particle records per event
pub const PARTICLES_PER_EVENT: usize = 2;

// ### ENCODING ###

/// Write the document header, must precede the first event
pub fn write_header(sink: &mut impl Write) -> io::Result<()> {
    writeln!(sink, "{VERSION_LINE}")?;
    writeln!(sink, "{LISTING_START}")
}

/// Write the records of one event
pub fn write_event(sink: &mut impl Write, event: &Event) -> io::Result<()> {
    let v = event.vertex();
    writeln!(
        sink,
        "E {} {VERTICES_PER_EVENT} {PARTICLES_PER_EVENT}",
        event.event_id()
    )?;
    writeln!(sink, "U {MOMENTUM_UNIT} {LENGTH_UNIT}")?;

    // Incoming particle, then its vertex, then the outgoing particle. Both
    // particles point at the vertex as their production vertex.
    write_particle(sink, event, 1, 0)?;
    writeln!(
        sink,
        "V -1 0 [1] {:.3} {:.3} {:.3} 0.0",
        v.vx(),
        v.vy(),
        v.vz()
    )?;
    write_particle(sink, event, 2, -1)
}

/// Write one of the particle records of an event
fn write_particle(sink: &mut impl Write, event: &Event, barcode: i64, status: i32) -> io::Result<()> {
    let p = event.momentum();
    writeln!(
        sink,
        "P {barcode} {status} {} {:.6} {:.6} {:.6} {:.6} {:.6} 1",
        event.species().particle_id,
        p.px(),
        p.py(),
        p.pz(),
        event.energy(),
        event.species().mass,
    )
}

/// Write the document footer, must follow the last event
pub fn write_footer(sink: &mut impl Write) -> io::Result<()> {
    writeln!(sink, "{LISTING_END}")
}

// ### DECODING ###

/// Decoded particle record
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleRecord {
    /// Barcode of the particle within its event
    pub barcode: i64,

    /// Status flag
    pub status: i32,

    /// Particle Data Group identifier
    pub particle_id: i64,

    /// Momentum components (px, py, pz)
    pub momentum: [Float; 3],

    /// Energy
    pub energy: Float,

    /// Rest mass
    pub mass: Float,

    /// Barcode of the production vertex
    pub production_vertex: i64,
}
//
impl ParticleRecord {
    /// Magnitude of the momentum
    pub fn momentum_magnitude(&self) -> Float {
        sqrt(self.momentum.iter().map(|p| p.powi(2)).sum::<Float>())
    }
}

/// Decoded vertex record
#[derive(Clone, Debug, PartialEq)]
pub struct VertexRecord {
    /// Barcode of the vertex within its event
    pub barcode: i64,

    /// Status flag
    pub status: i32,

    /// Barcodes of the incoming particles
    pub incoming: Vec<i64>,

    /// Position (x, y, z)
    pub position: [Float; 3],

    /// Time coordinate
    pub time: Float,
}

/// One line of a document, classified by its first token
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// Format version line
    Version(String),

    /// Start of the event listing
    ListingStart,

    /// End of the event listing
    ListingEnd,

    /// Event header
    Event {
        /// Sequential event identifier
        event_id: usize,
        /// Number of vertex records in the event
        n_vertices: usize,
        /// Number of particle records in the event
        n_particles: usize,
    },

    /// Units of the event's records
    Units {
        /// Momentum unit token
        momentum: String,
        /// Length unit token
        length: String,
    },

    /// Particle record
    Particle(ParticleRecord),

    /// Vertex record
    Vertex(VertexRecord),
}

/// Reasons why a line cannot be decoded
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecordError {
    /// The first token is not a known record marker
    #[error("unknown record marker \"{0}\"")]
    UnknownMarker(String),

    /// The line ends before a mandatory field
    #[error("missing field {0}")]
    MissingField(&'static str),

    /// A field does not hold a valid number
    #[error("cannot parse field {name} from \"{value}\"")]
    BadNumber {
        /// Field which was being decoded
        name: &'static str,
        /// Offending token
        value: String,
    },

    /// The line is not valid UTF-8 text
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// A line which was skipped while reading a document
#[derive(Clone, Debug, PartialEq)]
pub struct ParseWarning {
    /// Line number, starting at 1
    pub line: usize,

    /// What was wrong with the line
    pub error: RecordError,
}
//
impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

/// Cursor over the whitespace-separated fields of a record
struct Fields<'line>(SplitWhitespace<'line>);
//
impl<'line> Fields<'line> {
    /// Fetch the next raw token
    fn token(&mut self, name: &'static str) -> Result<&'line str, RecordError> {
        self.0.next().ok_or(RecordError::MissingField(name))
    }

    /// Fetch and parse the next token
    fn parse<T: FromStr>(&mut self, name: &'static str) -> Result<T, RecordError> {
        let token = self.token(name)?;
        token.parse::<T>().map_err(|_| RecordError::BadNumber {
            name,
            value: token.to_owned(),
        })
    }

    /// Fetch three consecutive floating-point numbers
    fn parse3(&mut self, names: [&'static str; 3]) -> Result<[Float; 3], RecordError> {
        Ok([
            self.parse(names[0])?,
            self.parse(names[1])?,
            self.parse(names[2])?,
        ])
    }
}

/// Decode one line of a document
///
/// Blank lines decode to `None`. Trailing fields beyond the ones we know
/// about are ignored, which keeps richer HepMC3 files readable.
pub fn decode_line(line: &str) -> Result<Option<Record>, RecordError> {
    let mut tokens = line.split_whitespace();
    let Some(marker) = tokens.next() else {
        return Ok(None);
    };
    let mut fields = Fields(tokens);
    let record = match marker {
        VERSION_MARKER => Record::Version(fields.token("version")?.to_owned()),
        LISTING_START => Record::ListingStart,
        LISTING_END => Record::ListingEnd,
        "E" => Record::Event {
            event_id: fields.parse("event_id")?,
            n_vertices: fields.parse("n_vertices")?,
            n_particles: fields.parse("n_particles")?,
        },
        "U" => Record::Units {
            momentum: fields.token("momentum_unit")?.to_owned(),
            length: fields.token("length_unit")?.to_owned(),
        },
        "P" => Record::Particle(ParticleRecord {
            barcode: fields.parse("barcode")?,
            status: fields.parse("status")?,
            particle_id: fields.parse("particle_id")?,
            momentum: fields.parse3(["px", "py", "pz"])?,
            energy: fields.parse("energy")?,
            mass: fields.parse("mass")?,
            production_vertex: fields.parse("production_vertex")?,
        }),
        "V" => {
            let barcode = fields.parse("barcode")?;
            let status = fields.parse("status")?;
            // The incoming particle list is optional
            let mut next = fields.token("x")?;
            let mut incoming = Vec::new();
            if let Some(list) = next.strip_prefix('[') {
                let list = list.strip_suffix(']').ok_or(RecordError::BadNumber {
                    name: "incoming",
                    value: next.to_owned(),
                })?;
                for barcode in list.split(',').filter(|b| !b.is_empty()) {
                    incoming.push(barcode.parse().map_err(|_| RecordError::BadNumber {
                        name: "incoming",
                        value: barcode.to_owned(),
                    })?);
                }
                next = fields.token("x")?;
            }
            let x = next.parse().map_err(|_| RecordError::BadNumber {
                name: "x",
                value: next.to_owned(),
            })?;
            Record::Vertex(VertexRecord {
                barcode,
                status,
                incoming,
                position: [x, fields.parse("y")?, fields.parse("z")?],
                time: fields.parse("t")?,
            })
        }
        other => return Err(RecordError::UnknownMarker(other.to_owned())),
    };
    Ok(Some(record))
}

/// Fields which downstream analysis extracts from a document
#[derive(Clone, Debug, Default)]
pub struct DecodedDocument {
    /// Format version announced by the document, if any
    pub version: Option<String>,

    /// Whether the listing end marker was found. Documents whose generation
    /// was aborted lack it and must not be trusted as complete.
    pub complete: bool,

    /// Number of event headers
    pub events: usize,

    /// Transverse (x, y) position of each vertex record
    pub vertices: Vec<(Float, Float)>,

    /// Momentum magnitude of each particle record
    pub momenta: Vec<Float>,

    /// Lines which were skipped
    pub warnings: Vec<ParseWarning>,
}
//
impl DecodedDocument {
    /// Mean momentum magnitude over all particle records
    pub fn mean_momentum(&self) -> Option<Float> {
        if self.momenta.is_empty() {
            None
        } else {
            Some(self.momenta.iter().sum::<Float>() / self.momenta.len() as Float)
        }
    }
}

/// Read a whole document, skipping malformed lines
///
/// A corrupt record costs that record only. I/O failures of the reader are
/// still fatal.
pub fn read_document(mut reader: impl BufRead) -> io::Result<DecodedDocument> {
    let mut doc = DecodedDocument::default();
    let mut buffer = Vec::new();
    let mut line_number = 0;
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        line_number += 1;
        let decoded = std::str::from_utf8(&buffer)
            .map_err(|_| RecordError::InvalidUtf8)
            .and_then(decode_line);
        match decoded {
            Ok(None) => {}
            Ok(Some(record)) => match record {
                Record::Version(version) => doc.version = Some(version),
                Record::ListingStart => {}
                Record::ListingEnd => doc.complete = true,
                Record::Event { .. } => doc.events += 1,
                Record::Units { .. } => {}
                Record::Particle(particle) => doc.momenta.push(particle.momentum_magnitude()),
                Record::Vertex(vertex) => doc.vertices.push((vertex.position[0], vertex.position[1])),
            },
            Err(error) => {
                let warning = ParseWarning {
                    line: line_number,
                    error,
                };
                log::warn!("Skipping malformed record at {warning}");
                doc.warnings.push(warning);
            }
        }
    }
    Ok(doc)
}
