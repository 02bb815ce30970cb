//! Aldakit — a toolkit for the Alda music notation language.
//!
//! The pipeline: source text → [`lang::scan`] → tokens → [`lang::parse`] →
//! AST → [`midi::generate`] → timed event sequence → [`smf::write_smf`] →
//! Standard MIDI File bytes. [`smf::read_smf`] parses SMF bytes back into
//! an event sequence, and [`smf::midi_to_ast`] lifts that to an AST for
//! re-notation.
//!
//! # Example
//!
//! ```
//! use aldakit::{generate, parse, write_smf, GenerateOptions};
//!
//! let ast = parse("piano: c d e", None).unwrap();
//! let sequence = generate(&ast, &GenerateOptions::default()).unwrap();
//! let bytes = write_smf(&sequence, sequence.ticks_per_quarter).unwrap();
//! assert_eq!(&bytes[0..4], b"MThd");
//! ```

pub mod lang;
pub mod midi;
pub mod smf;

pub use lang::{parse, scan, AldaError, ErrorKind, Node, Position, Token, TokenKind};
pub use midi::{generate, GenerateOptions, MidiNote, MidiSequence, TempoChange};
pub use smf::{midi_to_ast, read_smf, write_smf};

/// Parse, generate, and serialize in one step.
pub fn compile(source: &str, filename: Option<&str>) -> Result<Vec<u8>, AldaError> {
    let ast = parse(source, filename)?;
    let opts = GenerateOptions::default();
    let sequence = generate(&ast, &opts).map_err(|e| e.with_context(source, filename))?;
    write_smf(&sequence, sequence.ticks_per_quarter)
}
