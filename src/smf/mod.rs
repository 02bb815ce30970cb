//! Standard MIDI File framing — writer, reader, tempo timeline, import.

pub mod import;
pub mod reader;
pub mod tempo;
pub mod vlq;
pub mod writer;

pub use import::midi_to_ast;
pub use reader::read_smf;
pub use tempo::TempoMap;
pub use writer::write_smf;
