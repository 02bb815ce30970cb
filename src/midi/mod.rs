//! Timed MIDI events and AST-to-MIDI lowering.

pub mod event;
pub mod generator;
pub mod gm;

pub use event::{
    ControlChange, MidiNote, MidiSequence, ProgramChange, TempoChange, DEFAULT_TICKS_PER_QUARTER,
};
pub use generator::{generate, GenerateOptions};
