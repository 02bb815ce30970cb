//! Timed MIDI event model — the output of generation and the input to
//! the SMF writer.
//!
//! Times are absolute seconds from the start of the score. Notes are kept
//! paired (start + duration); the writer expands them into NoteOn/NoteOff
//! and the reader pairs them back up.

use serde::{Deserialize, Serialize};

/// Default SMF resolution in ticks per quarter note.
pub const DEFAULT_TICKS_PER_QUARTER: u16 = 480;

/// Microseconds per quarter note at 120 BPM.
pub const DEFAULT_US_PER_QUARTER: u32 = 500_000;

/// A sounding note: NoteOn at `start`, NoteOff at `start + duration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MidiNote {
    pub pitch: u8,
    pub velocity: u8,
    pub start: f64,
    pub duration: f64,
    pub channel: u8,
}

impl MidiNote {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A program (instrument) change on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgramChange {
    pub time: f64,
    pub channel: u8,
    pub program: u8,
}

/// A controller change on a channel (CC10 = pan).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlChange {
    pub time: f64,
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

/// A tempo change, stored as microseconds per quarter note (the SMF form).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    pub time: f64,
    pub us_per_quarter: u32,
}

impl TempoChange {
    pub fn from_bpm(time: f64, bpm: f64) -> Self {
        Self {
            time,
            us_per_quarter: (60_000_000.0 / bpm).round() as u32,
        }
    }

    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.us_per_quarter as f64
    }
}

/// A complete timed event sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiSequence {
    pub notes: Vec<MidiNote>,
    pub program_changes: Vec<ProgramChange>,
    pub control_changes: Vec<ControlChange>,
    pub tempo_changes: Vec<TempoChange>,
    pub ticks_per_quarter: u16,
}

impl MidiSequence {
    pub fn new(ticks_per_quarter: u16) -> Self {
        Self {
            notes: Vec::new(),
            program_changes: Vec::new(),
            control_changes: Vec::new(),
            tempo_changes: Vec::new(),
            ticks_per_quarter,
        }
    }

    /// End time of the last sounding note, in seconds.
    pub fn duration(&self) -> f64 {
        self.notes.iter().map(MidiNote::end).fold(0.0, f64::max)
    }

    /// Sort every event list by time (notes also by pitch for determinism).
    pub fn sort(&mut self) {
        self.notes.sort_by(|a, b| {
            a.start
                .total_cmp(&b.start)
                .then(a.channel.cmp(&b.channel))
                .then(a.pitch.cmp(&b.pitch))
        });
        self.program_changes.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.control_changes.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.tempo_changes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Channels that carry any event, ascending.
    pub fn channels(&self) -> Vec<u8> {
        let mut channels: Vec<u8> = self
            .notes
            .iter()
            .map(|n| n.channel)
            .chain(self.program_changes.iter().map(|p| p.channel))
            .chain(self.control_changes.iter().map(|c| c.channel))
            .collect();
        channels.sort_unstable();
        channels.dedup();
        channels
    }
}

impl Default for MidiSequence {
    fn default() -> Self {
        Self::new(DEFAULT_TICKS_PER_QUARTER)
    }
}
