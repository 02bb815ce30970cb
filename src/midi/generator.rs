//! MIDI generation — lowers an Alda AST into a timed event sequence.
//!
//! A single pass over the tree drives a per-part state machine: each part
//! tracks its own octave, tempo, volume, quantization, default note length,
//! and time cursor. Markers and variables are global. Times are absolute
//! seconds so the SMF writer can place every part on one tempo timeline.

use std::collections::HashMap;

use crate::lang::ast::{Node, Position};
use crate::lang::error::AldaError;

use super::event::{
    ControlChange, MidiNote, MidiSequence, ProgramChange, TempoChange, DEFAULT_TICKS_PER_QUARTER,
};
use super::gm;

const DEFAULT_PART: &str = "default";
const DEFAULT_VOLUME: u8 = 80;
const DEFAULT_QUANT: f64 = 0.9;
const PERCUSSION_CHANNEL: u8 = 9;

/// NoteOff must land strictly after NoteOn even at quant 0.
const MIN_GATE: f64 = 1e-4;

/// Initial-state knobs for generation.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub bpm: f64,
    pub ticks_per_quarter: u16,
    pub default_denominator: u32,
    pub default_octave: i32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            ticks_per_quarter: DEFAULT_TICKS_PER_QUARTER,
            default_denominator: 4,
            default_octave: 4,
        }
    }
}

/// State for a single part.
#[derive(Debug, Clone)]
struct PartState {
    octave: i32,
    tempo: f64,
    volume: u8,
    quant: f64,
    channel: u8,
    program: u8,
    time: f64,
    /// Default note length in beats (quarter = 1).
    default_beats: f64,
    /// Per-letter semitone offsets from the key signature.
    key_signature: HashMap<char, i32>,
    transpose: i32,
    /// Extra channels granted to this part for colliding voices.
    sub_channels: Vec<u8>,
}

/// Lower an AST to a timed MIDI event sequence.
pub fn generate(ast: &Node, opts: &GenerateOptions) -> Result<MidiSequence, AldaError> {
    let children = match ast {
        Node::Root { children, .. } => children,
        other => {
            let pos = other.pos();
            return Err(AldaError::generate("expected a root node", pos.line, pos.col));
        }
    };

    let mut generator = Generator::new(opts.clone());
    generator
        .seq
        .tempo_changes
        .push(TempoChange::from_bpm(0.0, opts.bpm));

    for child in children {
        generator.process(child)?;
    }

    generator.seq.sort();
    Ok(generator.seq)
}

struct Generator {
    seq: MidiSequence,
    opts: GenerateOptions,
    parts: Vec<PartState>,
    part_index: HashMap<String, usize>,
    current: Option<usize>,
    variables: HashMap<String, Vec<Node>>,
    markers: HashMap<String, f64>,
    global_tempo: f64,
    next_channel: u8,
    rep_number: u32,
    /// Cram time-scaling factor; factors multiply through nested crams.
    time_scale: f64,
}

impl Generator {
    fn new(opts: GenerateOptions) -> Self {
        Self {
            seq: MidiSequence::new(opts.ticks_per_quarter),
            global_tempo: opts.bpm,
            opts,
            parts: Vec::new(),
            part_index: HashMap::new(),
            current: None,
            variables: HashMap::new(),
            markers: HashMap::new(),
            next_channel: 0,
            rep_number: 1,
            time_scale: 1.0,
        }
    }

    fn process(&mut self, node: &Node) -> Result<(), AldaError> {
        match node {
            Node::Root { children, .. } => {
                for child in children {
                    self.process(child)?;
                }
                Ok(())
            }
            Node::PartDecl {
                names, alias, pos, ..
            } => self.process_part_decl(names, alias.as_deref(), *pos),
            Node::EventSeq { events, .. } | Node::BracketSeq { events, .. } => {
                for event in events {
                    self.process(event)?;
                }
                Ok(())
            }
            Node::Note {
                letter,
                accidentals,
                duration,
                slurred,
                pos,
            } => {
                self.emit_note(*letter, accidentals, duration.as_deref(), *slurred, *pos, false)?;
                Ok(())
            }
            Node::Rest { duration, pos } => {
                let beats = self.resolve_beats(duration.as_deref(), *pos)?;
                let scale = self.time_scale;
                let part = self.part_mut();
                part.time += beats * 60.0 / part.tempo * scale;
                if duration.is_some() {
                    part.default_beats = beats;
                }
                Ok(())
            }
            Node::Chord { notes, .. } => self.process_chord(notes),
            Node::Barline { .. } => Ok(()),
            Node::OctaveSet { octave, .. } => {
                self.part_mut().octave = *octave;
                Ok(())
            }
            Node::OctaveUp { .. } => {
                self.part_mut().octave += 1;
                Ok(())
            }
            Node::OctaveDown { .. } => {
                self.part_mut().octave -= 1;
                Ok(())
            }
            Node::LispList { elements, pos } => self.process_attribute(elements, *pos),
            Node::VarDef { name, events, .. } => {
                self.variables.insert(name.clone(), events.clone());
                Ok(())
            }
            Node::VarRef { name, pos } => {
                let events = self.variables.get(name).cloned().ok_or_else(|| {
                    AldaError::generate(format!("undefined variable: '{name}'"), pos.line, pos.col)
                })?;
                for event in &events {
                    self.process(event)?;
                }
                Ok(())
            }
            Node::Marker { name, .. } => {
                let time = self.part_mut().time;
                self.markers.insert(name.clone(), time);
                Ok(())
            }
            Node::AtMarker { name, pos } => {
                let time = *self.markers.get(name).ok_or_else(|| {
                    AldaError::generate(format!("undefined marker: '{name}'"), pos.line, pos.col)
                })?;
                self.part_mut().time = time;
                Ok(())
            }
            Node::VoiceGroup { voices, .. } => self.process_voice_group(voices),
            Node::Cram {
                events,
                duration,
                pos,
            } => self.process_cram(events, duration.as_deref(), *pos),
            Node::Repeat { event, count, .. } => {
                let saved = self.rep_number;
                for pass in 1..=*count {
                    self.rep_number = pass;
                    self.process(event)?;
                }
                self.rep_number = saved;
                Ok(())
            }
            Node::OnReps { event, reps, .. } => {
                if reps.iter().any(|r| r.contains(self.rep_number)) {
                    self.process(event)?;
                }
                Ok(())
            }
            // Duration components and bare lisp atoms only occur nested
            // inside the nodes handled above.
            _ => Ok(()),
        }
    }

    // --- Parts ---

    fn process_part_decl(
        &mut self,
        names: &[String],
        alias: Option<&str>,
        pos: Position,
    ) -> Result<(), AldaError> {
        let key = alias
            .map(str::to_string)
            .unwrap_or_else(|| names[0].clone());

        if let Some(&idx) = self.part_index.get(&key) {
            self.current = Some(idx);
            return Ok(());
        }

        let percussion = names.iter().any(|n| gm::is_percussion(n));
        let program = if percussion {
            0
        } else {
            names
                .iter()
                .find_map(|n| gm::program_for(n))
                .ok_or_else(|| {
                    AldaError::generate(
                        format!("unknown instrument: '{}'", names.join("/")),
                        pos.line,
                        pos.col,
                    )
                })?
        };

        let channel = if percussion {
            PERCUSSION_CHANNEL
        } else {
            self.allocate_channel()
        };

        let part = self.make_part(channel, program);
        self.parts.push(part);
        let idx = self.parts.len() - 1;
        self.part_index.insert(key, idx);
        self.current = Some(idx);

        if !percussion {
            self.seq.program_changes.push(ProgramChange {
                time: 0.0,
                channel,
                program,
            });
        }
        Ok(())
    }

    fn make_part(&self, channel: u8, program: u8) -> PartState {
        PartState {
            octave: self.opts.default_octave,
            tempo: self.global_tempo,
            volume: DEFAULT_VOLUME,
            quant: DEFAULT_QUANT,
            channel,
            program,
            time: 0.0,
            default_beats: 4.0 / self.opts.default_denominator as f64,
            key_signature: HashMap::new(),
            transpose: 0,
            sub_channels: Vec::new(),
        }
    }

    /// Next free channel in declaration order, skipping the percussion
    /// channel and wrapping at 16.
    fn allocate_channel(&mut self) -> u8 {
        let channel = self.next_channel;
        self.next_channel += 1;
        if self.next_channel == PERCUSSION_CHANNEL {
            self.next_channel += 1;
        }
        if self.next_channel > 15 {
            self.next_channel = 0;
        }
        channel
    }

    /// The current part, creating the synthetic default part on first use.
    fn part_mut(&mut self) -> &mut PartState {
        let idx = match self.current {
            Some(idx) => idx,
            None => {
                let channel = self.allocate_channel();
                let part = self.make_part(channel, 0);
                self.parts.push(part);
                let idx = self.parts.len() - 1;
                self.part_index.insert(DEFAULT_PART.to_string(), idx);
                self.current = Some(idx);
                idx
            }
        };
        &mut self.parts[idx]
    }

    // --- Notes and durations ---

    /// Emit a note and return its nominal sounding length in seconds.
    /// Chord members do not advance the cursor.
    fn emit_note(
        &mut self,
        letter: char,
        accidentals: &str,
        duration: Option<&Node>,
        slurred: bool,
        pos: Position,
        in_chord: bool,
    ) -> Result<f64, AldaError> {
        let pitch = self.pitch_of(letter, accidentals, pos)?;
        let beats = self.resolve_beats(duration, pos)?;
        let scale = self.time_scale;

        let part = self.part_mut();
        let seconds = beats * 60.0 / part.tempo * scale;
        let gate = if slurred {
            seconds
        } else {
            (seconds * part.quant).max(MIN_GATE)
        };

        let note = MidiNote {
            pitch,
            velocity: part.volume,
            start: part.time,
            duration: gate,
            channel: part.channel,
        };
        if duration.is_some() {
            part.default_beats = beats;
        }
        if !in_chord {
            part.time += seconds;
        }
        self.seq.notes.push(note);
        Ok(seconds)
    }

    fn pitch_of(&mut self, letter: char, accidentals: &str, pos: Position) -> Result<u8, AldaError> {
        let part = self.part_mut();

        if !(0..=10).contains(&part.octave) {
            return Err(AldaError::generate(
                format!("octave {} out of range 0-10", part.octave),
                pos.line,
                pos.col,
            ));
        }

        let base = match letter {
            'c' => 0,
            'd' => 2,
            'e' => 4,
            'f' => 5,
            'g' => 7,
            'a' => 9,
            'b' => 11,
            other => {
                return Err(AldaError::generate(
                    format!("invalid note letter: '{other}'"),
                    pos.line,
                    pos.col,
                ))
            }
        };

        // An explicit accidental overrides the key signature for this
        // occurrence; `_` resets to natural.
        let offset: i32 = if accidentals.is_empty() {
            part.key_signature.get(&letter).copied().unwrap_or(0)
        } else {
            let mut sum = 0;
            for ch in accidentals.chars() {
                match ch {
                    '+' => sum += 1,
                    '-' => sum -= 1,
                    _ => sum = 0,
                }
            }
            sum
        };

        let pitch = (part.octave + 1) * 12 + base + offset + part.transpose;
        if !(0..=127).contains(&pitch) {
            return Err(AldaError::generate(
                format!("pitch {pitch} outside MIDI range 0-127"),
                pos.line,
                pos.col,
            ));
        }
        Ok(pitch as u8)
    }

    /// Duration in beats: explicit components, or the part default.
    fn resolve_beats(&mut self, duration: Option<&Node>, pos: Position) -> Result<f64, AldaError> {
        let (default_beats, tempo) = {
            let part = self.part_mut();
            (part.default_beats, part.tempo)
        };
        match duration {
            None => Ok(default_beats),
            Some(node) => beats_of(node, tempo, pos),
        }
    }

    // --- Compound events ---

    fn process_chord(&mut self, notes: &[Node]) -> Result<(), AldaError> {
        let start = self.part_mut().time;
        let mut advance = 0.0;

        for (i, item) in notes.iter().enumerate() {
            let seconds = match item {
                Node::Note {
                    letter,
                    accidentals,
                    duration,
                    slurred,
                    pos,
                } => self.emit_note(*letter, accidentals, duration.as_deref(), *slurred, *pos, true)?,
                Node::Rest { duration, pos } => {
                    let beats = self.resolve_beats(duration.as_deref(), *pos)?;
                    let scale = self.time_scale;
                    let part = self.part_mut();
                    if duration.is_some() {
                        part.default_beats = beats;
                    }
                    beats * 60.0 / part.tempo * scale
                }
                other => {
                    let p = other.pos();
                    return Err(AldaError::generate(
                        "only notes and rests may appear in a chord",
                        p.line,
                        p.col,
                    ));
                }
            };
            // The cursor advances once, by the first component's duration
            if i == 0 {
                advance = seconds;
            }
        }

        self.part_mut().time = start + advance;
        Ok(())
    }

    fn process_voice_group(&mut self, voices: &[Node]) -> Result<(), AldaError> {
        let start = self.part_mut().time;
        let mut max_end = start;
        let group_start = self.seq.notes.len();

        for voice in voices {
            if let Node::Voice { events, .. } = voice {
                self.part_mut().time = start;
                let from = self.seq.notes.len();
                for event in events {
                    self.process(event)?;
                }
                max_end = max_end.max(self.part_mut().time);
                self.resolve_voice_collisions(group_start, from, self.seq.notes.len());
            }
        }

        self.part_mut().time = max_end;
        Ok(())
    }

    /// Voices share the part's channel until a same-pitch overlap with an
    /// earlier voice in the group shows it saturated; the colliding voice
    /// then moves onto a sub-channel carrying the part's program.
    /// `from..to` is this voice's note range, `group_start..from` holds the
    /// earlier voices' notes.
    fn resolve_voice_collisions(&mut self, group_start: usize, from: usize, to: usize) {
        let (part_channel, program) = {
            let part = self.part_mut();
            (part.channel, part.program)
        };

        let saturated = self.seq.notes[from..to].iter().any(|note| {
            note.channel == part_channel
                && self.seq.notes[group_start..from]
                    .iter()
                    .any(|earlier| earlier.channel == part_channel && overlapping(note, earlier))
        });
        if !saturated {
            return;
        }

        let target = self.sub_channel_for(from, to, part_channel, program);
        for note in &mut self.seq.notes[from..to] {
            if note.channel == part_channel {
                note.channel = target;
            }
        }
    }

    /// An existing sub-channel of the part whose notes don't collide with
    /// the voice in `from..to`, or a freshly allocated one.
    fn sub_channel_for(&mut self, from: usize, to: usize, part_channel: u8, program: u8) -> u8 {
        let existing = self.part_mut().sub_channels.clone();
        'candidates: for candidate in existing {
            for other in self.seq.notes[..from]
                .iter()
                .chain(self.seq.notes[to..].iter())
                .filter(|n| n.channel == candidate)
            {
                let busy = self.seq.notes[from..to]
                    .iter()
                    .filter(|n| n.channel == part_channel)
                    .any(|note| overlapping(note, other));
                if busy {
                    continue 'candidates;
                }
            }
            return candidate;
        }

        let spare = self.allocate_channel();
        self.part_mut().sub_channels.push(spare);
        self.seq.program_changes.push(ProgramChange {
            time: 0.0,
            channel: spare,
            program,
        });
        spare
    }

    fn process_cram(
        &mut self,
        events: &[Node],
        duration: Option<&Node>,
        pos: Position,
    ) -> Result<(), AldaError> {
        let outer_beats = self.resolve_beats(duration, pos)?;
        let (start, saved_default, tempo) = {
            let part = self.part_mut();
            (part.time, part.default_beats, part.tempo)
        };
        let outer_seconds = outer_beats * 60.0 / tempo * self.time_scale;

        let mut running_default = saved_default;
        let nominal = self.nominal_beats(events, &mut running_default, tempo, pos)?;

        if nominal > 0.0 {
            let saved_scale = self.time_scale;
            self.time_scale *= outer_beats / nominal;
            for event in events {
                self.process(event)?;
            }
            self.time_scale = saved_scale;
        }

        let part = self.part_mut();
        part.default_beats = saved_default;
        part.time = start + outer_seconds;
        Ok(())
    }

    /// Sum of the written (pre-scaling) durations of a cram body, threading
    /// the running default note length the same way generation will.
    fn nominal_beats(
        &self,
        events: &[Node],
        default: &mut f64,
        tempo: f64,
        pos: Position,
    ) -> Result<f64, AldaError> {
        let mut sum = 0.0;
        for event in events {
            sum += self.nominal_of(event, default, tempo, pos)?;
        }
        Ok(sum)
    }

    fn nominal_of(
        &self,
        node: &Node,
        default: &mut f64,
        tempo: f64,
        pos: Position,
    ) -> Result<f64, AldaError> {
        match node {
            Node::Note { duration, .. } | Node::Rest { duration, .. } => {
                component_beats(duration.as_deref(), default, tempo, pos)
            }
            Node::Chord { notes, .. } => match notes.first() {
                Some(Node::Note { duration, .. }) | Some(Node::Rest { duration, .. }) => {
                    component_beats(duration.as_deref(), default, tempo, pos)
                }
                _ => Ok(0.0),
            },
            Node::Cram { duration, .. } => match duration {
                Some(d) => beats_of(d, tempo, pos),
                None => Ok(*default),
            },
            Node::EventSeq { events, .. } | Node::BracketSeq { events, .. } => {
                self.nominal_beats(events, default, tempo, pos)
            }
            Node::Repeat { event, count, .. } => {
                let mut total = 0.0;
                for _ in 0..*count {
                    total += self.nominal_of(event, default, tempo, pos)?;
                }
                Ok(total)
            }
            Node::OnReps { event, reps, .. } => {
                if reps.iter().any(|r| r.contains(self.rep_number)) {
                    self.nominal_of(event, default, tempo, pos)
                } else {
                    Ok(0.0)
                }
            }
            Node::VarRef { name, .. } => match self.variables.get(name) {
                Some(events) => self.nominal_beats(events, default, tempo, pos),
                None => Ok(0.0),
            },
            Node::VoiceGroup { voices, .. } => {
                let mut longest = 0.0f64;
                for voice in voices {
                    if let Node::Voice { events, .. } = voice {
                        let mut voice_default = *default;
                        let len = self.nominal_beats(events, &mut voice_default, tempo, pos)?;
                        longest = longest.max(len);
                    }
                }
                Ok(longest)
            }
            _ => Ok(0.0),
        }
    }

    // --- Attributes ---

    fn process_attribute(&mut self, elements: &[Node], pos: Position) -> Result<(), AldaError> {
        let name = match elements.first() {
            Some(Node::LispSymbol { name, .. }) => name.to_lowercase(),
            _ => {
                return Err(AldaError::generate(
                    "malformed attribute expression",
                    pos.line,
                    pos.col,
                ))
            }
        };

        match name.as_str() {
            "tempo" => {
                let bpm = self.number_arg(elements, &name, pos)?;
                if bpm <= 0.0 {
                    return Err(AldaError::generate("tempo must be positive", pos.line, pos.col));
                }
                let part = self.part_mut();
                part.tempo = bpm;
                let time = part.time;
                self.seq.tempo_changes.push(TempoChange::from_bpm(time, bpm));
            }
            "tempo!" => {
                let bpm = self.number_arg(elements, &name, pos)?;
                if bpm <= 0.0 {
                    return Err(AldaError::generate("tempo must be positive", pos.line, pos.col));
                }
                let time = self.part_mut().time;
                self.global_tempo = bpm;
                for part in &mut self.parts {
                    part.tempo = bpm;
                }
                self.seq.tempo_changes.push(TempoChange::from_bpm(time, bpm));
            }
            "vol" | "volume" => {
                let v = self.number_arg(elements, &name, pos)?;
                self.part_mut().volume = ((v * 127.0 / 100.0).round() as i64).clamp(0, 127) as u8;
            }
            "quant" | "quantize" | "quantization" => {
                let v = self.number_arg(elements, &name, pos)?;
                self.part_mut().quant = (v / 100.0).clamp(0.0, 1.0);
            }
            "pan" | "panning" => {
                let v = self.number_arg(elements, &name, pos)?;
                let value = ((v * 127.0 / 100.0).round() as i64).clamp(0, 127) as u8;
                let part = self.part_mut();
                let (time, channel) = (part.time, part.channel);
                self.seq.control_changes.push(ControlChange {
                    time,
                    channel,
                    controller: 10,
                    value,
                });
            }
            "octave" => {
                let v = self.number_arg(elements, &name, pos)?;
                self.part_mut().octave = v.round() as i32;
            }
            "transpose" => {
                let v = self.number_arg(elements, &name, pos)?;
                self.part_mut().transpose = v.round() as i32;
            }
            "key-signature" | "key-sig" => {
                let spec = match elements.get(1) {
                    Some(Node::LispString { value, .. }) => value.clone(),
                    _ => {
                        return Err(AldaError::generate(
                            "key-signature expects a string like \"f+ c+\"",
                            pos.line,
                            pos.col,
                        ))
                    }
                };
                let signature = parse_key_signature(&spec, pos)?;
                self.part_mut().key_signature = signature;
            }
            _ => {
                if let Some(velocity) = dynamic_velocity(&name) {
                    self.part_mut().volume = velocity;
                } else {
                    return Err(AldaError::generate(
                        format!("unknown attribute: '{name}'"),
                        pos.line,
                        pos.col,
                    ));
                }
            }
        }
        Ok(())
    }

    fn number_arg(&self, elements: &[Node], attr: &str, pos: Position) -> Result<f64, AldaError> {
        match elements.get(1) {
            Some(Node::LispNumber { value, .. }) => Ok(*value),
            _ => Err(AldaError::generate(
                format!("'{attr}' expects a number"),
                pos.line,
                pos.col,
            )),
        }
    }
}

/// Beats for one explicit duration component or the running default,
/// updating the default when explicit.
fn component_beats(
    duration: Option<&Node>,
    default: &mut f64,
    tempo: f64,
    pos: Position,
) -> Result<f64, AldaError> {
    match duration {
        Some(d) => {
            let beats = beats_of(d, tempo, pos)?;
            *default = beats;
            Ok(beats)
        }
        None => Ok(*default),
    }
}

/// Beats for a Duration node: tied components sum. A quarter note is one
/// beat; `ms`/`s` components convert through the tempo so the seconds they
/// denote are tempo-independent.
fn beats_of(node: &Node, tempo: f64, pos: Position) -> Result<f64, AldaError> {
    let components = match node {
        Node::Duration { components, .. } => components,
        other => {
            let p = other.pos();
            return Err(AldaError::generate("expected a duration", p.line, p.col));
        }
    };

    let mut total = 0.0;
    for component in components {
        total += match component {
            Node::NoteLength {
                denominator, dots, ..
            } => {
                if *denominator == 0 {
                    return Err(AldaError::generate(
                        "note length denominator must be positive",
                        pos.line,
                        pos.col,
                    ));
                }
                // Dots extend by (2 - 2^-dots)
                (4.0 / *denominator as f64) * (2.0 - 0.5f64.powi(*dots as i32))
            }
            Node::NoteLengthMs { ms, .. } => (*ms as f64 / 1000.0) * tempo / 60.0,
            Node::NoteLengthS { seconds, .. } => seconds * tempo / 60.0,
            other => {
                let p = other.pos();
                return Err(AldaError::generate(
                    "expected a duration component",
                    p.line,
                    p.col,
                ));
            }
        };
    }
    Ok(total)
}

/// True when two notes of the same pitch sound at the same time.
fn overlapping(a: &MidiNote, b: &MidiNote) -> bool {
    a.pitch == b.pitch && a.start < b.end() - 1e-9 && b.start < a.end() - 1e-9
}

/// Parse a key-signature string like `"f+ c+"` into per-letter offsets.
fn parse_key_signature(spec: &str, pos: Position) -> Result<HashMap<char, i32>, AldaError> {
    let mut signature = HashMap::new();
    for token in spec.split_whitespace() {
        let mut chars = token.chars();
        let letter = chars.next().map(|c| c.to_ascii_lowercase());
        let letter = match letter {
            Some(l @ 'a'..='g') => l,
            _ => {
                return Err(AldaError::generate(
                    format!("malformed key signature: '{spec}'"),
                    pos.line,
                    pos.col,
                ))
            }
        };
        let mut offset = 0;
        for ch in chars {
            match ch {
                '+' => offset += 1,
                '-' => offset -= 1,
                '_' => offset = 0,
                _ => {
                    return Err(AldaError::generate(
                        format!("malformed key signature: '{spec}'"),
                        pos.line,
                        pos.col,
                    ))
                }
            }
        }
        signature.insert(letter, offset);
    }
    Ok(signature)
}

/// Dynamic markings, pianissimo through fortissimo and beyond.
fn dynamic_velocity(name: &str) -> Option<u8> {
    match name {
        "pppppp" => Some(1),
        "ppppp" => Some(5),
        "pppp" => Some(10),
        "ppp" => Some(15),
        "pp" => Some(25),
        "p" => Some(40),
        "mp" => Some(55),
        "mf" => Some(70),
        "f" => Some(85),
        "ff" => Some(100),
        "fff" => Some(110),
        "ffff" => Some(115),
        "fffff" => Some(120),
        "ffffff" => Some(127),
        _ => None,
    }
}
