//! MIDI → AST conversion, for importing Standard MIDI Files as scores.
//!
//! Quantizes note starts to a beat grid, inserts rests for gaps, groups
//! simultaneous notes into chords, and emits one part per channel using
//! the GM program table. Imported nodes have no meaningful source
//! position.

use std::collections::HashMap;

use crate::lang::ast::{Node, Position};
use crate::midi::event::{MidiNote, MidiSequence};
use crate::midi::gm;

/// Standard note values: (denominator, length in beats).
const DURATION_VALUES: [(u32, f64); 14] = [
    (1, 4.0),
    (2, 2.0),
    (4, 1.0),
    (6, 2.0 / 3.0),
    (8, 0.5),
    (12, 1.0 / 3.0),
    (16, 0.25),
    (20, 0.2),
    (24, 1.0 / 6.0),
    (32, 0.125),
    (40, 0.1),
    (48, 1.0 / 12.0),
    (64, 0.0625),
    (80, 0.05),
];

/// Dotted values: (denominator, dots, length in beats).
const DOTTED_DURATION_VALUES: [(u32, u32, f64); 7] = [
    (1, 1, 6.0),
    (2, 1, 3.0),
    (4, 1, 1.5),
    (8, 1, 0.75),
    (12, 1, 0.5),
    (16, 1, 0.375),
    (24, 1, 0.25),
];

/// Sharps for the black keys: (letter, accidentals).
const PITCH_CLASS_NOTES: [(char, &str); 12] = [
    ('c', ""),
    ('c', "+"),
    ('d', ""),
    ('d', "+"),
    ('e', ""),
    ('f', ""),
    ('f', "+"),
    ('g', ""),
    ('g', "+"),
    ('a', ""),
    ('a', "+"),
    ('b', ""),
];

#[derive(Debug, Clone, Copy)]
struct QuantizedNote {
    pitch: u8,
    start_beat: f64,
    duration_beats: f64,
    start_seconds: f64,
}

/// Convert a MIDI pitch to (letter, octave, accidentals), C4 = 60.
pub fn midi_pitch_to_note(pitch: u8) -> (char, i32, &'static str) {
    let octave = (pitch as i32 / 12) - 1;
    let (letter, accidentals) = PITCH_CLASS_NOTES[(pitch % 12) as usize];
    (letter, octave, accidentals)
}

/// Closest Alda note value for a beat length.
pub fn beats_to_duration(beats: f64) -> (u32, u32) {
    if beats <= 0.0 {
        return (4, 0);
    }

    let mut best = (4u32, 0u32);
    let mut best_diff = f64::INFINITY;

    for &(denominator, length) in &DURATION_VALUES {
        let diff = (beats - length).abs();
        if diff < best_diff {
            best_diff = diff;
            best = (denominator, 0);
        }
    }
    for &(denominator, dots, length) in &DOTTED_DURATION_VALUES {
        let diff = (beats - length).abs();
        if diff < best_diff {
            best_diff = diff;
            best = (denominator, dots);
        }
    }
    best
}

fn quantize_to_grid(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

fn seconds_to_beats(seconds: f64, bpm: f64) -> f64 {
    seconds * bpm / 60.0
}

fn no_pos() -> Position {
    Position::default()
}

fn duration_node(denominator: u32, dots: u32) -> Node {
    Node::Duration {
        components: vec![Node::NoteLength {
            denominator,
            dots,
            pos: no_pos(),
        }],
        pos: no_pos(),
    }
}

fn tempo_node(bpm: f64, global: bool) -> Node {
    Node::LispList {
        elements: vec![
            Node::LispSymbol {
                name: if global { "tempo!" } else { "tempo" }.to_string(),
                pos: no_pos(),
            },
            Node::LispNumber {
                value: bpm.round(),
                pos: no_pos(),
            },
        ],
        pos: no_pos(),
    }
}

/// Convert a timed event sequence to an AST.
///
/// `quantize_grid` is in beats (0.25 = sixteenth notes); 0 disables
/// quantization.
pub fn midi_to_ast(sequence: &MidiSequence, quantize_grid: f64) -> Node {
    let mut tempo_changes = sequence.tempo_changes.clone();
    tempo_changes.sort_by(|a, b| a.time.total_cmp(&b.time));

    let bpm = tempo_changes.first().map(|t| t.bpm()).unwrap_or(120.0);
    let later_tempos: Vec<(f64, f64)> = tempo_changes
        .iter()
        .skip(1)
        .map(|t| (t.time, t.bpm()))
        .collect();

    let mut channels: HashMap<u8, Vec<MidiNote>> = HashMap::new();
    for note in &sequence.notes {
        channels.entry(note.channel).or_default().push(*note);
    }

    let mut channel_programs: HashMap<u8, u8> = HashMap::new();
    for pc in &sequence.program_changes {
        channel_programs.entry(pc.channel).or_insert(pc.program);
    }

    let mut children = Vec::new();
    if (bpm - 120.0).abs() > 0.1 {
        children.push(tempo_node(bpm, true));
    }

    let mut channel_ids: Vec<u8> = channels.keys().copied().collect();
    channel_ids.sort_unstable();

    for channel in channel_ids {
        let notes = &channels[&channel];
        if notes.is_empty() {
            continue;
        }

        let instrument = if channel == 9 {
            "midi-percussion".to_string()
        } else {
            let program = channel_programs.get(&channel).copied().unwrap_or(0);
            gm::instrument_for(program).to_string()
        };

        children.push(Node::PartDecl {
            names: vec![instrument],
            alias: None,
            pos: no_pos(),
        });

        let quantized = quantize_notes(notes, bpm, quantize_grid);
        let events = notes_to_events(&quantized, &later_tempos);
        children.push(Node::EventSeq {
            events,
            pos: no_pos(),
        });
    }

    Node::Root {
        children,
        pos: no_pos(),
    }
}

fn quantize_notes(notes: &[MidiNote], bpm: f64, grid: f64) -> Vec<QuantizedNote> {
    let mut result: Vec<QuantizedNote> = notes
        .iter()
        .map(|note| {
            let start = quantize_to_grid(seconds_to_beats(note.start, bpm), grid);
            let duration =
                quantize_to_grid(seconds_to_beats(note.duration, bpm), grid).max(grid.max(0.0625));
            QuantizedNote {
                pitch: note.pitch,
                start_beat: start,
                duration_beats: duration,
                start_seconds: note.start,
            }
        })
        .collect();

    result.sort_by(|a, b| {
        a.start_beat
            .total_cmp(&b.start_beat)
            .then(a.pitch.cmp(&b.pitch))
    });
    result
}

fn notes_to_events(notes: &[QuantizedNote], tempos: &[(f64, f64)]) -> Vec<Node> {
    let mut events = Vec::new();
    let mut current_beat = 0.0;
    let mut current_octave = 4;
    let mut tempo_index = 0;

    let mut i = 0;
    while i < notes.len() {
        let note = notes[i];
        tempo_index = emit_due_tempos(tempos, tempo_index, note.start_seconds, &mut events);

        // Fill any gap with a rest
        let gap = note.start_beat - current_beat;
        if gap > 0.01 {
            let (denominator, dots) = beats_to_duration(gap);
            events.push(Node::Rest {
                duration: Some(Box::new(duration_node(denominator, dots))),
                pos: no_pos(),
            });
            current_beat = note.start_beat;
        }

        // Gather simultaneous notes into a chord
        let mut j = i + 1;
        while j < notes.len() && (notes[j].start_beat - note.start_beat).abs() < 0.01 {
            j += 1;
        }

        let (denominator, dots) = beats_to_duration(note.duration_beats);
        let (_, first_octave, _) = midi_pitch_to_note(note.pitch);
        if first_octave != current_octave {
            events.push(Node::OctaveSet {
                octave: first_octave,
                pos: no_pos(),
            });
            current_octave = first_octave;
        }

        if j - i > 1 {
            let chord_notes = notes[i..j]
                .iter()
                .enumerate()
                .map(|(k, n)| {
                    let (letter, _, accidentals) = midi_pitch_to_note(n.pitch);
                    Node::Note {
                        letter,
                        accidentals: accidentals.to_string(),
                        // Duration on the first chord note only
                        duration: (k == 0).then(|| Box::new(duration_node(denominator, dots))),
                        slurred: false,
                        pos: no_pos(),
                    }
                })
                .collect();
            events.push(Node::Chord {
                notes: chord_notes,
                pos: no_pos(),
            });
        } else {
            let (letter, _, accidentals) = midi_pitch_to_note(note.pitch);
            events.push(Node::Note {
                letter,
                accidentals: accidentals.to_string(),
                duration: Some(Box::new(duration_node(denominator, dots))),
                slurred: false,
                pos: no_pos(),
            });
        }

        current_beat = note.start_beat + note.duration_beats;
        i = j;
    }

    emit_due_tempos(tempos, tempo_index, f64::INFINITY, &mut events);
    events
}

fn emit_due_tempos(
    tempos: &[(f64, f64)],
    mut index: usize,
    target_time: f64,
    events: &mut Vec<Node>,
) -> usize {
    while index < tempos.len() && tempos[index].0 <= target_time + 1e-4 {
        events.push(tempo_node(tempos[index].1, false));
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::event::{ProgramChange, TempoChange};

    fn note(pitch: u8, start: f64, duration: f64, channel: u8) -> MidiNote {
        MidiNote {
            pitch,
            velocity: 80,
            start,
            duration,
            channel,
        }
    }

    #[test]
    fn pitch_conversion() {
        assert_eq!(midi_pitch_to_note(60), ('c', 4, ""));
        assert_eq!(midi_pitch_to_note(61), ('c', 4, "+"));
        assert_eq!(midi_pitch_to_note(69), ('a', 4, ""));
        assert_eq!(midi_pitch_to_note(48), ('c', 3, ""));
        assert_eq!(midi_pitch_to_note(0), ('c', -1, ""));
    }

    #[test]
    fn beat_lengths_snap_to_note_values() {
        assert_eq!(beats_to_duration(1.0), (4, 0));
        assert_eq!(beats_to_duration(0.5), (8, 0));
        assert_eq!(beats_to_duration(2.0), (2, 0));
        assert_eq!(beats_to_duration(1.5), (4, 1));
        assert_eq!(beats_to_duration(1.0 / 3.0), (12, 0));
        assert_eq!(beats_to_duration(0.0), (4, 0));
    }

    #[test]
    fn single_part_from_one_channel() {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        seq.program_changes.push(ProgramChange {
            time: 0.0,
            channel: 0,
            program: 40,
        });
        seq.notes.push(note(60, 0.0, 0.45, 0));
        seq.notes.push(note(62, 0.5, 0.45, 0));

        let ast = midi_to_ast(&seq, 0.25);
        let children = match ast {
            Node::Root { children, .. } => children,
            other => panic!("expected Root, got {other:?}"),
        };
        assert!(
            matches!(&children[0], Node::PartDecl { names, .. } if names[0] == "violin"),
            "got {:?}",
            children[0]
        );
        match &children[1] {
            Node::EventSeq { events, .. } => {
                assert_eq!(events.len(), 2);
                assert!(matches!(&events[0], Node::Note { letter: 'c', .. }));
                assert!(matches!(&events[1], Node::Note { letter: 'd', .. }));
            }
            other => panic!("expected EventSeq, got {other:?}"),
        }
    }

    #[test]
    fn gap_becomes_rest() {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        seq.notes.push(note(60, 0.0, 0.5, 0));
        // One-beat gap before the next note
        seq.notes.push(note(62, 1.0, 0.5, 0));

        let ast = midi_to_ast(&seq, 0.25);
        let events = first_events(&ast);
        assert!(matches!(&events[1], Node::Rest { .. }), "got {:?}", events[1]);
    }

    #[test]
    fn simultaneous_notes_become_a_chord() {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        for pitch in [60, 64, 67] {
            seq.notes.push(note(pitch, 0.0, 0.5, 0));
        }

        let ast = midi_to_ast(&seq, 0.25);
        let events = first_events(&ast);
        match &events[0] {
            Node::Chord { notes, .. } => {
                assert_eq!(notes.len(), 3);
                // Duration only on the first note
                assert!(matches!(&notes[0], Node::Note { duration: Some(_), .. }));
                assert!(matches!(&notes[1], Node::Note { duration: None, .. }));
            }
            other => panic!("expected Chord, got {other:?}"),
        }
    }

    #[test]
    fn octave_changes_emit_octave_set() {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        seq.notes.push(note(60, 0.0, 0.5, 0)); // octave 4
        seq.notes.push(note(72, 0.5, 0.5, 0)); // octave 5

        let ast = midi_to_ast(&seq, 0.25);
        let events = first_events(&ast);
        assert!(events
            .iter()
            .any(|e| matches!(e, Node::OctaveSet { octave: 5, .. })));
    }

    #[test]
    fn non_default_tempo_emitted_globally() {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 90.0));
        seq.notes.push(note(60, 0.0, 0.5, 0));

        let ast = midi_to_ast(&seq, 0.25);
        let children = match ast {
            Node::Root { children, .. } => children,
            other => panic!("expected Root, got {other:?}"),
        };
        match &children[0] {
            Node::LispList { elements, .. } => {
                assert!(matches!(&elements[0], Node::LispSymbol { name, .. } if name == "tempo!"));
            }
            other => panic!("expected tempo! node, got {other:?}"),
        }
    }

    #[test]
    fn percussion_channel_names_percussion_part() {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        seq.notes.push(note(36, 0.0, 0.25, 9));

        let ast = midi_to_ast(&seq, 0.25);
        let children = match ast {
            Node::Root { children, .. } => children,
            other => panic!("expected Root, got {other:?}"),
        };
        assert!(
            matches!(&children[0], Node::PartDecl { names, .. } if names[0] == "midi-percussion")
        );
    }

    #[test]
    fn imported_ast_regenerates() {
        // The whole round trip: AST from import must survive generation
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        seq.notes.push(note(60, 0.0, 0.45, 0));
        seq.notes.push(note(64, 0.5, 0.45, 0));

        let ast = midi_to_ast(&seq, 0.25);
        let regenerated =
            crate::midi::generate(&ast, &crate::midi::GenerateOptions::default()).unwrap();
        assert_eq!(regenerated.notes.len(), 2);
        let pitches: Vec<u8> = regenerated.notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64]);
    }

    fn first_events(ast: &Node) -> &[Node] {
        if let Node::Root { children, .. } = ast {
            for child in children {
                if let Node::EventSeq { events, .. } = child {
                    return events;
                }
            }
        }
        panic!("no event sequence in {ast:?}");
    }
}
