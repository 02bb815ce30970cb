//! Standard MIDI File writer (format 1).
//!
//! Track 0 carries tempo meta events; each channel with content gets its
//! own track. All tracks convert seconds to ticks through one [`TempoMap`]
//! so deltas line up across tracks. Running status is never used.

use crate::lang::error::AldaError;
use crate::midi::event::{MidiSequence, TempoChange, DEFAULT_US_PER_QUARTER};

use super::tempo::TempoMap;
use super::vlq;

/// Same-tick ordering within a track.
const PRIO_PROGRAM: u8 = 0;
const PRIO_CONTROL: u8 = 1;
const PRIO_NOTE_OFF: u8 = 2;
const PRIO_NOTE_ON: u8 = 3;

/// Track byte length must fit the MTrk length field.
const MAX_TRACK_LEN: usize = 1 << 31;

struct TrackEvent {
    tick: u64,
    priority: u8,
    data: Vec<u8>,
}

/// Serialize a timed event sequence to SMF format-1 bytes.
pub fn write_smf(sequence: &MidiSequence, ticks_per_quarter: u16) -> Result<Vec<u8>, AldaError> {
    let tempo_map = TempoMap::from_changes(ticks_per_quarter, &sequence.tempo_changes);

    let mut tracks = Vec::new();
    tracks.push(encode_track(tempo_track_events(sequence, &tempo_map))?);
    for channel in sequence.channels() {
        tracks.push(encode_track(channel_track_events(
            sequence, channel, &tempo_map,
        ))?);
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // format 1
    out.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    out.extend_from_slice(&ticks_per_quarter.to_be_bytes());

    for track in tracks {
        out.extend_from_slice(b"MTrk");
        out.extend_from_slice(&(track.len() as u32).to_be_bytes());
        out.extend(track);
    }

    Ok(out)
}

fn tempo_meta(change: &TempoChange, tick: u64) -> TrackEvent {
    let us = change.us_per_quarter;
    TrackEvent {
        tick,
        priority: PRIO_PROGRAM,
        data: vec![
            0xFF,
            0x51,
            0x03,
            ((us >> 16) & 0xFF) as u8,
            ((us >> 8) & 0xFF) as u8,
            (us & 0xFF) as u8,
        ],
    }
}

fn tempo_track_events(sequence: &MidiSequence, tempo_map: &TempoMap) -> Vec<TrackEvent> {
    let mut events = Vec::new();

    if sequence.tempo_changes.is_empty() {
        events.push(tempo_meta(
            &TempoChange {
                time: 0.0,
                us_per_quarter: DEFAULT_US_PER_QUARTER,
            },
            0,
        ));
    } else {
        let mut sorted: Vec<&TempoChange> = sequence.tempo_changes.iter().collect();
        sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
        for change in sorted {
            events.push(tempo_meta(change, tempo_map.seconds_to_ticks(change.time)));
        }
    }

    events
}

fn channel_track_events(
    sequence: &MidiSequence,
    channel: u8,
    tempo_map: &TempoMap,
) -> Vec<TrackEvent> {
    let ch = channel & 0x0F;
    let mut events = Vec::new();

    for pc in &sequence.program_changes {
        if pc.channel == channel {
            events.push(TrackEvent {
                tick: tempo_map.seconds_to_ticks(pc.time),
                priority: PRIO_PROGRAM,
                data: vec![0xC0 | ch, pc.program & 0x7F],
            });
        }
    }

    for cc in &sequence.control_changes {
        if cc.channel == channel {
            events.push(TrackEvent {
                tick: tempo_map.seconds_to_ticks(cc.time),
                priority: PRIO_CONTROL,
                data: vec![0xB0 | ch, cc.controller & 0x7F, cc.value & 0x7F],
            });
        }
    }

    for note in &sequence.notes {
        if note.channel == channel {
            let on_tick = tempo_map.seconds_to_ticks(note.start);
            let off_tick = tempo_map.seconds_to_ticks(note.end()).max(on_tick + 1);
            events.push(TrackEvent {
                tick: on_tick,
                priority: PRIO_NOTE_ON,
                data: vec![0x90 | ch, note.pitch & 0x7F, note.velocity & 0x7F],
            });
            events.push(TrackEvent {
                tick: off_tick,
                priority: PRIO_NOTE_OFF,
                data: vec![0x80 | ch, note.pitch & 0x7F, 0],
            });
        }
    }

    events
}

/// Sort, delta-encode, and terminate a track.
fn encode_track(mut events: Vec<TrackEvent>) -> Result<Vec<u8>, AldaError> {
    events.sort_by(|a, b| a.tick.cmp(&b.tick).then(a.priority.cmp(&b.priority)));

    let mut out = Vec::new();
    let mut last_tick = 0u64;
    for event in &events {
        let delta = event.tick - last_tick;
        let delta: u32 = delta
            .try_into()
            .map_err(|_| AldaError::smf("delta time overflow"))?;
        out.extend(vlq::encode(delta));
        out.extend_from_slice(&event.data);
        last_tick = event.tick;
    }

    // End of track at the time of the last event
    out.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    if out.len() > MAX_TRACK_LEN {
        return Err(AldaError::smf("track length overflow"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::event::{MidiNote, ProgramChange};

    fn one_note_sequence() -> MidiSequence {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        seq.program_changes.push(ProgramChange {
            time: 0.0,
            channel: 0,
            program: 0,
        });
        seq.notes.push(MidiNote {
            pitch: 60,
            velocity: 80,
            start: 0.0,
            duration: 0.45,
            channel: 0,
        });
        seq
    }

    #[test]
    fn header_chunk_layout() {
        let bytes = write_smf(&one_note_sequence(), 480).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 6]);
        assert_eq!(&bytes[8..10], &[0, 1]); // format 1
        assert_eq!(&bytes[10..12], &[0, 2]); // tempo track + one channel track
        assert_eq!(&bytes[12..14], &480u16.to_be_bytes());
        assert_eq!(&bytes[14..18], b"MTrk");
    }

    #[test]
    fn tempo_track_carries_set_tempo() {
        let bytes = write_smf(&one_note_sequence(), 480).unwrap();
        // Track 0 starts after the 14-byte header + MTrk + length
        let track0 = &bytes[22..];
        // delta 0, FF 51 03, 500000 = 0x07A120
        assert_eq!(&track0[0..7], &[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
    }

    #[test]
    fn every_track_ends_with_eot() {
        let bytes = write_smf(&one_note_sequence(), 480).unwrap();
        let mut pos = 14;
        let mut tracks = 0;
        while pos < bytes.len() {
            assert_eq!(&bytes[pos..pos + 4], b"MTrk");
            let len = u32::from_be_bytes([
                bytes[pos + 4],
                bytes[pos + 5],
                bytes[pos + 6],
                bytes[pos + 7],
            ]) as usize;
            let body = &bytes[pos + 8..pos + 8 + len];
            assert_eq!(&body[body.len() - 3..], &[0xFF, 0x2F, 0x00]);
            pos += 8 + len;
            tracks += 1;
        }
        assert_eq!(tracks, 2);
    }

    #[test]
    fn note_deltas_at_120_bpm() {
        let bytes = write_smf(&one_note_sequence(), 480).unwrap();
        // Channel track is the second chunk; find it
        let len0 = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        let t1 = 22 + len0;
        assert_eq!(&bytes[t1..t1 + 4], b"MTrk");
        let body = &bytes[t1 + 8..];
        // delta 0, program change; delta 0, note on; delta 216*2=432? No:
        // 0.45 s at 120 BPM, 480 tpq = 432 ticks → VLQ 0x83 0x30
        assert_eq!(&body[0..2], &[0x00, 0xC0]); // program change ch 0
        assert_eq!(body[2], 0x00); // program 0
        assert_eq!(&body[3..7], &[0x00, 0x90, 60, 80]); // note on
        assert_eq!(&body[7..9], &[0x83, 0x30]); // delta 432
        assert_eq!(&body[9..12], &[0x80, 60, 0]); // note off
    }

    #[test]
    fn note_off_sorts_before_note_on_at_same_tick() {
        let mut seq = MidiSequence::new(480);
        seq.tempo_changes.push(TempoChange::from_bpm(0.0, 120.0));
        // Back-to-back notes with full gate: off of the first lands on the
        // on of the second
        for (i, pitch) in [60u8, 62].iter().enumerate() {
            seq.notes.push(MidiNote {
                pitch: *pitch,
                velocity: 80,
                start: i as f64 * 0.5,
                duration: 0.5,
                channel: 0,
            });
        }
        let bytes = write_smf(&seq, 480).unwrap();
        let len0 = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        let body = &bytes[22 + len0 + 8..];
        // on(60), delta 480 off(60), delta 0 on(62), ...
        assert_eq!(&body[0..4], &[0x00, 0x90, 60, 80]);
        assert_eq!(&body[4..6], &[0x83, 0x60]); // delta 480
        assert_eq!(&body[6..9], &[0x80, 60, 0]);
        assert_eq!(&body[9..13], &[0x00, 0x90, 62, 80]);
    }

    #[test]
    fn zero_length_note_still_gets_later_off() {
        let mut seq = MidiSequence::new(480);
        seq.notes.push(MidiNote {
            pitch: 60,
            velocity: 80,
            start: 0.0,
            duration: 0.0,
            channel: 0,
        });
        let bytes = write_smf(&seq, 480).unwrap();
        let len0 = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        let body = &bytes[22 + len0 + 8..];
        assert_eq!(&body[0..4], &[0x00, 0x90, 60, 80]);
        // off forced to tick 1
        assert_eq!(&body[4..8], &[0x01, 0x80, 60, 0]);
    }

    #[test]
    fn channels_map_to_separate_tracks() {
        let mut seq = MidiSequence::new(480);
        for channel in [0u8, 3] {
            seq.notes.push(MidiNote {
                pitch: 60,
                velocity: 80,
                start: 0.0,
                duration: 0.5,
                channel,
            });
        }
        let bytes = write_smf(&seq, 480).unwrap();
        assert_eq!(&bytes[10..12], &[0, 3]); // tempo + 2 channel tracks
    }

    #[test]
    fn status_bytes_carry_channel_number() {
        let mut seq = MidiSequence::new(480);
        seq.notes.push(MidiNote {
            pitch: 60,
            velocity: 80,
            start: 0.0,
            duration: 0.5,
            channel: 9,
        });
        let bytes = write_smf(&seq, 480).unwrap();
        assert!(bytes.windows(3).any(|w| w == [0x99, 60, 80]));
        assert!(bytes.windows(3).any(|w| w == [0x89, 60, 0]));
    }
}
