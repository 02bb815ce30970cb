//! Standard MIDI File reader (formats 0 and 1).
//!
//! Recognizes NoteOn/NoteOff (a NoteOn with velocity 0 is a NoteOff),
//! program and control changes, Set Tempo, and End of Track. Unknown meta
//! events and sysex are skipped by their stated length. Running status is
//! accepted on input even though the writer never produces it.

use crate::lang::error::AldaError;
use crate::midi::event::{
    ControlChange, MidiNote, MidiSequence, ProgramChange, TempoChange,
};

use super::tempo::TempoMap;
use super::vlq;

/// A channel event at an absolute tick, before time conversion.
enum RawEvent {
    NoteOn {
        tick: u64,
        channel: u8,
        pitch: u8,
        velocity: u8,
    },
    NoteOff {
        tick: u64,
        channel: u8,
        pitch: u8,
    },
    Program {
        tick: u64,
        channel: u8,
        program: u8,
    },
    Control {
        tick: u64,
        channel: u8,
        controller: u8,
        value: u8,
    },
}

/// Parse SMF bytes into a timed event sequence plus its tempo map.
pub fn read_smf(bytes: &[u8]) -> Result<(MidiSequence, Vec<TempoChange>), AldaError> {
    let mut pos = 0;

    let header = chunk(bytes, &mut pos)?;
    if header.id != *b"MThd" {
        return Err(AldaError::smf("bad chunk id: expected MThd"));
    }
    if header.body.len() < 6 {
        return Err(AldaError::smf("MThd body too short"));
    }
    let format = u16::from_be_bytes([header.body[0], header.body[1]]);
    if format > 1 {
        return Err(AldaError::smf(format!("unsupported SMF format {format}")));
    }
    let ntrks = u16::from_be_bytes([header.body[2], header.body[3]]);
    let division = u16::from_be_bytes([header.body[4], header.body[5]]);
    if division & 0x8000 != 0 {
        return Err(AldaError::smf("SMPTE time division is not supported"));
    }

    let mut raw_events = Vec::new();
    let mut tempo_ticks: Vec<(u64, u32)> = Vec::new();
    let mut end_ticks = Vec::new();

    for _ in 0..ntrks {
        let track = chunk(bytes, &mut pos)?;
        if track.id != *b"MTrk" {
            return Err(AldaError::smf("bad chunk id: expected MTrk"));
        }
        let end = read_track(track.body, &mut raw_events, &mut tempo_ticks)?;
        end_ticks.push(end);
    }

    let tempo_map = TempoMap::from_tick_changes(division, &tempo_ticks);

    let mut sequence = MidiSequence::new(division);
    for &(tick, us_per_quarter) in &tempo_ticks {
        sequence.tempo_changes.push(TempoChange {
            time: tempo_map.ticks_to_seconds(tick),
            us_per_quarter,
        });
    }

    pair_events(
        &raw_events,
        end_ticks.iter().copied().max().unwrap_or(0),
        &tempo_map,
        &mut sequence,
    );

    sequence.sort();
    let tempo_changes = sequence.tempo_changes.clone();
    Ok((sequence, tempo_changes))
}

struct Chunk<'a> {
    id: [u8; 4],
    body: &'a [u8],
}

fn chunk<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<Chunk<'a>, AldaError> {
    if bytes.len() < *pos + 8 {
        return Err(AldaError::smf("truncated stream: missing chunk header"));
    }
    let id = [bytes[*pos], bytes[*pos + 1], bytes[*pos + 2], bytes[*pos + 3]];
    let len = u32::from_be_bytes([
        bytes[*pos + 4],
        bytes[*pos + 5],
        bytes[*pos + 6],
        bytes[*pos + 7],
    ]) as usize;
    *pos += 8;
    if bytes.len() < *pos + len {
        return Err(AldaError::smf("truncated stream: chunk body short"));
    }
    let body = &bytes[*pos..*pos + len];
    *pos += len;
    Ok(Chunk { id, body })
}

/// Parse one track body; returns the tick of its End of Track.
fn read_track(
    body: &[u8],
    events: &mut Vec<RawEvent>,
    tempo_ticks: &mut Vec<(u64, u32)>,
) -> Result<u64, AldaError> {
    let mut pos = 0;
    let mut tick = 0u64;
    let mut running_status: Option<u8> = None;

    while pos < body.len() {
        tick += vlq::decode(body, &mut pos)? as u64;

        let mut status = *body
            .get(pos)
            .ok_or_else(|| AldaError::smf("truncated stream: missing status byte"))?;
        if status & 0x80 != 0 {
            pos += 1;
        } else {
            status = running_status
                .ok_or_else(|| AldaError::smf("data byte with no running status"))?;
        }

        match status & 0xF0 {
            0x80 => {
                let (pitch, _velocity) = two_data(body, &mut pos)?;
                events.push(RawEvent::NoteOff {
                    tick,
                    channel: status & 0x0F,
                    pitch,
                });
                running_status = Some(status);
            }
            0x90 => {
                let (pitch, velocity) = two_data(body, &mut pos)?;
                if velocity == 0 {
                    events.push(RawEvent::NoteOff {
                        tick,
                        channel: status & 0x0F,
                        pitch,
                    });
                } else {
                    events.push(RawEvent::NoteOn {
                        tick,
                        channel: status & 0x0F,
                        pitch,
                        velocity,
                    });
                }
                running_status = Some(status);
            }
            0xB0 => {
                let (controller, value) = two_data(body, &mut pos)?;
                events.push(RawEvent::Control {
                    tick,
                    channel: status & 0x0F,
                    controller,
                    value,
                });
                running_status = Some(status);
            }
            0xC0 => {
                let program = one_data(body, &mut pos)?;
                events.push(RawEvent::Program {
                    tick,
                    channel: status & 0x0F,
                    program,
                });
                running_status = Some(status);
            }
            // Aftertouch and pitch bend: recognized lengths, content skipped
            0xA0 | 0xE0 => {
                two_data(body, &mut pos)?;
                running_status = Some(status);
            }
            0xD0 => {
                one_data(body, &mut pos)?;
                running_status = Some(status);
            }
            0xF0 => match status {
                0xFF => {
                    let meta_type = one_data(body, &mut pos)?;
                    let len = vlq::decode(body, &mut pos)? as usize;
                    if body.len() < pos + len {
                        return Err(AldaError::smf("truncated stream: meta event body"));
                    }
                    match meta_type {
                        0x51 => {
                            if len != 3 {
                                return Err(AldaError::smf("bad length for Set Tempo"));
                            }
                            let us = ((body[pos] as u32) << 16)
                                | ((body[pos + 1] as u32) << 8)
                                | body[pos + 2] as u32;
                            tempo_ticks.push((tick, us));
                        }
                        0x2F => return Ok(tick),
                        _ => {}
                    }
                    pos += len;
                    running_status = None;
                }
                0xF0 | 0xF7 => {
                    let len = vlq::decode(body, &mut pos)? as usize;
                    if body.len() < pos + len {
                        return Err(AldaError::smf("truncated stream: sysex body"));
                    }
                    pos += len;
                    running_status = None;
                }
                other => {
                    return Err(AldaError::smf(format!("bad status byte {other:#04x}")));
                }
            },
            _ => return Err(AldaError::smf(format!("bad status byte {status:#04x}"))),
        }
    }

    Ok(tick)
}

fn one_data(body: &[u8], pos: &mut usize) -> Result<u8, AldaError> {
    let byte = *body
        .get(*pos)
        .ok_or_else(|| AldaError::smf("truncated stream: missing data byte"))?;
    *pos += 1;
    Ok(byte)
}

fn two_data(body: &[u8], pos: &mut usize) -> Result<(u8, u8), AldaError> {
    let a = one_data(body, pos)?;
    let b = one_data(body, pos)?;
    Ok((a, b))
}

/// Pair NoteOn/NoteOff per channel and pitch (FIFO) and convert ticks to
/// absolute seconds. An unmatched NoteOn closes at the final tick.
fn pair_events(
    raw_events: &[RawEvent],
    final_tick: u64,
    tempo_map: &TempoMap,
    sequence: &mut MidiSequence,
) {
    let mut open: Vec<(u8, u8, u64, u8)> = Vec::new(); // channel, pitch, tick, velocity

    let close = |sequence: &mut MidiSequence, channel: u8, pitch: u8, on: (u64, u8), off: u64| {
        let start = tempo_map.ticks_to_seconds(on.0);
        let end = tempo_map.ticks_to_seconds(off.max(on.0));
        sequence.notes.push(MidiNote {
            pitch,
            velocity: on.1,
            start,
            duration: end - start,
            channel,
        });
    };

    for event in raw_events {
        match *event {
            RawEvent::NoteOn {
                tick,
                channel,
                pitch,
                velocity,
            } => open.push((channel, pitch, tick, velocity)),
            RawEvent::NoteOff {
                tick,
                channel,
                pitch,
            } => {
                if let Some(i) = open
                    .iter()
                    .position(|&(ch, p, _, _)| ch == channel && p == pitch)
                {
                    let (_, _, on_tick, velocity) = open.remove(i);
                    close(sequence, channel, pitch, (on_tick, velocity), tick);
                }
            }
            RawEvent::Program {
                tick,
                channel,
                program,
            } => sequence.program_changes.push(ProgramChange {
                time: tempo_map.ticks_to_seconds(tick),
                channel,
                program,
            }),
            RawEvent::Control {
                tick,
                channel,
                controller,
                value,
            } => sequence.control_changes.push(ControlChange {
                time: tempo_map.ticks_to_seconds(tick),
                channel,
                controller,
                value,
            }),
        }
    }

    for (channel, pitch, on_tick, velocity) in open {
        close(sequence, channel, pitch, (on_tick, velocity), final_tick);
    }
}
