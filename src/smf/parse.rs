//! SMF chunk and track parsing.
//!
//! Every buffer access is bounds-checked: a track that ends mid-event is a
//! recoverable parse stop (the events decoded so far are kept), not a
//! crash. Only a missing or unusable `MThd` header is fatal.

use log::debug;

use crate::error::{Result, ScoreError};
use crate::smf::event::{read_varint, MetaEvent, TrackEvent, TrackEventKind};

/// Parsed SMF header plus decoded tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmfFile {
    pub format: u16,
    /// Track count claimed by the header; the number actually found may
    /// differ on damaged files.
    pub track_count: u16,
    /// Time resolution in ticks per quarter note.
    pub ticks_per_quarter: u16,
    pub tracks: Vec<Track>,
}

/// One decoded `MTrk` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub events: Vec<TrackEvent>,
}

const HEADER_LEN: usize = 14;

fn be_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Parse an SMF byte buffer into header fields and decoded tracks.
///
/// Scans for `MTrk` tags after the header, skipping unknown bytes, the way
/// a forgiving reader walks damaged files.
pub fn parse_smf(data: &[u8]) -> Result<SmfFile> {
    if data.len() < HEADER_LEN || &data[0..4] != b"MThd" {
        return Err(ScoreError::Format("missing MThd header".into()));
    }

    let format = be_u16(data, 8);
    let track_count = be_u16(data, 10);
    let division = be_u16(data, 12);
    if division & 0x8000 != 0 {
        return Err(ScoreError::Format(format!(
            "SMPTE division {:#06x} not supported",
            division
        )));
    }
    if division == 0 {
        return Err(ScoreError::Format("division of zero ticks per quarter".into()));
    }

    let mut tracks = Vec::new();
    let mut offset = HEADER_LEN;
    while offset < data.len() {
        if data.len() - offset >= 8 && &data[offset..offset + 4] == b"MTrk" {
            let length = be_u32(data, offset + 4) as usize;
            let body_start = offset + 8;
            let (track, stopped_at) =
                parse_track(data, body_start, body_start.saturating_add(length));
            debug!(
                "parsed MTrk at {}: {} events, stopped at {}",
                offset,
                track.events.len(),
                stopped_at
            );
            tracks.push(track);
            offset = stopped_at.max(body_start);
        } else {
            offset += 1;
        }
    }

    Ok(SmfFile {
        format,
        track_count,
        ticks_per_quarter: division,
        tracks,
    })
}

/// Parse one track body in `start..track_end`.
///
/// `track_end` may lie past the buffer on truncated files; every read is
/// still checked against the real buffer length. Returns the decoded track
/// and the offset where parsing stopped, so the chunk scan can resume.
fn parse_track(data: &[u8], start: usize, track_end: usize) -> (Track, usize) {
    let mut events = Vec::new();
    let mut offset = start;
    let mut current_tick: u64 = 0;
    // Running status register: a data byte with the high bit clear reuses
    // the previous status.
    let mut running_status: u8 = 0;

    while offset < track_end {
        let (delta, next) = read_varint(data, offset);
        offset = next;
        current_tick += u64::from(delta);

        if offset >= data.len() {
            break;
        }
        if data[offset] & 0x80 != 0 {
            running_status = data[offset];
            offset += 1;
        }

        match running_status {
            0x80..=0xEF => {
                let Some((kind, width)) = decode_channel_event(data, offset, running_status)
                else {
                    break;
                };
                offset += width;
                events.push(TrackEvent {
                    tick: current_tick,
                    kind,
                });
            }
            0xFF => {
                if offset >= data.len() {
                    break;
                }
                let meta_type = data[offset];
                offset += 1;
                let (length, next) = read_varint(data, offset);
                offset = next;
                let meta = if meta_type == 0x51 && length == 3 && offset + 3 <= data.len() {
                    let us_per_quarter = u32::from(data[offset]) << 16
                        | u32::from(data[offset + 1]) << 8
                        | u32::from(data[offset + 2]);
                    MetaEvent::SetTempo(us_per_quarter)
                } else {
                    MetaEvent::Other { meta_type, length }
                };
                events.push(TrackEvent {
                    tick: current_tick,
                    kind: TrackEventKind::Meta(meta),
                });
                offset = offset.saturating_add(length as usize);
            }
            0xF0 | 0xF7 => {
                let (length, next) = read_varint(data, offset);
                offset = next.saturating_add(length as usize);
                events.push(TrackEvent {
                    tick: current_tick,
                    kind: TrackEventKind::SysEx { length },
                });
            }
            // No status seen yet and not a status byte: skip.
            _ => {
                offset += 1;
            }
        }
    }

    (Track { events }, offset)
}

/// Decode one channel event at `offset`, returning the event and the data
/// width consumed. `None` means the buffer ended mid-event.
fn decode_channel_event(data: &[u8], offset: usize, status: u8) -> Option<(TrackEventKind, usize)> {
    match status & 0xF0 {
        0x90 => {
            if offset + 2 > data.len() {
                return None;
            }
            Some((
                TrackEventKind::NoteOn {
                    key: data[offset],
                    velocity: data[offset + 1],
                },
                2,
            ))
        }
        0x80 => {
            if offset + 2 > data.len() {
                return None;
            }
            Some((TrackEventKind::NoteOff { key: data[offset] }, 2))
        }
        0xA0 => {
            if offset + 2 > data.len() {
                return None;
            }
            Some((
                TrackEventKind::PolyPressure {
                    key: data[offset],
                    value: data[offset + 1],
                },
                2,
            ))
        }
        0xB0 => {
            if offset + 2 > data.len() {
                return None;
            }
            Some((
                TrackEventKind::ControlChange {
                    controller: data[offset],
                    value: data[offset + 1],
                },
                2,
            ))
        }
        0xE0 => {
            if offset + 2 > data.len() {
                return None;
            }
            Some((
                TrackEventKind::PitchBend {
                    lsb: data[offset],
                    msb: data[offset + 1],
                },
                2,
            ))
        }
        0xC0 => {
            if offset + 1 > data.len() {
                return None;
            }
            Some((
                TrackEventKind::ProgramChange {
                    program: data[offset],
                },
                1,
            ))
        }
        0xD0 => {
            if offset + 1 > data.len() {
                return None;
            }
            Some((
                TrackEventKind::ChannelPressure {
                    value: data[offset],
                },
                1,
            ))
        }
        _ => unreachable!("status {status:#04x} outside channel event range"),
    }
}
