//! Note assembly: pair note-on/note-off events and track tempo.

use std::collections::HashMap;

use log::info;

use crate::models::{midi_to_pitch, Note};
use crate::smf::{MetaEvent, SmfFile, TrackEventKind};

/// Tempo used when no Set-Tempo meta event is found.
pub const DEFAULT_BPM: u32 = 120;

/// The flat note list recovered from one SMF, plus the tempo in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteStream {
    pub ticks_per_quarter: u16,
    /// Beats per minute from the last Set-Tempo seen, or [`DEFAULT_BPM`].
    pub bpm: u32,
    /// Notes in closing order per track, tracks in file order.
    pub notes: Vec<Note>,
}

/// Shortest representable note: 1/16 of a quarter (a 32nd), floored at one
/// tick for degenerate divisions.
pub fn min_note_duration(ticks_per_quarter: u16) -> u64 {
    (u64::from(ticks_per_quarter) / 16).max(1)
}

/// Pair note-on and note-off events into notes.
///
/// A note-on with velocity > 0 opens (or re-opens, discarding the earlier
/// onset) its pitch; a note-on with velocity 0 or an explicit note-off
/// closes it. Note-ons left open at track end are dropped.
pub fn assemble(smf: &SmfFile) -> NoteStream {
    let min_duration = min_note_duration(smf.ticks_per_quarter);
    let mut notes = Vec::new();
    let mut bpm = DEFAULT_BPM;
    let mut tempo_seen = false;

    for track in &smf.tracks {
        let mut open: HashMap<u8, u64> = HashMap::new();
        for event in &track.events {
            match event.kind {
                TrackEventKind::NoteOn { key, velocity } if velocity > 0 => {
                    open.insert(key, event.tick);
                }
                TrackEventKind::NoteOn { key, .. } | TrackEventKind::NoteOff { key } => {
                    if let Some(start_tick) = open.remove(&key) {
                        notes.push(Note {
                            midi_note: key,
                            start_tick,
                            duration_tick: (event.tick - start_tick).max(min_duration),
                            pitch: midi_to_pitch(key),
                        });
                    }
                }
                TrackEventKind::Meta(MetaEvent::SetTempo(us_per_quarter)) => {
                    if us_per_quarter > 0 {
                        bpm = bpm_from_tempo(us_per_quarter);
                        tempo_seen = true;
                    }
                }
                _ => {}
            }
        }
    }

    info!(
        "assembled {} notes from {} tracks, bpm {} ({})",
        notes.len(),
        smf.tracks.len(),
        bpm,
        if tempo_seen { "from Set-Tempo" } else { "default" }
    );

    NoteStream {
        ticks_per_quarter: smf.ticks_per_quarter,
        bpm,
        notes,
    }
}

/// BPM = round(60,000,000 / µs per quarter).
fn bpm_from_tempo(us_per_quarter: u32) -> u32 {
    (60_000_000 + us_per_quarter / 2) / us_per_quarter
}
