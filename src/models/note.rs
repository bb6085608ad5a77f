//! Note and moment value types.

use serde::{Deserialize, Serialize};

use super::pitch::Pitch;

/// A sounding note in tick time, produced when a note-off closes a
/// matching note-on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    /// MIDI note number 0..=127.
    pub midi_note: u8,
    /// Absolute onset in ticks.
    pub start_tick: u64,
    /// Length in ticks; never below the 32nd-note floor.
    pub duration_tick: u64,
    /// Spelled pitch, derived from `midi_note`.
    pub pitch: Pitch,
}

/// All notes sharing one quantized onset tick, treated as a chord.
///
/// The moment's duration is the gap to the next moment, or the longest
/// member note for the final moment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MusicalMoment {
    pub time_tick: u64,
    pub duration_tick: u64,
    /// Members in original parse order.
    pub notes: Vec<Note>,
}
