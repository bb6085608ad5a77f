//! Timing quantization onto the 32nd-note grid.

use crate::models::Note;
use crate::score::notes::min_note_duration;

/// Grid interval in ticks: 1/16 of a quarter note, floored at one tick.
pub fn grid_size(ticks_per_quarter: u16) -> u64 {
    min_note_duration(ticks_per_quarter)
}

/// Snap a tick to the nearest grid multiple (half rounds up).
///
/// Idempotent: a tick already on the grid maps to itself.
pub fn quantize_tick(tick: u64, grid: u64) -> u64 {
    (tick + grid / 2) / grid * grid
}

/// Quantize every note's start and duration; durations are re-floored to
/// the grid minimum so quantization can never produce a zero-length note.
pub fn quantize_notes(notes: &[Note], ticks_per_quarter: u16) -> Vec<Note> {
    let grid = grid_size(ticks_per_quarter);
    notes
        .iter()
        .map(|note| Note {
            start_tick: quantize_tick(note.start_tick, grid),
            duration_tick: quantize_tick(note.duration_tick, grid).max(grid),
            ..*note
        })
        .collect()
}
