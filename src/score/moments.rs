//! Moment building: group quantized notes by onset.

use crate::models::{MusicalMoment, Note};

/// Group notes sharing a quantized start tick into time-ordered moments.
///
/// The grouping sort is stable, so notes at one onset keep their original
/// parse order. A moment's duration is the silence until the next onset;
/// the final moment takes its longest member's duration, since nothing
/// follows it.
pub fn build_moments(notes: &[Note]) -> Vec<MusicalMoment> {
    let mut sorted: Vec<Note> = notes.to_vec();
    sorted.sort_by_key(|note| note.start_tick);

    let mut moments: Vec<MusicalMoment> = Vec::new();
    for note in sorted {
        match moments.last_mut() {
            Some(moment) if moment.time_tick == note.start_tick => moment.notes.push(note),
            _ => moments.push(MusicalMoment {
                time_tick: note.start_tick,
                duration_tick: 0,
                notes: vec![note],
            }),
        }
    }

    for i in 0..moments.len() {
        moments[i].duration_tick = if i + 1 < moments.len() {
            moments[i + 1].time_tick - moments[i].time_tick
        } else {
            moments[i]
                .notes
                .iter()
                .map(|note| note.duration_tick)
                .max()
                .unwrap_or(0)
        };
    }

    moments
}
