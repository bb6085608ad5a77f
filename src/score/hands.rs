//! Treble/bass staff assignment.
//!
//! Notes above the treble threshold or below the bass threshold are placed
//! outright; the middle band is assigned by proximity to each staff's
//! average pitch. A balancing pass then narrows any staff wider than a
//! playable hand span, with a hard iteration cap and a drop-and-break
//! escape so pathological clusters cannot oscillate forever.

use log::warn;

use crate::models::{MusicalMoment, Note};

/// Notes strictly above this go to the treble staff outright.
pub const TREBLE_THRESHOLD: u8 = 66;
/// Notes strictly below this go to the bass staff outright.
pub const BASS_THRESHOLD: u8 = 54;
/// Widest allowed staff span in semitones (a ninth).
pub const MAX_HAND_SPAN: u64 = 14;
/// Hard cap on balancing iterations.
pub const MAX_BALANCE_ITERATIONS: usize = 20;

/// Staff assignment for one moment's notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandSplit {
    pub treble: Vec<Note>,
    pub bass: Vec<Note>,
    /// False when balancing hit the iteration cap with a staff still wider
    /// than [`MAX_HAND_SPAN`].
    pub converged: bool,
}

/// A moment with its notes assigned to staves, ready for measure layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMoment {
    pub time_tick: u64,
    pub duration_tick: u64,
    pub treble: Vec<Note>,
    pub bass: Vec<Note>,
    pub converged: bool,
}

/// Split every moment's chord across the two staves.
pub fn split_moments(moments: &[MusicalMoment]) -> Vec<SplitMoment> {
    moments
        .iter()
        .map(|moment| {
            let HandSplit {
                treble,
                bass,
                converged,
            } = split_hands(&moment.notes);
            SplitMoment {
                time_tick: moment.time_tick,
                duration_tick: moment.duration_tick,
                treble,
                bass,
                converged,
            }
        })
        .collect()
}

/// Assign one chord's notes to treble and bass.
pub fn split_hands(notes: &[Note]) -> HandSplit {
    let mut treble: Vec<Note> = notes
        .iter()
        .filter(|n| n.midi_note > TREBLE_THRESHOLD)
        .copied()
        .collect();
    let mut bass: Vec<Note> = notes
        .iter()
        .filter(|n| n.midi_note < BASS_THRESHOLD)
        .copied()
        .collect();

    // Middle-band notes go to whichever staff's average is closer; the
    // averages are taken over the outright sets only, and a tie favors
    // treble.
    let avg_treble = average_pitch(&treble, f64::from(TREBLE_THRESHOLD));
    let avg_bass = average_pitch(&bass, f64::from(BASS_THRESHOLD));
    for note in notes
        .iter()
        .filter(|n| n.midi_note <= TREBLE_THRESHOLD && n.midi_note >= BASS_THRESHOLD)
    {
        let dist_treble = (f64::from(note.midi_note) - avg_treble).abs();
        let dist_bass = (f64::from(note.midi_note) - avg_bass).abs();
        if dist_treble <= dist_bass {
            treble.push(*note);
        } else {
            bass.push(*note);
        }
    }

    enforce_range(treble, bass)
}

/// Narrow staves wider than [`MAX_HAND_SPAN`] by moving the farthest note
/// to the other staff when that brings it closer to home, or dropping it
/// outright when it would not (accepting the loss to guarantee progress).
///
/// Both staff averages are computed once per iteration; the bass check
/// deliberately sees the averages from before any treble move this
/// iteration.
fn enforce_range(mut treble: Vec<Note>, mut bass: Vec<Note>) -> HandSplit {
    for _ in 0..MAX_BALANCE_ITERATIONS {
        let mut changed = false;
        let avg_treble = average_pitch(&treble, f64::from(TREBLE_THRESHOLD));
        let avg_bass = average_pitch(&bass, f64::from(BASS_THRESHOLD));

        if pitch_span(&treble) > MAX_HAND_SPAN {
            let index = farthest_from(&treble, avg_treble);
            let note = treble.remove(index);
            let to_bass = (f64::from(note.midi_note) - avg_bass).abs();
            let to_treble = (f64::from(note.midi_note) - avg_treble).abs();
            if to_bass < to_treble {
                bass.push(note);
                changed = true;
            } else {
                warn!("hand split dropped note {} from treble", note.midi_note);
                break;
            }
        }

        if pitch_span(&bass) > MAX_HAND_SPAN {
            let index = farthest_from(&bass, avg_bass);
            let note = bass.remove(index);
            let to_treble = (f64::from(note.midi_note) - avg_treble).abs();
            let to_bass = (f64::from(note.midi_note) - avg_bass).abs();
            if to_treble < to_bass {
                treble.push(note);
                changed = true;
            } else {
                warn!("hand split dropped note {} from bass", note.midi_note);
                break;
            }
        }

        if !changed {
            break;
        }
    }

    let converged = pitch_span(&treble) <= MAX_HAND_SPAN && pitch_span(&bass) <= MAX_HAND_SPAN;
    if !converged {
        warn!(
            "hand split did not converge: treble span {}, bass span {}",
            pitch_span(&treble),
            pitch_span(&bass)
        );
    }

    HandSplit {
        treble,
        bass,
        converged,
    }
}

fn average_pitch(notes: &[Note], default: f64) -> f64 {
    if notes.is_empty() {
        return default;
    }
    let sum: u64 = notes.iter().map(|n| u64::from(n.midi_note)).sum();
    sum as f64 / notes.len() as f64
}

fn pitch_span(notes: &[Note]) -> u64 {
    let min = notes.iter().map(|n| n.midi_note).min();
    let max = notes.iter().map(|n| n.midi_note).max();
    match (min, max) {
        (Some(min), Some(max)) => u64::from(max - min),
        _ => 0,
    }
}

/// Index of the note farthest from `center`; ties keep the earliest note.
fn farthest_from(notes: &[Note], center: f64) -> usize {
    let mut best_index = 0;
    let mut best_dist = -1.0f64;
    for (index, note) in notes.iter().enumerate() {
        let dist = (f64::from(note.midi_note) - center).abs();
        if dist > best_dist {
            best_index = index;
            best_dist = dist;
        }
    }
    best_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::midi_to_pitch;

    fn note(midi_note: u8) -> Note {
        Note {
            midi_note,
            start_tick: 0,
            duration_tick: 480,
            pitch: midi_to_pitch(midi_note),
        }
    }

    fn keys(notes: &[Note]) -> Vec<u8> {
        notes.iter().map(|n| n.midi_note).collect()
    }

    #[test]
    fn test_outright_thresholds() {
        let split = split_hands(&[note(80), note(40)]);
        assert_eq!(keys(&split.treble), vec![80]);
        assert_eq!(keys(&split.bass), vec![40]);
        assert!(split.converged);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        // 66 and 54 sit in the middle band; 66 ties toward treble, 54 is
        // on top of the bass default.
        let split = split_hands(&[note(66)]);
        assert_eq!(keys(&split.treble), vec![66]);
        let split = split_hands(&[note(54)]);
        assert_eq!(keys(&split.bass), vec![54]);
    }

    #[test]
    fn test_middle_c_tie_goes_to_treble() {
        // With empty outright sets the averages default to 66 and 54;
        // 60 is 6 semitones from both, and the tie favors treble.
        let split = split_hands(&[note(60)]);
        assert_eq!(keys(&split.treble), vec![60]);
        assert!(split.bass.is_empty());
    }

    #[test]
    fn test_middle_assignment_by_proximity() {
        // Treble average 75, bass empty (default 54): 56 joins the bass.
        let split = split_hands(&[note(80), note(70), note(56)]);
        assert_eq!(keys(&split.treble), vec![80, 70]);
        assert_eq!(keys(&split.bass), vec![56]);
        assert!(split.converged);
    }

    #[test]
    fn test_five_note_cluster() {
        // Outright: treble {70, 80} (avg 75), bass {40, 50} (avg 45).
        // 60 is 15 from both averages; the tie sends it to treble. That
        // widens treble to span 20, and balancing evicts 80 (farthest from
        // the new average 70) via the drop path, since 80 is nowhere near
        // the bass.
        let split = split_hands(&[note(40), note(50), note(60), note(70), note(80)]);
        assert_eq!(keys(&split.treble), vec![70, 60]);
        assert_eq!(keys(&split.bass), vec![40, 50]);
        assert!(split.converged);
    }

    #[test]
    fn test_span_enforced_by_drop() {
        // All three land in treble (span 20, average 77.33); 90 is the
        // farthest and moving it toward the empty bass (default 54) brings
        // it no closer, so it is dropped.
        let split = split_hands(&[note(70), note(72), note(90)]);
        assert_eq!(keys(&split.treble), vec![70, 72]);
        assert!(split.bass.is_empty());
        assert!(split.converged);
    }

    #[test]
    fn test_span_enforced_by_move() {
        // Outright bass {30, 31, 53} spans 23; middle 54 joins the treble.
        // Balancing finds 53 farthest from the bass average of 38 and one
        // semitone from the treble average, so it moves up.
        let split = split_hands(&[note(30), note(31), note(53), note(54)]);
        assert_eq!(keys(&split.treble), vec![54, 53]);
        assert_eq!(keys(&split.bass), vec![30, 31]);
        assert!(split.converged);
    }

    #[test]
    fn test_within_limit_bands_left_alone() {
        // Treble span 13 and bass span 14 are both playable; balancing
        // must not touch them.
        let split = split_hands(&[note(67), note(68), note(30), note(44), note(55)]);
        assert_eq!(keys(&split.treble), vec![67, 68, 55]);
        assert_eq!(keys(&split.bass), vec![30, 44]);
        assert!(split.converged);
    }

    #[test]
    fn test_first_max_tie_break() {
        // Two notes equidistant from the center: the earlier one is chosen.
        assert_eq!(farthest_from(&[note(60), note(70)], 65.0), 0);
        assert_eq!(farthest_from(&[note(60), note(70), note(80)], 70.0), 0);
    }

    #[test]
    fn test_empty_moment() {
        let split = split_hands(&[]);
        assert!(split.treble.is_empty());
        assert!(split.bass.is_empty());
        assert!(split.converged);
    }

    #[test]
    fn test_split_moments_carries_timing() {
        let moments = vec![MusicalMoment {
            time_tick: 480,
            duration_tick: 240,
            notes: vec![note(60)],
        }];
        let split = split_moments(&moments);
        assert_eq!(split[0].time_tick, 480);
        assert_eq!(split[0].duration_tick, 240);
        assert_eq!(keys(&split[0].treble), vec![60]);
    }
}
