//! Measure layout: walk split moments into fixed 4/4 measures.
//!
//! Per measure and per staff this tracks three pieces of state: whether a
//! beam group is open, the duration it was opened with, and the index of
//! the last emitted rest (so adjacent rests merge into one element instead
//! of piling up). All three reset at each measure start; a rest breaks any
//! open beam group.

use serde::{Deserialize, Serialize};

use crate::models::Note;
use crate::score::duration::is_beamable;
use crate::score::hands::SplitMoment;

/// Complete two-staff score, ready for serialization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Score {
    /// Work title; `None` renders as "Untitled".
    pub title: Option<String>,
    pub ticks_per_quarter: u16,
    pub bpm: u32,
    pub measures: Vec<Measure>,
}

/// One measure of the two-staff score.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Measure {
    /// 1-based measure number.
    pub number: u32,
    pub treble: Vec<MeasureElement>,
    pub bass: Vec<MeasureElement>,
}

/// A rest or chord within one staff of one measure.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum MeasureElement {
    Rest {
        duration: u64,
    },
    Chord {
        /// Members sorted lowest pitch first.
        notes: Vec<Note>,
        duration: u64,
        beam: Option<Beam>,
    },
}

/// Beam state carried by the first note of a chord.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Beam {
    Begin,
    Continue,
    End,
}

impl Beam {
    pub fn as_str(self) -> &'static str {
        match self {
            Beam::Begin => "begin",
            Beam::Continue => "continue",
            Beam::End => "end",
        }
    }
}

/// Per-staff layout state, reset at every measure start.
struct StaffWriter {
    elements: Vec<MeasureElement>,
    beam_active: bool,
    last_duration: u64,
    last_rest: Option<usize>,
}

impl StaffWriter {
    fn new() -> Self {
        Self {
            elements: Vec::new(),
            beam_active: false,
            last_duration: 0,
            last_rest: None,
        }
    }

    /// Emit a rest, merging into the previous rest if no note intervened.
    fn push_rest(&mut self, duration: u64) {
        match self.last_rest {
            Some(index) => {
                if let MeasureElement::Rest { duration: merged } = &mut self.elements[index] {
                    *merged += duration;
                }
            }
            None => {
                self.elements.push(MeasureElement::Rest { duration });
                self.last_rest = Some(self.elements.len() - 1);
            }
        }
    }
}

/// Lay the split moments out into consecutive 4/4 measures.
pub fn lay_out_measures(moments: &[SplitMoment], ticks_per_quarter: u16) -> Vec<Measure> {
    let measure_length = u64::from(ticks_per_quarter) * 4;
    let mut measures = Vec::new();
    let mut current_time: u64 = 0;
    let mut number: u32 = 1;
    let mut index = 0;

    while index < moments.len() {
        let measure_end = current_time + measure_length;
        let mut treble = StaffWriter::new();
        let mut bass = StaffWriter::new();

        while index < moments.len() && moments[index].time_tick < measure_end {
            let moment = &moments[index];

            // Silence before this onset becomes a rest in both staves and
            // breaks any open beam groups.
            if moment.time_tick > current_time {
                let gap = moment.time_tick - current_time;
                treble.push_rest(gap);
                bass.push_rest(gap);
                treble.beam_active = false;
                bass.beam_active = false;
                current_time = moment.time_tick;
            }

            let actual_duration = moment.duration_tick.min(measure_end - moment.time_tick);
            let next = moments.get(index + 1);

            write_staff(
                &mut treble,
                &moment.treble,
                actual_duration,
                next,
                measure_end,
                ticks_per_quarter,
            );
            write_staff(
                &mut bass,
                &moment.bass,
                actual_duration,
                next,
                measure_end,
                ticks_per_quarter,
            );

            current_time = moment.time_tick + actual_duration;
            index += 1;
        }

        // Pad the remainder of the measure with silence.
        if current_time < measure_end {
            let fill = measure_end - current_time;
            treble.push_rest(fill);
            bass.push_rest(fill);
        }

        measures.push(Measure {
            number,
            treble: treble.elements,
            bass: bass.elements,
        });
        current_time = measure_end;
        number += 1;
    }

    measures
}

/// Emit one moment into one staff: a chord if the staff has notes here, a
/// rest otherwise.
fn write_staff(
    staff: &mut StaffWriter,
    notes: &[Note],
    actual_duration: u64,
    next: Option<&SplitMoment>,
    measure_end: u64,
    ticks_per_quarter: u16,
) {
    if notes.is_empty() {
        staff.push_rest(actual_duration);
        staff.beam_active = false;
        return;
    }

    staff.last_rest = None;
    let beam = decide_beam(staff, actual_duration, next, measure_end, ticks_per_quarter);

    let mut chord = notes.to_vec();
    chord.sort_by_key(|note| note.midi_note);
    staff.elements.push(MeasureElement::Chord {
        notes: chord,
        duration: actual_duration,
        beam,
    });
    staff.last_duration = actual_duration;
}

/// Beam decision with one moment of look-ahead.
///
/// A chord continues an open group when its duration matches the duration
/// the group was beamed with; otherwise it would begin a new group. If the
/// look-ahead shows the group cannot extend (no next moment, next moment
/// outside this measure, not beam-eligible, or a different duration), an
/// open group closes with `End` and a would-be group of one gets no beam
/// at all.
fn decide_beam(
    staff: &mut StaffWriter,
    duration: u64,
    next: Option<&SplitMoment>,
    measure_end: u64,
    ticks_per_quarter: u16,
) -> Option<Beam> {
    if !is_beamable(duration, ticks_per_quarter) {
        return None;
    }

    let continuing = staff.beam_active && duration == staff.last_duration;
    staff.beam_active = true;

    let group_continues = next.is_some_and(|moment| {
        moment.time_tick < measure_end
            && is_beamable(moment.duration_tick, ticks_per_quarter)
            && moment.duration_tick == duration
    });

    if group_continues {
        Some(if continuing { Beam::Continue } else { Beam::Begin })
    } else {
        staff.beam_active = false;
        if continuing {
            Some(Beam::End)
        } else {
            None
        }
    }
}
