//! The score pipeline: decoded SMF events in, measure/staff structure out.
//!
//! Each stage is a pure function over the previous stage's output:
//!
//! - **notes**: pair note-on/note-off events into [`crate::models::Note`]s,
//!   track the tempo in effect
//! - **quantize**: snap onsets and durations onto the 32nd-note grid
//! - **moments**: group notes by onset into chords with gap-based spans
//! - **hands**: assign each moment's notes to treble/bass staves
//! - **duration**: classify tick durations as MusicXML note types
//! - **layout**: walk moments into fixed 4/4 measures with rests and beams

pub mod duration;
pub mod hands;
pub mod layout;
pub mod moments;
pub mod notes;
pub mod quantize;

pub use duration::{is_beamable, note_type_for_duration};
pub use hands::{split_hands, split_moments, HandSplit, SplitMoment};
pub use layout::{lay_out_measures, Beam, Measure, MeasureElement, Score};
pub use moments::build_moments;
pub use notes::{assemble, min_note_duration, NoteStream, DEFAULT_BPM};
pub use quantize::{grid_size, quantize_notes, quantize_tick};
