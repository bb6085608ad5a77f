//! Shared value types for the score pipeline.

pub mod note;
pub mod pitch;

pub use note::{MusicalMoment, Note};
pub use pitch::{midi_to_pitch, pitch_to_midi, Pitch};
