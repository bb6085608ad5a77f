//! Pitch spelling for MusicXML output.

use serde::{Deserialize, Serialize};

/// A spelled pitch: step letter, chromatic alteration, octave.
///
/// Derived deterministically from a MIDI note number; black keys are always
/// spelled as sharps (C#, not Db), matching the engine's C-major output.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pitch {
    /// Step letter, one of C D E F G A B.
    pub step: char,
    /// Semitone alteration: 0 natural, 1 sharp.
    pub alter: i8,
    /// Scientific octave number (C4 = middle C).
    pub octave: i8,
}

/// Step letter and alteration for each pitch class, C..B.
const PITCH_CLASSES: [(char, i8); 12] = [
    ('C', 0),
    ('C', 1),
    ('D', 0),
    ('D', 1),
    ('E', 0),
    ('F', 0),
    ('F', 1),
    ('G', 0),
    ('G', 1),
    ('A', 0),
    ('A', 1),
    ('B', 0),
];

/// Convert a MIDI note number to its spelled pitch.
///
/// MIDI note 0 = C-1, so middle C (60) maps to C4.
pub fn midi_to_pitch(midi_note: u8) -> Pitch {
    let (step, alter) = PITCH_CLASSES[(midi_note % 12) as usize];
    Pitch {
        step,
        alter,
        octave: (midi_note / 12) as i8 - 1,
    }
}

/// Convert a spelled pitch back to a MIDI note number, clamped to 0..=127.
pub fn pitch_to_midi(step: char, alter: i8, octave: i8) -> u8 {
    let base: i16 = match step {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => 0,
    };
    let semi = base + alter as i16 + (octave as i16 + 1) * 12;
    semi.clamp(0, 127) as u8
}
