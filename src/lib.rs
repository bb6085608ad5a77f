//! MIDI-to-score engine.
//!
//! Converts a Standard MIDI File byte buffer into a two-staff piano score
//! emitted as a MusicXML 3.1 `score-partwise` document. The pipeline is a
//! chain of pure transforms:
//!
//! 1. parse SMF chunks into decoded track events ([`smf`])
//! 2. pair note-on/note-off events into notes, track tempo ([`score::notes`])
//! 3. quantize timing onto a 32nd-note grid ([`score::quantize`])
//! 4. group notes by onset into moments ([`score::moments`])
//! 5. assign each moment to treble/bass staves ([`score::hands`])
//! 6. lay moments out into 4/4 measures ([`score::layout`])
//! 7. serialize the measure model to MusicXML ([`musicxml`])
//!
//! Everything is synchronous and CPU-bound; the only I/O is the optional
//! file read/write in [`convert_midi_file`].

pub mod error;
pub mod models;
pub mod musicxml;
pub mod score;
pub mod smf;

use std::fs;
use std::path::Path;

use log::info;

pub use error::{Result, ScoreError};
use score::Score;

/// Convert SMF bytes to a MusicXML document with the default title.
pub fn convert(midi_bytes: &[u8]) -> Result<String> {
    convert_with_title(midi_bytes, None)
}

/// Convert SMF bytes to a MusicXML document.
///
/// Fails with [`ScoreError::Format`] on an unreadable header and with
/// [`ScoreError::EmptyScore`] when no notes could be decoded; truncated
/// track data is tolerated and converted as far as it goes.
pub fn convert_with_title(midi_bytes: &[u8], title: Option<&str>) -> Result<String> {
    let score = build_score(midi_bytes, title)?;
    Ok(musicxml::emit_musicxml(&score))
}

/// Run the pipeline up to the measure model, without serializing.
pub fn build_score(midi_bytes: &[u8], title: Option<&str>) -> Result<Score> {
    let smf = smf::parse_smf(midi_bytes)?;
    let stream = score::assemble(&smf);
    if stream.notes.is_empty() {
        return Err(ScoreError::EmptyScore);
    }

    let quantized = score::quantize_notes(&stream.notes, stream.ticks_per_quarter);
    let moments = score::build_moments(&quantized);
    let split = score::split_moments(&moments);
    let measures = score::lay_out_measures(&split, stream.ticks_per_quarter);

    Ok(Score {
        title: title.map(str::to_owned),
        ticks_per_quarter: stream.ticks_per_quarter,
        bpm: stream.bpm,
        measures,
    })
}

/// Convert a MIDI file on disk to a MusicXML file.
pub fn convert_midi_file(input: &Path, output: &Path, title: Option<&str>) -> Result<()> {
    info!("converting {} to {}", input.display(), output.display());
    let midi_bytes = fs::read(input)?;
    let converted = build_score(&midi_bytes, title)?;
    musicxml::write_musicxml_file(&converted, output)?;
    Ok(())
}
