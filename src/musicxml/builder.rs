//! MusicXML string builder.
//!
//! Pretty-printed output: every element on its own line, two-space
//! indentation, no blank lines.

use crate::models::Note;
use crate::score::duration::note_type_for_duration;
use crate::score::layout::Beam;

/// Escape text content for XML.
pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Indentation-tracking buffer for MusicXML documents.
pub struct MusicXmlBuilder {
    buffer: String,
    depth: usize,
}

impl MusicXmlBuilder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
        }
    }

    /// Append one indented line.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str("  ");
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// `<tag>`, increasing depth. `tag` may carry attributes
    /// (`measure number="1"`); pass the bare name to [`Self::close`].
    pub fn open(&mut self, tag: &str) {
        self.line(&format!("<{}>", tag));
        self.depth += 1;
    }

    /// `</tag>`, decreasing depth. The caller closes what it opened.
    pub fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{}>", tag));
    }

    /// `<tag>text</tag>` on one line.
    pub fn leaf(&mut self, tag: &str, text: &str) {
        self.line(&format!("<{}>{}</{}>", tag, text, tag));
    }

    /// `<tag/>`.
    pub fn empty(&mut self, tag: &str) {
        self.line(&format!("<{}/>", tag));
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    /// First-measure attributes: divisions, C major, 4/4, staff clef.
    pub fn write_attributes(&mut self, ticks_per_quarter: u16, clef: Clef) {
        self.open("attributes");
        self.leaf("divisions", &ticks_per_quarter.to_string());
        self.open("key");
        self.leaf("fifths", "0");
        self.close("key");
        self.open("time");
        self.leaf("beats", "4");
        self.leaf("beat-type", "4");
        self.close("time");
        self.open("clef");
        match clef {
            Clef::Treble => {
                self.leaf("sign", "G");
                self.leaf("line", "2");
            }
            Clef::Bass => {
                self.leaf("sign", "F");
                self.leaf("line", "4");
            }
        }
        self.close("clef");
        self.close("attributes");
    }

    /// Tempo marking above the staff.
    pub fn write_tempo_direction(&mut self, bpm: u32) {
        self.open("direction placement=\"above\"");
        self.open("direction-type");
        self.open("metronome");
        self.leaf("beat-unit", "quarter");
        self.leaf("per-minute", &bpm.to_string());
        self.close("metronome");
        self.close("direction-type");
        self.close("direction");
    }

    /// A chord of one or more notes sharing a duration; `<chord/>` marks
    /// every note after the first, and a beam rides on the first note only.
    pub fn write_chord(
        &mut self,
        notes: &[Note],
        duration: u64,
        beam: Option<Beam>,
        ticks_per_quarter: u16,
    ) {
        for (index, note) in notes.iter().enumerate() {
            self.open("note");
            if index > 0 {
                self.empty("chord");
            }
            self.open("pitch");
            self.leaf("step", &note.pitch.step.to_string());
            if note.pitch.alter != 0 {
                self.leaf("alter", &note.pitch.alter.to_string());
            }
            self.leaf("octave", &note.pitch.octave.to_string());
            self.close("pitch");
            self.leaf("duration", &duration.to_string());
            self.leaf("type", note_type_for_duration(duration, ticks_per_quarter));
            if index == 0 {
                if let Some(beam) = beam {
                    self.line(&format!("<beam number=\"1\">{}</beam>", beam.as_str()));
                }
            }
            self.close("note");
        }
    }

    /// A rest of the given duration.
    pub fn write_rest(&mut self, duration: u64, ticks_per_quarter: u16) {
        self.open("note");
        self.empty("rest");
        self.leaf("duration", &duration.to_string());
        self.leaf("type", note_type_for_duration(duration, ticks_per_quarter));
        self.close("note");
    }
}

impl Default for MusicXmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The two staff clefs this engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clef {
    Treble,
    Bass,
}
