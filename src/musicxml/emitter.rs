//! MusicXML document emitter.
//!
//! Consumes the laid-out score model and emits a complete `score-partwise`
//! document: work title, part list (P1 treble, P2 bass), then one `part`
//! per staff with identical measure numbering.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::musicxml::builder::{xml_escape, Clef, MusicXmlBuilder};
use crate::score::layout::{MeasureElement, Score};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const DOCTYPE: &str = "<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \"http://www.musicxml.org/dtds/partwise.dtd\">";

/// Serialize a score into a MusicXML 3.1 document string.
pub fn emit_musicxml(score: &Score) -> String {
    let mut builder = MusicXmlBuilder::new();
    builder.line(XML_DECLARATION);
    builder.line(DOCTYPE);
    builder.open("score-partwise version=\"3.1\"");

    builder.open("work");
    builder.leaf(
        "work-title",
        &xml_escape(score.title.as_deref().unwrap_or("Untitled")),
    );
    builder.close("work");

    builder.open("part-list");
    for part_id in ["P1", "P2"] {
        builder.open(&format!("score-part id=\"{}\"", part_id));
        builder.empty("part-name");
        builder.close("score-part");
    }
    builder.close("part-list");

    emit_part(&mut builder, score, "P1", Staff::Treble);
    emit_part(&mut builder, score, "P2", Staff::Bass);

    builder.close("score-partwise");

    let xml = builder.finish();
    info!(
        "emitted musicxml: {} measures, {} bytes",
        score.measures.len(),
        xml.len()
    );
    xml
}

/// Write the document for `score` to `path`.
pub fn write_musicxml_file(score: &Score, path: &Path) -> Result<()> {
    let xml = emit_musicxml(score);
    fs::write(path, &xml)?;
    info!("wrote {} bytes to {}", xml.len(), path.display());
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Staff {
    Treble,
    Bass,
}

fn emit_part(builder: &mut MusicXmlBuilder, score: &Score, part_id: &str, staff: Staff) {
    builder.open(&format!("part id=\"{}\"", part_id));

    for measure in &score.measures {
        builder.open(&format!("measure number=\"{}\"", measure.number));

        // Attributes and (treble only) the tempo marking lead measure 1.
        if measure.number == 1 {
            match staff {
                Staff::Treble => {
                    builder.write_attributes(score.ticks_per_quarter, Clef::Treble);
                    builder.write_tempo_direction(score.bpm);
                }
                Staff::Bass => builder.write_attributes(score.ticks_per_quarter, Clef::Bass),
            }
        }

        let elements = match staff {
            Staff::Treble => &measure.treble,
            Staff::Bass => &measure.bass,
        };
        for element in elements {
            match element {
                MeasureElement::Rest { duration } => {
                    builder.write_rest(*duration, score.ticks_per_quarter);
                }
                MeasureElement::Chord {
                    notes,
                    duration,
                    beam,
                } => {
                    builder.write_chord(notes, *duration, *beam, score.ticks_per_quarter);
                }
            }
        }

        builder.close("measure");
    }

    builder.close("part");
}
