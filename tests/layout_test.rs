//! Measure layout integration tests: artificial note streams through the
//! moment/hand/layout stages, validated structurally on the emitted XML.

use scorify::models::{midi_to_pitch, Note};
use scorify::musicxml::emit_musicxml;
use scorify::score::{
    build_moments, lay_out_measures, min_note_duration, quantize_notes, split_moments, Score,
};

const TPQ: u16 = 480;
const MEASURE: u64 = TPQ as u64 * 4;

fn note(midi_note: u8, start_tick: u64, duration_tick: u64) -> Note {
    Note {
        midi_note,
        start_tick,
        duration_tick,
        pitch: midi_to_pitch(midi_note),
    }
}

fn score_from_notes(notes: &[Note]) -> Score {
    let quantized = quantize_notes(notes, TPQ);
    let moments = build_moments(&quantized);
    let split = split_moments(&moments);
    Score {
        title: None,
        ticks_per_quarter: TPQ,
        bpm: 120,
        measures: lay_out_measures(&split, TPQ),
    }
}

fn parse(xml: &str) -> roxmltree::Document {
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    roxmltree::Document::parse_with_options(xml, opts).unwrap()
}

fn has_child(node: roxmltree::Node, tag: &str) -> bool {
    node.children().any(|c| c.has_tag_name(tag))
}

fn child_text<'a>(node: roxmltree::Node<'a, 'a>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
}

/// Sum of durations in one measure of one part, counting each chord once
/// (trailing chord notes repeat the duration of the first).
fn measure_duration_sum(measure: roxmltree::Node) -> u64 {
    measure
        .children()
        .filter(|n| n.has_tag_name("note") && !has_child(*n, "chord"))
        .map(|n| child_text(n, "duration").unwrap().parse::<u64>().unwrap())
        .sum()
}

#[test]
fn test_every_measure_sums_to_four_quarters() {
    // A meandering stream crossing three measures, both staves active.
    let notes = vec![
        note(72, 0, 480),
        note(40, 0, 960),
        note(76, 490, 230),
        note(74, 720, 240),
        note(45, 960, 480),
        note(72, 1900, 500),
        note(41, 2400, 1920),
        note(79, 4000, 300),
    ];
    let score = score_from_notes(&notes);
    let xml = emit_musicxml(&score);
    let doc = parse(&xml);

    let mut measure_count = 0;
    for part in doc.descendants().filter(|n| n.has_tag_name("part")) {
        for measure in part.children().filter(|n| n.has_tag_name("measure")) {
            measure_count += 1;
            assert_eq!(
                measure_duration_sum(measure),
                MEASURE,
                "measure {:?} in part {:?} does not fill 4/4",
                measure.attribute("number"),
                part.attribute("id")
            );
        }
    }
    // Same number of measures in each part.
    assert_eq!(measure_count % 2, 0);
    assert!(measure_count >= 6);
}

#[test]
fn test_parts_have_identical_measure_numbers() {
    let notes = vec![note(72, 0, 480), note(74, 2400, 480), note(40, 4000, 480)];
    let xml = emit_musicxml(&score_from_notes(&notes));
    let doc = parse(&xml);

    let numbers: Vec<Vec<String>> = doc
        .descendants()
        .filter(|n| n.has_tag_name("part"))
        .map(|part| {
            part.children()
                .filter(|n| n.has_tag_name("measure"))
                .map(|m| m.attribute("number").unwrap().to_string())
                .collect()
        })
        .collect();
    assert_eq!(numbers.len(), 2);
    assert_eq!(numbers[0], numbers[1]);
    assert_eq!(numbers[0][0], "1");
}

#[test]
fn test_beam_run_is_begin_continue_end() {
    // Four eighths in a row on the treble staff.
    let notes = vec![
        note(72, 0, 240),
        note(74, 240, 240),
        note(76, 480, 240),
        note(77, 720, 240),
    ];
    let xml = emit_musicxml(&score_from_notes(&notes));
    let doc = parse(&xml);

    let beams: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("beam"))
        .map(|n| n.text().unwrap())
        .collect();
    // The last eighth's moment keeps its own duration (240), so it still
    // reads as part of the run.
    assert_eq!(beams, vec!["begin", "continue", "continue", "end"]);
}

#[test]
fn test_beamed_run_interrupted_by_quarter() {
    let notes = vec![
        note(72, 0, 240),
        note(74, 240, 240),
        note(76, 480, 480),
        note(77, 960, 240),
    ];
    let xml = emit_musicxml(&score_from_notes(&notes));
    let doc = parse(&xml);
    let beams: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("beam"))
        .map(|n| n.text().unwrap())
        .collect();
    // Two eighths beam; the quarter cannot; the final eighth stands alone
    // and gets no marking at all.
    assert_eq!(beams, vec!["begin", "end"]);
}

#[test]
fn test_silent_staff_is_single_merged_rest() {
    // Treble-only content: every bass measure must be exactly one rest.
    let notes = vec![note(72, 0, 480), note(74, 480, 480), note(76, 2400, 480)];
    let xml = emit_musicxml(&score_from_notes(&notes));
    let doc = parse(&xml);

    let bass = doc
        .descendants()
        .find(|n| n.has_tag_name("part") && n.attribute("id") == Some("P2"))
        .unwrap();
    for measure in bass.children().filter(|n| n.has_tag_name("measure")) {
        let rests: Vec<_> = measure
            .children()
            .filter(|n| n.has_tag_name("note"))
            .collect();
        assert_eq!(rests.len(), 1, "bass measure should hold one merged rest");
        assert!(has_child(rests[0], "rest"));
        assert_eq!(child_text(rests[0], "duration"), Some("1920"));
    }
}

#[test]
fn test_quantization_tidies_ragged_timing() {
    // Starts and durations a few ticks off the grid: the layout still
    // produces exact 4/4 measures (the sum property would fail otherwise).
    let notes = vec![
        note(72, 3, 477),
        note(74, 482, 230),
        note(76, 725, 236),
    ];
    let quantized = quantize_notes(&notes, TPQ);
    let grid = min_note_duration(TPQ);
    for q in &quantized {
        assert_eq!(q.start_tick % grid, 0);
        assert_eq!(q.duration_tick % grid, 0);
        assert!(q.duration_tick >= grid);
    }

    let xml = emit_musicxml(&score_from_notes(&notes));
    let doc = parse(&xml);
    for measure in doc.descendants().filter(|n| n.has_tag_name("measure")) {
        assert_eq!(measure_duration_sum(measure), MEASURE);
    }
}

#[test]
fn test_long_note_clipped_at_measure_boundary() {
    // A whole-measure-length note starting on beat 3 is clipped to the two
    // beats that fit.
    let notes = vec![note(72, 960, 1920)];
    let score = score_from_notes(&notes);
    let xml = emit_musicxml(&score);
    let doc = parse(&xml);

    let treble = doc
        .descendants()
        .find(|n| n.has_tag_name("part") && n.attribute("id") == Some("P1"))
        .unwrap();
    let measures: Vec<_> = treble
        .children()
        .filter(|n| n.has_tag_name("measure"))
        .collect();
    assert_eq!(measures.len(), 1);
    let pitched: Vec<_> = measures[0]
        .children()
        .filter(|n| n.has_tag_name("note") && has_child(*n, "pitch"))
        .collect();
    assert_eq!(child_text(pitched[0], "duration"), Some("960"));
    assert_eq!(child_text(pitched[0], "type"), Some("half"));
}

#[test]
fn test_chords_emit_lowest_pitch_first() {
    let notes = vec![
        note(79, 0, 480),
        note(72, 0, 480),
        note(76, 0, 480),
    ];
    let xml = emit_musicxml(&score_from_notes(&notes));
    let doc = parse(&xml);
    let steps: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("pitch"))
        .map(|p| child_text(p, "step").unwrap())
        .collect();
    assert_eq!(steps, vec!["C", "E", "G"]);
}
