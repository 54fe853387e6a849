//! Integration tests: import exercise JSON, MusicXML and MXL documents
//! and lay them out.

use std::io::{Cursor, Write};

use pretty_assertions::assert_eq;
use stafflayout::layout::barlines::BarlineKind;
use stafflayout::layout::stems::StemDirection;
use stafflayout::*;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const EXERCISE: &str = r#"{
    "clef": "treble",
    "keySignature": 1,
    "timeSignature": { "beats": 2, "beatType": 4 },
    "tempo": 60,
    "measures": [
        { "elements": [
            { "type": "note", "duration": "eighth", "pitch": "D5" },
            { "type": "note", "duration": "eighth", "pitch": "B4" },
            { "type": "note", "duration": "quarter", "pitch": "F#5", "tied": true }
        ] },
        { "elements": [
            { "type": "note", "duration": 1, "pitch": "F#5" },
            { "type": "rest", "duration": "quarter" }
        ] }
    ]
}"#;

const MUSICXML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="4.0">
  <part-list><score-part id="P1"><part-name>Cello</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>4</divisions>
        <key><fifths>-1</fifths></key>
        <time><beats>3</beats><beat-type>4</beat-type></time>
        <clef><sign>F</sign><line>4</line></clef>
      </attributes>
      <note><pitch><step>E</step><octave>2</octave></pitch><duration>2</duration><voice>1</voice><type>eighth</type></note>
      <note><pitch><step>A</step><octave>2</octave></pitch><duration>2</duration><voice>1</voice><type>eighth</type></note>
      <note><pitch><step>C</step><octave>3</octave></pitch><duration>8</duration><voice>1</voice><type>half</type></note>
    </measure>
    <measure number="2">
      <note><pitch><step>B</step><alter>-1</alter><octave>2</octave></pitch><duration>4</duration><voice>1</voice><type>quarter</type></note>
      <note><rest/><duration>8</duration><voice>1</voice><type>half</type></note>
    </measure>
  </part>
</score-partwise>"#;

const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container>
  <rootfiles>
    <rootfile full-path="score/cello.musicxml" media-type="application/vnd.recordare.musicxml+xml"/>
  </rootfiles>
</container>"#;

fn build_mxl(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ─── Exercise JSON ──────────────────────────────────────────────────

#[test]
fn exercise_json_lays_out_end_to_end() {
    let layout = layout_bytes(EXERCISE.as_bytes(), Some("json")).unwrap();

    assert_eq!(layout.clef, Clef::Treble);
    assert_eq!(layout.time, TimeSignature::new(2, 4));
    assert_eq!(layout.key_signature.len(), 1);
    assert_eq!(layout.records.len(), 5);

    // D5 and B4 average above the middle line
    assert_eq!(layout.beam_groups.len(), 1);
    assert_eq!(layout.beam_groups[0].members, vec![0, 1]);
    assert_eq!(layout.beam_groups[0].direction, StemDirection::Down);

    // F#5 is in the key, so it carries no accidental
    assert_eq!(layout.records[2].accidental, None);
    assert_eq!(layout.records[2].tie.unwrap().to, Some(3));

    let marks: Vec<(usize, BarlineKind)> = layout.barlines.iter().map(|b| (b.after_index, b.kind)).collect();
    assert_eq!(marks, vec![(2, BarlineKind::Regular), (4, BarlineKind::Final)]);
}

#[test]
fn exercise_timemap_merges_the_tie() {
    let score = parse_bytes(EXERCISE.as_bytes(), None).unwrap();
    let events = generate_timemap(&score).unwrap();

    let summary: Vec<(usize, i32, f64, f64)> = events
        .iter()
        .map(|e| (e.element_index, e.midi, e.start_ms, e.duration_ms))
        .collect();
    assert_eq!(
        summary,
        vec![(0, 74, 0.0, 500.0), (1, 71, 500.0, 500.0), (2, 78, 1000.0, 2000.0)]
    );
}

// ─── MusicXML ───────────────────────────────────────────────────────

#[test]
fn musicxml_lays_out_end_to_end() {
    let score = parse_bytes(MUSICXML.as_bytes(), Some("musicxml")).unwrap();
    assert_eq!(score.clef, Clef::Bass);
    assert_eq!(score.key, KeySignature::new(-1));
    assert_eq!(score.elements.len(), 5);

    let layout = layout_score(&score).unwrap();
    let steps: Vec<Option<i32>> = layout.records.iter().map(|r| r.staff_step).collect();
    // E2 A2 C3 Bb2, rest
    assert_eq!(steps, vec![Some(0), Some(3), Some(5), Some(4), None]);
    assert_eq!(layout.records[0].ledger_lines, vec![0]);

    assert_eq!(layout.beam_groups.len(), 1);
    assert_eq!(layout.beam_groups[0].members, vec![0, 1]);
    assert_eq!(layout.beam_groups[0].direction, StemDirection::Up);

    // Bb2 is flat in the key
    assert_eq!(layout.records[3].accidental, None);
    assert_eq!(layout.measure_count(), 2);
}

#[test]
fn sniffed_xml_matches_the_hinted_parse() {
    let hinted = parse_bytes(MUSICXML.as_bytes(), Some("xml")).unwrap();
    let sniffed = parse_bytes(MUSICXML.as_bytes(), None).unwrap();
    assert_eq!(hinted, sniffed);
}

// ─── MXL ────────────────────────────────────────────────────────────

#[test]
fn mxl_with_container_uses_the_rootfile() {
    let data = build_mxl(&[
        ("META-INF/container.xml", CONTAINER),
        ("score/cello.musicxml", MUSICXML),
        ("score/notes.xml", "<not-a-score/>"),
    ]);
    let from_mxl = parse_mxl(&data).unwrap();
    let from_xml = parse_musicxml(MUSICXML).unwrap();
    assert_eq!(from_mxl, from_xml);

    // no hint: not text that starts like JSON or XML, so the archive is tried
    assert_eq!(parse_bytes(&data, None).unwrap(), from_xml);
}

#[test]
fn mxl_without_container_falls_back_to_the_first_score_file() {
    let data = build_mxl(&[("cello.musicxml", MUSICXML)]);
    let layout = layout_bytes(&data, Some("mxl")).unwrap();
    assert_eq!(layout.records.len(), 5);
}

#[test]
fn mxl_without_a_score_is_rejected() {
    let data = build_mxl(&[("readme.txt", "nothing here")]);
    assert!(matches!(parse_mxl(&data), Err(ParseError::Unsupported(_))));
}

// ─── Errors ─────────────────────────────────────────────────────────

#[test]
fn parse_and_layout_errors_are_distinguished() {
    let bad_json = layout_bytes(b"{ \"clef\": 3 }", Some("json")).unwrap_err();
    assert!(matches!(bad_json, Error::Parse(ParseError::Json(_))));

    let zero_duration = br#"{ "measures": [ { "elements": [ { "type": "rest", "duration": 0 } ] } ] }"#;
    match layout_bytes(zero_duration, Some("json")).unwrap_err() {
        Error::Layout(err) => {
            assert_eq!(err.kind, LayoutErrorKind::InvalidDuration);
            assert_eq!(err.element_index, Some(0));
        }
        other => panic!("expected a layout error, got {other}"),
    }
}

#[test]
fn layout_json_carries_the_records() {
    let json = layout_bytes_to_json(EXERCISE.as_bytes(), Some("json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["records"].as_array().unwrap().len(), 5);
    assert_eq!(value["beam_groups"][0]["direction"], "down");
    assert_eq!(value["barlines"][1]["kind"], "final");
}
