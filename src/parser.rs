//! MusicXML import. Reads a single-staff, single-voice line from a
//! `score-partwise` document into a `Score`.
//!
//! Only the first part is read, and within it only staff 1 and the first
//! voice encountered. Chords and grace notes have no place in the layout
//! model and are dropped with a warning.

use roxmltree::{Document, Node};

use crate::duration::{Dots, Duration};
use crate::error::ParseError;
use crate::model::*;
use crate::pitch::{Pitch, Step};

/// Running attributes while walking the measures.
struct PartState {
    divisions: f64,
    clef: Option<Clef>,
    key: Option<KeySignature>,
    time: Option<TimeSignature>,
    tempo: Option<f64>,
    voice: Option<String>,
    dropped: usize,
}

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score, ParseError> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)?;
    let root = doc.root_element();

    if root.tag_name().name() != "score-partwise" {
        return Err(ParseError::Unsupported(format!(
            "root element '{}', only 'score-partwise' is supported",
            root.tag_name().name()
        )));
    }

    let part = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "part")
        .ok_or_else(|| ParseError::Unsupported("document has no <part>".to_string()))?;

    let mut state = PartState {
        divisions: 1.0,
        clef: None,
        key: None,
        time: None,
        tempo: None,
        voice: None,
        dropped: 0,
    };
    let mut elements = Vec::new();

    for measure in part.children().filter(|n| n.is_element() && n.tag_name().name() == "measure") {
        parse_measure(&measure, &mut state, &mut elements)?;
    }

    if state.dropped > 0 {
        log::warn!("MusicXML import dropped {} chord, grace or extra-voice notes", state.dropped);
    }
    log::debug!("parsed MusicXML part '{}': {} elements", part.attribute("id").unwrap_or(""), elements.len());

    Ok(Score {
        elements,
        clef: state.clef.unwrap_or_default(),
        time: state.time.unwrap_or_default(),
        key: state.key.unwrap_or_default(),
        tempo: state.tempo,
    })
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node, state: &mut PartState, elements: &mut Vec<MusicElement>) -> Result<(), ParseError> {
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => parse_attributes(&child, state)?,
            "note" => {
                if let Some(element) = parse_note(&child, state)? {
                    elements.push(element);
                }
            }
            "direction" => {
                for sound in child.descendants().filter(|n| n.tag_name().name() == "sound") {
                    read_tempo(&sound, state);
                }
            }
            "sound" => read_tempo(&child, state),
            _ => {}
        }
    }
    Ok(())
}

fn read_tempo(sound: &Node, state: &mut PartState) {
    if state.tempo.is_some() {
        return;
    }
    if let Some(tempo) = sound.attribute("tempo").and_then(|t| t.trim().parse::<f64>().ok()) {
        state.tempo = Some(tempo);
    }
}

// ─── Attributes ──────────────────────────────────────────────────────

fn parse_attributes(node: &Node, state: &mut PartState) -> Result<(), ParseError> {
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "divisions" => {
                if let Some(d) = parse_f64(&child).filter(|d| *d > 0.0) {
                    state.divisions = d;
                }
            }
            "key" => {
                let fifths = child_i32(&child, "fifths").unwrap_or(0);
                let key = KeySignature::new(fifths);
                match state.key {
                    None => state.key = Some(key),
                    Some(k) if k != key => log::warn!("ignoring key change to {fifths} fifths"),
                    _ => {}
                }
            }
            "time" => {
                let beats = child_i32(&child, "beats").unwrap_or(4);
                let beat_type = child_i32(&child, "beat-type").unwrap_or(4);
                let time = TimeSignature::new(beats.max(0) as u32, beat_type.max(0) as u32);
                if !time.is_valid() {
                    return Err(ParseError::InvalidTimeSignature(format!("{beats}/{beat_type}")));
                }
                match state.time {
                    None => state.time = Some(time),
                    Some(t) if t != time => log::warn!("ignoring time signature change to {time}"),
                    _ => {}
                }
            }
            "clef" => {
                let number = child.attribute("number").and_then(|n| n.parse::<i32>().ok()).unwrap_or(1);
                if number != 1 {
                    continue;
                }
                let sign = child_text(&child, "sign").unwrap_or("G");
                let line = child_i32(&child, "line").unwrap_or(2);
                let octave_change = child_i32(&child, "clef-octave-change").unwrap_or(0);
                let clef = Clef::from_sign(sign, line, octave_change)
                    .ok_or_else(|| ParseError::UnknownClef(format!("{sign} on line {line}")))?;
                match state.clef {
                    None => state.clef = Some(clef),
                    Some(c) if c != clef => log::warn!("ignoring clef change to {clef:?}"),
                    _ => {}
                }
            }
            _ => {}
        }
    }
    Ok(())
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node, state: &mut PartState) -> Result<Option<MusicElement>, ParseError> {
    let has = |name: &str| node.children().any(|n| n.is_element() && n.tag_name().name() == name);

    if has("chord") || has("grace") || has("cue") {
        state.dropped += 1;
        return Ok(None);
    }
    if child_i32(node, "staff").unwrap_or(1) != 1 {
        return Ok(None);
    }
    let voice = child_text(node, "voice").unwrap_or("1").to_string();
    match &state.voice {
        None => state.voice = Some(voice),
        Some(v) if *v != voice => {
            state.dropped += 1;
            return Ok(None);
        }
        _ => {}
    }

    let dots = node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "dot")
        .count();
    let duration = match child_text(node, "type") {
        Some(name) => Duration::from_type_name(name)
            .ok_or_else(|| ParseError::InvalidDuration(name.to_string()))?
            .with_dots(Dots::from_count(dots)),
        // whole-measure rests usually come without a <type>
        None => {
            let divisions = node
                .children()
                .find(|n| n.is_element() && n.tag_name().name() == "duration")
                .and_then(|n| parse_f64(&n))
                .unwrap_or(0.0);
            Duration::new(divisions / state.divisions)
        }
    };

    if has("rest") {
        return Ok(Some(MusicElement::rest(duration)));
    }

    let pitch_node = node
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "pitch")
        .ok_or_else(|| ParseError::InvalidPitch("note without <pitch>".to_string()))?;
    let pitch = parse_pitch(&pitch_node)?;

    let accidental = child_text(node, "accidental").and_then(Accidental::from_musicxml);
    let tied = node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "tie")
        .any(|n| n.attribute("type") == Some("start"));

    Ok(Some(MusicElement::Note(Note {
        pitch,
        duration,
        accidental,
        tied,
    })))
}

fn parse_pitch(node: &Node) -> Result<Pitch, ParseError> {
    let step_text = child_text(node, "step").unwrap_or("");
    let step = step_text
        .chars()
        .next()
        .and_then(Step::from_char)
        .ok_or_else(|| ParseError::InvalidPitch(format!("step '{step_text}'")))?;
    let octave = child_i32(node, "octave")
        .ok_or_else(|| ParseError::InvalidPitch("missing <octave>".to_string()))?;
    let alter = node
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "alter")
        .and_then(|n| parse_f64(&n))
        .map_or(0, |a| a.round() as i32);
    Ok(Pitch::new(step, octave, alter))
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
}

fn child_i32(node: &Node, name: &str) -> Option<i32> {
    child_text(node, name).and_then(|t| t.parse().ok())
}

fn parse_f64(node: &Node) -> Option<f64> {
    node.text().and_then(|t| t.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MELODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Flute</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>2</divisions>
        <key><fifths>1</fifths></key>
        <time><beats>2</beats><beat-type>4</beat-type></time>
        <clef><sign>G</sign><line>2</line></clef>
      </attributes>
      <direction><sound tempo="96"/></direction>
      <note><pitch><step>F</step><alter>1</alter><octave>4</octave></pitch><duration>3</duration><voice>1</voice><type>quarter</type><dot/></note>
      <note><pitch><step>G</step><octave>4</octave></pitch><duration>1</duration><voice>1</voice><type>eighth</type><tie type="start"/></note>
      <note><chord/><pitch><step>B</step><octave>4</octave></pitch><duration>1</duration><voice>1</voice><type>eighth</type></note>
    </measure>
    <measure number="2">
      <note><pitch><step>G</step><octave>4</octave></pitch><duration>2</duration><voice>1</voice><type>quarter</type><tie type="stop"/></note>
      <note><pitch><step>B</step><alter>-1</alter><octave>4</octave></pitch><duration>1</duration><voice>1</voice><type>eighth</type><accidental>flat</accidental></note>
      <note><rest/><duration>1</duration><voice>1</voice><type>eighth</type></note>
    </measure>
    <measure number="3">
      <note><rest measure="yes"/><duration>4</duration><voice>1</voice></note>
    </measure>
  </part>
</score-partwise>"#;

    #[test]
    fn reads_a_single_line() {
        let score = parse_musicxml(MELODY).unwrap();
        assert_eq!(score.clef, Clef::Treble);
        assert_eq!(score.key, KeySignature::new(1));
        assert_eq!(score.time, TimeSignature::new(2, 4));
        assert_eq!(score.tempo, Some(96.0));
        // the chord note is dropped
        assert_eq!(score.elements.len(), 6);

        let first = score.elements[0].as_note().unwrap();
        assert_eq!(first.pitch, Pitch::new(Step::F, 4, 1));
        assert_eq!(first.duration, Duration::quarter().dotted());

        assert!(score.elements[1].as_note().unwrap().tied);
        assert!(!score.elements[2].as_note().unwrap().tied);
        assert_eq!(score.elements[3].as_note().unwrap().accidental, Some(Accidental::Flat));
        assert_eq!(score.elements[4], MusicElement::rest(Duration::eighth()));
        assert_eq!(score.elements[5], MusicElement::rest(Duration::half()));
    }

    #[test]
    fn rejects_timewise_documents() {
        let xml = r#"<score-timewise version="3.1"></score-timewise>"#;
        assert!(matches!(parse_musicxml(xml), Err(ParseError::Unsupported(_))));
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(matches!(parse_musicxml("<score-partwise>"), Err(ParseError::Xml(_))));
    }

    #[test]
    fn octave_transposing_treble_clef() {
        let xml = r#"<score-partwise><part id="P1"><measure number="1">
            <attributes><clef><sign>G</sign><line>2</line><clef-octave-change>-1</clef-octave-change></clef></attributes>
            <note><pitch><step>E</step><octave>3</octave></pitch><duration>1</duration><type>quarter</type></note>
        </measure></part></score-partwise>"#;
        let score = parse_musicxml(xml).unwrap();
        assert_eq!(score.clef, Clef::TrebleOctaveDown);
        assert_eq!(score.elements.len(), 1);
    }
}
