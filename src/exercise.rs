//! Exercise format: the JSON scores persisted by the lesson backend.
//!
//! ```json
//! {
//!   "clef": "treble",
//!   "keySignature": "G",
//!   "timeSignature": "3/4",
//!   "tempo": 90,
//!   "measures": [
//!     { "elements": [
//!       { "type": "note", "duration": "quarter", "pitch": "F#4", "dotted": true },
//!       { "type": "note", "duration": 0.5, "pitch": "G4" },
//!       { "type": "rest", "duration": "quarter" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Measures are flattened into one element sequence; the layout engine
//! derives barlines from the time signature. The accidental shown for a
//! note is whatever its alteration needs against the key signature.

use serde::Deserialize;

use crate::duration::{Dots, Duration};
use crate::error::ParseError;
use crate::model::*;
use crate::pitch::Pitch;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseFile {
    #[serde(default)]
    clef: Option<String>,
    #[serde(default)]
    key_signature: Option<KeyField>,
    #[serde(default)]
    time_signature: Option<TimeField>,
    #[serde(default)]
    tempo: Option<f64>,
    #[serde(default)]
    measures: Vec<MeasureEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyField {
    Fifths(i32),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeField {
    Text(String),
    #[serde(rename_all = "camelCase")]
    Parts { beats: u32, beat_type: u32 },
}

#[derive(Debug, Deserialize)]
struct MeasureEntry {
    #[serde(default)]
    elements: Vec<ElementEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementEntry {
    #[serde(rename = "type")]
    kind: String,
    duration: DurationField,
    #[serde(default)]
    pitch: Option<String>,
    #[serde(default)]
    dotted: bool,
    #[serde(default)]
    double_dotted: bool,
    #[serde(default)]
    tied: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationField {
    Beats(f64),
    Name(String),
}

/// Parse an exercise JSON document into a score.
pub fn parse_exercise(json: &str) -> Result<Score, ParseError> {
    let file: ExerciseFile = serde_json::from_str(json)?;

    let clef = match file.clef.as_deref() {
        Some(name) => Clef::from_name(name).ok_or_else(|| ParseError::UnknownClef(name.to_string()))?,
        None => Clef::default(),
    };
    let key = match file.key_signature {
        Some(field) => parse_key(field)?,
        None => KeySignature::default(),
    };
    let time = match file.time_signature {
        Some(field) => parse_time(field)?,
        None => TimeSignature::default(),
    };

    let mut elements = Vec::new();
    for entry in file.measures.into_iter().flat_map(|m| m.elements) {
        elements.push(parse_element(entry, key)?);
    }

    log::debug!(
        "parsed exercise: {:?} clef, {} key, {} time, {} elements",
        clef,
        key.fifths,
        time,
        elements.len()
    );

    Ok(Score {
        elements,
        clef,
        time,
        key,
        tempo: file.tempo,
    })
}

fn parse_key(field: KeyField) -> Result<KeySignature, ParseError> {
    match field {
        KeyField::Fifths(fifths) if (-7..=7).contains(&fifths) => Ok(KeySignature::new(fifths)),
        KeyField::Fifths(fifths) => Err(ParseError::InvalidKey(fifths.to_string())),
        KeyField::Name(name) => KeySignature::from_name(&name).ok_or(ParseError::InvalidKey(name)),
    }
}

fn parse_time(field: TimeField) -> Result<TimeSignature, ParseError> {
    let (beats, beat_type, text) = match field {
        TimeField::Parts { beats, beat_type } => (beats, beat_type, format!("{beats}/{beat_type}")),
        TimeField::Text(text) => {
            let parsed = text
                .split_once('/')
                .and_then(|(n, d)| Some((n.trim().parse().ok()?, d.trim().parse().ok()?)));
            match parsed {
                Some((n, d)) => (n, d, text),
                None => return Err(ParseError::InvalidTimeSignature(text)),
            }
        }
    };
    let time = TimeSignature::new(beats, beat_type);
    if time.is_valid() {
        Ok(time)
    } else {
        Err(ParseError::InvalidTimeSignature(text))
    }
}

fn parse_duration(field: &DurationField) -> Result<Duration, ParseError> {
    match field {
        DurationField::Beats(beats) => Ok(Duration::new(*beats)),
        DurationField::Name(name) => {
            Duration::from_type_name(name).ok_or_else(|| ParseError::InvalidDuration(name.clone()))
        }
    }
}

fn parse_element(entry: ElementEntry, key: KeySignature) -> Result<MusicElement, ParseError> {
    let dots = if entry.double_dotted {
        Dots::Double
    } else if entry.dotted {
        Dots::Single
    } else {
        Dots::None
    };
    let duration = parse_duration(&entry.duration)?.with_dots(dots);

    match entry.kind.as_str() {
        "note" => {
            let text = entry
                .pitch
                .ok_or_else(|| ParseError::InvalidPitch("(missing)".to_string()))?;
            let pitch: Pitch = text.parse()?;
            Ok(MusicElement::Note(Note {
                pitch,
                duration,
                accidental: Accidental::required(&pitch, key),
                tied: entry.tied,
            }))
        }
        "rest" => Ok(MusicElement::rest(duration)),
        other => Err(ParseError::UnknownElement(other.to_string())),
    }
}
