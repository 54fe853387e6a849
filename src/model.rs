//! Data model for a single-staff exercise score.
//!
//! A `Score` is an immutable value: callers rebuild it on every edit and
//! hand it to the layout engine again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::pitch::{Pitch, Step};

/// Clef of the staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
    /// Treble clef sounding an octave lower (guitar)
    TrebleOctaveDown,
}

impl Clef {
    /// Pitch mapped to staff step 0. Each anchor puts the bottom staff
    /// line on step 2.
    pub fn anchor(self) -> (Step, i32) {
        match self {
            Clef::Treble => (Step::C, 4),
            Clef::Bass => (Step::E, 2),
            Clef::Alto => (Step::D, 3),
            Clef::Tenor => (Step::B, 2),
            Clef::TrebleOctaveDown => (Step::C, 3),
        }
    }

    /// Map a MusicXML `<clef>` (sign, line, octave change) to a clef.
    pub fn from_sign(sign: &str, line: i32, octave_change: i32) -> Option<Clef> {
        match (sign, line, octave_change) {
            ("G", 2, 0) => Some(Clef::Treble),
            ("G", 2, -1) => Some(Clef::TrebleOctaveDown),
            ("F", 4, 0) => Some(Clef::Bass),
            ("C", 3, 0) => Some(Clef::Alto),
            ("C", 4, 0) => Some(Clef::Tenor),
            _ => None,
        }
    }

    /// Map an exercise-format clef name.
    pub fn from_name(name: &str) -> Option<Clef> {
        match name.trim().to_ascii_lowercase().as_str() {
            "treble" | "g" => Some(Clef::Treble),
            "bass" | "f" => Some(Clef::Bass),
            "alto" => Some(Clef::Alto),
            "tenor" => Some(Clef::Tenor),
            "treble8vb" | "treble-8vb" | "treble_8vb" | "treble-octave-down" => {
                Some(Clef::TrebleOctaveDown)
            }
            _ => None,
        }
    }
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: u32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: u32,
}

impl TimeSignature {
    pub fn new(beats: u32, beat_type: u32) -> Self {
        Self { beats, beat_type }
    }

    pub fn is_valid(&self) -> bool {
        self.beats > 0 && self.beat_type > 0
    }

    /// Measure length in quarter-note beats (6/8 = 3.0, 5/8 = 2.5).
    pub fn beats_per_measure(&self) -> f64 {
        self.beats as f64 * 4.0 / self.beat_type as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_type)
    }
}

/// Key signature as a position on the circle of fifths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeySignature {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
}

impl KeySignature {
    pub const SHARP_ORDER: [Step; 7] = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E, Step::B];
    pub const FLAT_ORDER: [Step; 7] = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C, Step::F];

    pub fn new(fifths: i32) -> Self {
        Self { fifths }
    }

    /// Alteration the key applies to a diatonic step.
    pub fn alter_for(&self, step: Step) -> i32 {
        let count = self.fifths.unsigned_abs().min(7) as usize;
        if self.fifths > 0 && Self::SHARP_ORDER[..count].contains(&step) {
            1
        } else if self.fifths < 0 && Self::FLAT_ORDER[..count].contains(&step) {
            -1
        } else {
            0
        }
    }

    /// Major or minor key name (`G`, `Bb`, `F#m`, `Ebm`) to fifths.
    pub fn from_name(name: &str) -> Option<KeySignature> {
        const MAJOR: [&str; 15] = [
            "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
        ];
        const MINOR: [&str; 15] = [
            "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
        ];
        let name = name.trim();
        let (tonic, table) = match name.strip_suffix('m') {
            Some(t) => (t, &MINOR),
            None => (name, &MAJOR),
        };
        table
            .iter()
            .position(|k| *k == tonic)
            .map(|i| KeySignature::new(i as i32 - 7))
    }
}

/// Accidental drawn in front of a notehead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    pub fn from_alter(alter: i32) -> Option<Accidental> {
        match alter {
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    /// MusicXML `<accidental>` text.
    pub fn from_musicxml(text: &str) -> Option<Accidental> {
        match text.trim() {
            "flat-flat" | "double-flat" => Some(Accidental::DoubleFlat),
            "flat" => Some(Accidental::Flat),
            "natural" => Some(Accidental::Natural),
            "sharp" => Some(Accidental::Sharp),
            "double-sharp" | "sharp-sharp" => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    /// Accidental needed to spell `pitch` under `key`, or `None` when the
    /// key signature already implies it.
    pub fn required(pitch: &Pitch, key: KeySignature) -> Option<Accidental> {
        if pitch.alter == key.alter_for(pitch.step) {
            None
        } else {
            Accidental::from_alter(pitch.alter)
        }
    }
}

/// A pitched note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub duration: Duration,
    #[serde(default)]
    pub accidental: Option<Accidental>,
    /// Sustains into the next element
    #[serde(default)]
    pub tied: bool,
}

impl Note {
    pub fn new(pitch: Pitch, duration: Duration) -> Self {
        Self {
            pitch,
            duration,
            accidental: None,
            tied: false,
        }
    }

    pub fn tied(self) -> Self {
        Self { tied: true, ..self }
    }

    pub fn with_accidental(self, accidental: Accidental) -> Self {
        Self {
            accidental: Some(accidental),
            ..self
        }
    }
}

/// A rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub duration: Duration,
}

/// One entry of the score's element sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MusicElement {
    Note(Note),
    Rest(Rest),
}

impl MusicElement {
    pub fn note(pitch: Pitch, duration: Duration) -> Self {
        MusicElement::Note(Note::new(pitch, duration))
    }

    pub fn rest(duration: Duration) -> Self {
        MusicElement::Rest(Rest { duration })
    }

    pub fn duration(&self) -> Duration {
        match self {
            MusicElement::Note(n) => n.duration,
            MusicElement::Rest(r) => r.duration,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            MusicElement::Note(n) => Some(n),
            MusicElement::Rest(_) => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, MusicElement::Rest(_))
    }
}

impl From<Note> for MusicElement {
    fn from(note: Note) -> Self {
        MusicElement::Note(note)
    }
}

/// A complete single-staff, single-voice exercise score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub elements: Vec<MusicElement>,
    pub clef: Clef,
    pub time: TimeSignature,
    #[serde(default)]
    pub key: KeySignature,
    /// Quarter notes per minute; playback only
    #[serde(default)]
    pub tempo: Option<f64>,
}

impl Score {
    pub fn new(clef: Clef, time: TimeSignature) -> Self {
        Self {
            elements: Vec::new(),
            clef,
            time,
            key: KeySignature::default(),
            tempo: None,
        }
    }

    pub fn with_key(self, key: KeySignature) -> Self {
        Self { key, ..self }
    }

    pub fn with_elements(self, elements: Vec<MusicElement>) -> Self {
        Self { elements, ..self }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Sum of nominal durations in beats.
    pub fn total_beats(&self) -> f64 {
        self.elements.iter().map(|e| e.duration().nominal()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_lengths_in_quarter_beats() {
        assert_eq!(TimeSignature::new(4, 4).beats_per_measure(), 4.0);
        assert_eq!(TimeSignature::new(3, 4).beats_per_measure(), 3.0);
        assert_eq!(TimeSignature::new(6, 8).beats_per_measure(), 3.0);
        assert_eq!(TimeSignature::new(2, 2).beats_per_measure(), 4.0);
        assert!(!TimeSignature::new(0, 4).is_valid());
    }

    #[test]
    fn key_names_map_to_fifths() {
        assert_eq!(KeySignature::from_name("C"), Some(KeySignature::new(0)));
        assert_eq!(KeySignature::from_name("G"), Some(KeySignature::new(1)));
        assert_eq!(KeySignature::from_name("Bb"), Some(KeySignature::new(-2)));
        assert_eq!(KeySignature::from_name("Am"), Some(KeySignature::new(0)));
        assert_eq!(KeySignature::from_name("F#m"), Some(KeySignature::new(3)));
        assert_eq!(KeySignature::from_name("C#"), Some(KeySignature::new(7)));
        assert_eq!(KeySignature::from_name("H"), None);
    }

    #[test]
    fn accidentals_respect_the_key() {
        let g_major = KeySignature::new(1);
        let f_sharp = Pitch::new(Step::F, 5, 1);
        let f_natural = Pitch::natural(Step::F, 5);
        let c_sharp = Pitch::new(Step::C, 5, 1);
        assert_eq!(Accidental::required(&f_sharp, g_major), None);
        assert_eq!(Accidental::required(&f_natural, g_major), Some(Accidental::Natural));
        assert_eq!(Accidental::required(&c_sharp, g_major), Some(Accidental::Sharp));
        assert_eq!(Accidental::required(&f_natural, KeySignature::default()), None);
    }

    #[test]
    fn musicxml_clef_signs() {
        assert_eq!(Clef::from_sign("G", 2, 0), Some(Clef::Treble));
        assert_eq!(Clef::from_sign("G", 2, -1), Some(Clef::TrebleOctaveDown));
        assert_eq!(Clef::from_sign("F", 4, 0), Some(Clef::Bass));
        assert_eq!(Clef::from_sign("C", 4, 0), Some(Clef::Tenor));
        assert_eq!(Clef::from_sign("percussion", 3, 0), None);
    }
}
