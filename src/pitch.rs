//! Pitch model: diatonic name, octave and chromatic alteration.
//!
//! Vertical placement only ever looks at the diatonic part of a pitch
//! (`step` + `octave`); the alteration affects the sounding semitone and
//! nothing else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::model::Clef;

/// Lowest octave accepted by the layout engine.
pub const MIN_OCTAVE: i32 = 0;
/// Highest octave accepted by the layout engine.
pub const MAX_OCTAVE: i32 = 9;
/// Largest alteration in either direction (double sharp / double flat).
pub const MAX_ALTER: i32 = 2;

/// Diatonic note name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    /// Position within the octave, C = 0 … B = 6.
    pub fn index(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }

    /// Semitone offset of the natural note above C.
    pub fn natural_semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    pub fn from_char(c: char) -> Option<Step> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }
}

/// A written pitch. Middle C is `C4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    pub octave: i32,
    /// Chromatic alteration: -2 = double flat … 2 = double sharp
    pub alter: i32,
}

impl Pitch {
    pub fn new(step: Step, octave: i32, alter: i32) -> Self {
        Self { step, octave, alter }
    }

    pub fn natural(step: Step, octave: i32) -> Self {
        Self::new(step, octave, 0)
    }

    /// Whether octave and alteration lie within the supported range.
    pub fn is_valid(&self) -> bool {
        (MIN_OCTAVE..=MAX_OCTAVE).contains(&self.octave) && self.alter.abs() <= MAX_ALTER
    }

    /// Absolute diatonic index: `octave * 7 + step index`.
    pub fn diatonic_index(&self) -> i32 {
        self.octave * 7 + self.step.index()
    }

    /// Staff step relative to the clef's anchor pitch. One step is one
    /// diatonic scale degree (half a staff space); the bottom staff line is
    /// step 2 for every clef.
    pub fn diatonic_step(&self, clef: Clef) -> i32 {
        let (ref_step, ref_octave) = clef.anchor();
        7 * (self.octave - ref_octave) + self.step.index() - ref_step.index()
    }

    /// Twelve-tone value for playback (MIDI numbering, C4 = 60).
    pub fn semitone_value(&self) -> i32 {
        (self.octave + 1) * 12 + self.step.natural_semitone() + self.alter
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.alter {
            -2 => "bb",
            -1 => "b",
            1 => "#",
            2 => "##",
            _ => "",
        };
        write!(f, "{}{}{}", self.step.as_char(), accidental, self.octave)
    }
}

impl FromStr for Pitch {
    type Err = ParseError;

    /// Parse `C4`, `F#5`, `Bb3`, `D##4`, `Ebb2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidPitch(s.to_string());
        let text = s.trim();
        let mut chars = text.chars();
        let step = chars.next().and_then(Step::from_char).ok_or_else(invalid)?;

        let rest = chars.as_str();
        let (alter, octave_text) = if let Some(r) = rest.strip_prefix("##") {
            (2, r)
        } else if let Some(r) = rest.strip_prefix('#') {
            (1, r)
        } else if let Some(r) = rest.strip_prefix("bb") {
            (-2, r)
        } else if let Some(r) = rest.strip_prefix('b') {
            (-1, r)
        } else {
            (0, rest)
        };

        if octave_text.is_empty() {
            return Err(invalid());
        }
        let octave = octave_text.parse::<i32>().map_err(|_| invalid())?;
        Ok(Pitch::new(step, octave, alter))
    }
}
