//! Duration model: nominal length in beats (quarter = 1.0) plus
//! augmentation dots.
//!
//! Dots never enter beat arithmetic in the layout engine. Beaming, barline
//! scheduling and `beat_offset` use the nominal length; dots only reserve
//! extra horizontal room. Playback uses `sounding()`.

use serde::{Deserialize, Serialize};

/// Tolerance used for every beat-boundary comparison.
pub const BEAT_EPSILON: f64 = 1e-6;

/// Beam levels never exceed this (a 1/256 note).
pub const MAX_BEAM_LEVEL: u8 = 6;

/// Augmentation dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dots {
    #[default]
    None,
    Single,
    Double,
}

impl Dots {
    pub fn count(self) -> u8 {
        match self {
            Dots::None => 0,
            Dots::Single => 1,
            Dots::Double => 2,
        }
    }

    pub fn from_count(count: usize) -> Dots {
        match count {
            0 => Dots::None,
            1 => Dots::Single,
            _ => Dots::Double,
        }
    }

    /// Playback multiplier: 1, 1.5 or 1.75.
    pub fn multiplier(self) -> f64 {
        match self {
            Dots::None => 1.0,
            Dots::Single => 1.5,
            Dots::Double => 1.75,
        }
    }
}

/// Length of a note or rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Duration {
    /// Undotted length in beats
    pub beats: f64,
    #[serde(default)]
    pub dots: Dots,
}

impl Duration {
    pub fn new(beats: f64) -> Self {
        Self { beats, dots: Dots::None }
    }

    pub fn with_dots(self, dots: Dots) -> Self {
        Self { dots, ..self }
    }

    pub fn dotted(self) -> Self {
        self.with_dots(Dots::Single)
    }

    pub fn double_dotted(self) -> Self {
        self.with_dots(Dots::Double)
    }

    pub fn whole() -> Self {
        Self::new(4.0)
    }

    pub fn half() -> Self {
        Self::new(2.0)
    }

    pub fn quarter() -> Self {
        Self::new(1.0)
    }

    pub fn eighth() -> Self {
        Self::new(0.5)
    }

    pub fn sixteenth() -> Self {
        Self::new(0.25)
    }

    pub fn thirty_second() -> Self {
        Self::new(0.125)
    }

    pub fn sixty_fourth() -> Self {
        Self::new(0.0625)
    }

    /// Beats for a note-type name as used by MusicXML `<type>` and the
    /// exercise format.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let beats = match name.trim().to_ascii_lowercase().as_str() {
            "breve" => 8.0,
            "whole" => 4.0,
            "half" => 2.0,
            "quarter" => 1.0,
            "eighth" => 0.5,
            "16th" | "sixteenth" => 0.25,
            "32nd" | "thirty-second" => 0.125,
            "64th" | "sixty-fourth" => 0.0625,
            _ => return None,
        };
        Some(Self::new(beats))
    }

    /// Length used for spacing, beaming and measure arithmetic.
    pub fn nominal(&self) -> f64 {
        self.beats
    }

    /// Length including dots, for playback.
    pub fn sounding(&self) -> f64 {
        self.beats * self.dots.multiplier()
    }

    pub fn dot_count(&self) -> u8 {
        self.dots.count()
    }

    pub fn is_valid(&self) -> bool {
        self.beats.is_finite() && self.beats > 0.0
    }

    /// Shorter than one beat, so eligible for a beam when it is a note.
    pub fn is_sub_beat(&self) -> bool {
        self.beats < 1.0 - BEAT_EPSILON
    }

    /// Beam (or flag) count: 0 for a beat or longer, 1 for [1/2, 1),
    /// 2 for [1/4, 1/2), and so on.
    pub fn beam_level(&self) -> u8 {
        let mut level = 0;
        let mut threshold = 1.0;
        while level < MAX_BEAM_LEVEL && self.beats < threshold - BEAT_EPSILON {
            level += 1;
            threshold /= 2.0;
        }
        level
    }

    /// Whole notes and longer are drawn without a stem.
    pub fn has_stem(&self) -> bool {
        self.beats < 4.0 - BEAT_EPSILON
    }
}
