//! Tunable layout dimensions.
//!
//! Every field defaults to the matching constant, and the struct
//! deserializes from a partial JSON object so hosts only send what they
//! override.

use serde::{Deserialize, Serialize};

use super::constants::*;
use crate::error::{LayoutError, LayoutErrorKind};
use crate::model::KeySignature;

/// Layout dimensions, all in staff spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Horizontal room for one nominal beat
    pub beat_width: f64,
    /// Extra room reserved after an element per augmentation dot
    pub dot_width: f64,
    /// Gap inserted at every regular barline; the line sits in its middle
    pub barline_gap: f64,
    /// The staff is never narrower than this
    pub min_width: f64,
    pub clef_width: f64,
    pub key_accidental_width: f64,
    pub time_signature_width: f64,
    /// Unbeamed stem length, notehead center to tip
    pub stem_length: f64,
    /// Shortest stem allowed under a beam
    pub min_beamed_stem: f64,
    /// Steepest beam, in spaces of rise per space of run
    pub max_beam_slope: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            beat_width: BEAT_WIDTH,
            dot_width: DOT_SPACE,
            barline_gap: BARLINE_GAP,
            min_width: MIN_STAFF_WIDTH,
            clef_width: CLEF_SPACE,
            key_accidental_width: KEY_SIG_ACCIDENTAL_SPACE,
            time_signature_width: TIME_SIG_SPACE,
            stem_length: STEM_LENGTH,
            min_beamed_stem: MIN_BEAMED_STEM_LENGTH,
            max_beam_slope: MAX_BEAM_SLOPE,
        }
    }
}

impl LayoutOptions {
    /// Width of clef + key signature + time signature.
    pub fn header_width(&self, key: KeySignature) -> f64 {
        let accidentals = key.fifths.unsigned_abs().min(7) as f64;
        self.clef_width + accidentals * self.key_accidental_width + self.time_signature_width
    }

    pub(crate) fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("beat_width", self.beat_width),
            ("stem_length", self.stem_length),
            ("min_beamed_stem", self.min_beamed_stem),
        ];
        let non_negative = [
            ("dot_width", self.dot_width),
            ("barline_gap", self.barline_gap),
            ("min_width", self.min_width),
            ("clef_width", self.clef_width),
            ("key_accidental_width", self.key_accidental_width),
            ("time_signature_width", self.time_signature_width),
            ("max_beam_slope", self.max_beam_slope),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::score(
                    LayoutErrorKind::InvalidOptions,
                    format!("{name} must be positive, got {value}"),
                ));
            }
        }
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LayoutError::score(
                    LayoutErrorKind::InvalidOptions,
                    format!("{name} must not be negative, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_the_other_defaults() {
        let options: LayoutOptions = serde_json::from_str(r#"{"beat_width": 6.0}"#).unwrap();
        assert_eq!(options.beat_width, 6.0);
        assert_eq!(options.stem_length, STEM_LENGTH);
        assert_eq!(options.barline_gap, BARLINE_GAP);
    }

    #[test]
    fn header_grows_with_the_key_signature() {
        let options = LayoutOptions::default();
        assert_eq!(options.header_width(KeySignature::new(0)), 6.0);
        assert_eq!(options.header_width(KeySignature::new(-3)), 9.0);
    }

    #[test]
    fn rejects_non_positive_beat_width() {
        let options = LayoutOptions {
            beat_width: 0.0,
            ..LayoutOptions::default()
        };
        let err = options.validate().unwrap_err();
        assert_eq!(err.kind, LayoutErrorKind::InvalidOptions);
        assert_eq!(err.element_index, None);
    }
}
