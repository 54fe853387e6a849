//! Tie placement and curvature.

use serde::{Deserialize, Serialize};

use super::constants::*;
use super::stems::StemDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiePlacement {
    Above,
    Below,
}

/// A tie leaving a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tie {
    /// Index of the receiving note; `None` when the tie has nowhere to land
    pub to: Option<usize>,
    pub placement: TiePlacement,
    /// Horizontal extent in staff spaces
    pub span: f64,
    /// Arch height in staff spaces
    pub height: f64,
}

/// Ties curve away from the stem. Stemless notes curve above when they sit
/// on or above the middle line.
pub fn tie_placement(stem: Option<StemDirection>, step: i32, middle: i32) -> TiePlacement {
    match stem {
        Some(StemDirection::Up) => TiePlacement::Below,
        Some(StemDirection::Down) => TiePlacement::Above,
        None if step >= middle => TiePlacement::Above,
        None => TiePlacement::Below,
    }
}

pub fn tie_height(span: f64) -> f64 {
    (span.abs() * TIE_HEIGHT_FACTOR).clamp(TIE_MIN_HEIGHT, TIE_MAX_HEIGHT)
}
