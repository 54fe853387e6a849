//! Stem direction and length, for single notes and beam groups.

use serde::{Deserialize, Serialize};

use super::constants::STEPS_PER_SPACE;
use super::options::LayoutOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    Down,
}

impl StemDirection {
    /// +1 when the stem rises toward higher steps.
    fn sign(self) -> f64 {
        match self {
            StemDirection::Up => 1.0,
            StemDirection::Down => -1.0,
        }
    }
}

/// A resolved stem. `tip_step` is on the same vertical scale as the
/// notehead's staff step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stem {
    pub direction: StemDirection,
    /// Notehead center to tip, in staff spaces
    pub length: f64,
    pub tip_step: f64,
}

/// One end of a beam's primary line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamPoint {
    pub x: f64,
    pub step: f64,
}

/// Stems of a beam group together with the primary beam line they meet.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamedStems {
    pub stems: Vec<Stem>,
    pub start: BeamPoint,
    pub end: BeamPoint,
}

/// Notes below the middle line take an up-stem; on or above it, down.
pub fn stem_direction(step: i32, middle: i32) -> StemDirection {
    if step < middle {
        StemDirection::Up
    } else {
        StemDirection::Down
    }
}

/// One direction for a whole beam group, from the average step.
pub fn group_stem_direction(steps: &[i32], middle: i32) -> StemDirection {
    if steps.is_empty() {
        return StemDirection::Up;
    }
    let avg = steps.iter().map(|&s| s as f64).sum::<f64>() / steps.len() as f64;
    if avg < middle as f64 {
        StemDirection::Up
    } else {
        StemDirection::Down
    }
}

/// Stem of an unbeamed note.
pub fn single_stem(step: i32, direction: StemDirection, length: f64) -> Stem {
    Stem {
        direction,
        length,
        tip_step: step as f64 + direction.sign() * length * STEPS_PER_SPACE,
    }
}

/// Stems for a beam group with noteheads at `(x, step)`.
///
/// The beam starts at the first note's nominal tip and aims at the last
/// one's, with the slope clamped. It is then pushed away from the heads
/// until every stem reaches `min_beamed_stem`.
pub fn beamed_stems(heads: &[(f64, i32)], direction: StemDirection, options: &LayoutOptions) -> BeamedStems {
    let sign = direction.sign();
    let nominal = options.stem_length * STEPS_PER_SPACE;
    let min_stem = options.min_beamed_stem * STEPS_PER_SPACE;
    let max_slope = options.max_beam_slope * STEPS_PER_SPACE;

    let (first_x, first_step) = heads.first().copied().unwrap_or((0.0, 0));
    let (last_x, last_step) = heads.last().copied().unwrap_or((first_x, first_step));

    let first_tip = first_step as f64 + sign * nominal;
    let last_tip = last_step as f64 + sign * nominal;
    let dx = last_x - first_x;
    let slope = if dx.abs() > 1e-9 {
        ((last_tip - first_tip) / dx).clamp(-max_slope, max_slope)
    } else {
        0.0
    };
    let beam_at = |x: f64| first_tip + slope * (x - first_x);

    let mut shift = 0.0_f64;
    for &(x, step) in heads {
        let len = sign * (beam_at(x) + shift - step as f64);
        if len < min_stem {
            shift += sign * (min_stem - len);
        }
    }

    let stems = heads
        .iter()
        .map(|&(x, step)| {
            let tip_step = beam_at(x) + shift;
            Stem {
                direction,
                length: sign * (tip_step - step as f64) / STEPS_PER_SPACE,
                tip_step,
            }
        })
        .collect();

    BeamedStems {
        stems,
        start: BeamPoint {
            x: first_x,
            step: beam_at(first_x) + shift,
        },
        end: BeamPoint {
            x: last_x,
            step: beam_at(last_x) + shift,
        },
    }
}
