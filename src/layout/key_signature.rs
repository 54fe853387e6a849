//! Key-signature accidental placement after the clef.

use serde::{Deserialize, Serialize};

use super::options::LayoutOptions;
use crate::model::{Accidental, Clef, KeySignature};

/// One accidental of the key signature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyAccidental {
    pub accidental: Accidental,
    pub step: i32,
    pub x: f64,
}

// Steps in sharp order (F C G D A E B) and flat order (B E A D G C F).
const TREBLE_SHARPS: [i32; 7] = [10, 7, 11, 8, 5, 9, 6];
const TREBLE_FLATS: [i32; 7] = [6, 9, 5, 8, 4, 7, 3];
const TENOR_SHARPS: [i32; 7] = [4, 8, 5, 9, 6, 10, 7];

fn sharp_steps(clef: Clef) -> [i32; 7] {
    match clef {
        Clef::Treble | Clef::TrebleOctaveDown => TREBLE_SHARPS,
        Clef::Bass => TREBLE_SHARPS.map(|s| s - 2),
        Clef::Alto => TREBLE_SHARPS.map(|s| s - 1),
        Clef::Tenor => TENOR_SHARPS,
    }
}

fn flat_steps(clef: Clef) -> [i32; 7] {
    match clef {
        Clef::Treble | Clef::TrebleOctaveDown => TREBLE_FLATS,
        Clef::Bass => TREBLE_FLATS.map(|s| s - 2),
        Clef::Alto => TREBLE_FLATS.map(|s| s - 1),
        Clef::Tenor => TREBLE_FLATS.map(|s| s + 1),
    }
}

pub fn key_signature_layout(key: KeySignature, clef: Clef, options: &LayoutOptions) -> Vec<KeyAccidental> {
    let count = key.fifths.unsigned_abs().min(7) as usize;
    let (accidental, steps) = if key.fifths > 0 {
        (Accidental::Sharp, sharp_steps(clef))
    } else {
        (Accidental::Flat, flat_steps(clef))
    };

    steps[..count]
        .iter()
        .enumerate()
        .map(|(i, &step)| KeyAccidental {
            accidental,
            step,
            x: options.clef_width + i as f64 * options.key_accidental_width,
        })
        .collect()
}
