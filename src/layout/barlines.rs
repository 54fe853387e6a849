//! Barline scheduling from accumulated nominal durations.

use serde::{Deserialize, Serialize};

use super::meter::BeatCursor;
use crate::model::MusicElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarlineKind {
    Regular,
    /// Closing double/thick barline after the last element
    Final,
}

/// A barline following one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarlineMark {
    pub after_index: usize,
    pub kind: BarlineKind,
}

/// Barlines for an element sequence: a regular one after every non-final
/// element that reaches or crosses a measure boundary, and a final one
/// after the last element. Rests count toward the measure like notes.
pub fn schedule_barlines(elements: &[MusicElement], measure_length: f64) -> Vec<BarlineMark> {
    let Some(last) = elements.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut cursor = BeatCursor::new(measure_length);
    let mut marks = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        let span = cursor.advance(element.duration().nominal());
        if i == last {
            marks.push(BarlineMark {
                after_index: i,
                kind: BarlineKind::Final,
            });
        } else if span.ends_measure {
            marks.push(BarlineMark {
                after_index: i,
                kind: BarlineKind::Regular,
            });
        }
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use crate::pitch::{Pitch, Step};

    fn note(beats: f64) -> MusicElement {
        MusicElement::note(Pitch::natural(Step::C, 5), Duration::new(beats))
    }

    fn regular(after_index: usize) -> BarlineMark {
        BarlineMark {
            after_index,
            kind: BarlineKind::Regular,
        }
    }

    fn final_after(after_index: usize) -> BarlineMark {
        BarlineMark {
            after_index,
            kind: BarlineKind::Final,
        }
    }

    #[test]
    fn empty_sequence_has_no_barlines() {
        assert!(schedule_barlines(&[], 4.0).is_empty());
    }

    #[test]
    fn one_full_measure_gets_only_the_final_barline() {
        let elements = vec![note(1.0); 4];
        assert_eq!(schedule_barlines(&elements, 4.0), vec![final_after(3)]);
    }

    #[test]
    fn measures_are_closed_as_they_fill() {
        let elements = vec![
            note(2.0),
            MusicElement::rest(Duration::new(1.0)),
            note(1.0),
            note(3.0),
            note(0.5),
        ];
        assert_eq!(schedule_barlines(&elements, 4.0), vec![regular(2), final_after(4)]);
    }

    #[test]
    fn note_straddling_a_boundary_takes_the_barline() {
        let elements = vec![note(3.0), note(2.0), note(3.0)];
        assert_eq!(schedule_barlines(&elements, 4.0), vec![regular(1), final_after(2)]);
    }

    #[test]
    fn compound_meter_uses_quarter_beats() {
        // 6/8 = 3 quarter beats per measure
        let elements = vec![note(0.5); 12];
        assert_eq!(schedule_barlines(&elements, 3.0), vec![regular(5), final_after(11)]);
    }

    #[test]
    fn measures_between_barlines_sum_to_the_measure_length() {
        let common = vec![0.5, 0.25, 0.25, 1.0, 2.0, 0.5, 0.5, 1.0, 1.0, 0.125, 0.125, 0.25, 0.5];
        let triple = vec![0.5, 0.5, 1.0, 0.25, 0.25, 0.5, 1.0, 2.0];
        for (pattern, measure_length) in [(common.clone(), 2.0), (common, 4.0), (triple, 3.0)] {
            let elements: Vec<MusicElement> = pattern.iter().cycle().take(40).map(|&b| note(b)).collect();
            let marks = schedule_barlines(&elements, measure_length);
            let mut from = 0;
            for mark in marks.iter().filter(|m| m.kind == BarlineKind::Regular) {
                let total: f64 = elements[from..=mark.after_index]
                    .iter()
                    .map(|e| e.duration().nominal())
                    .sum();
                assert!((total - measure_length).abs() < 1e-9, "{measure_length}: {total}");
                from = mark.after_index + 1;
            }
            assert_eq!(marks.last().map(|m| m.kind), Some(BarlineKind::Final));
        }
    }
}
