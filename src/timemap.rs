//! Playback timeline: when each note sounds and for how long.
//!
//! This is the hand-off to the audio collaborator. Unlike the layout
//! engine it uses sounding lengths (dots included), and it merges tied
//! notes of equal pitch into one event.

use serde::Serialize;

use crate::error::LayoutError;
use crate::layout::validate_score;
use crate::model::{MusicElement, Score};

/// Default tempo if none is specified in the score.
pub const DEFAULT_TEMPO: f64 = 120.0;

/// One sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteEvent {
    /// Element that starts the note (the first of a tied chain)
    pub element_index: usize,
    /// MIDI note number (C4 = 60)
    pub midi: i32,
    pub start_ms: f64,
    pub duration_ms: f64,
}

/// Generate the note events of a score, in order.
pub fn generate_timemap(score: &Score) -> Result<Vec<NoteEvent>, LayoutError> {
    validate_score(score)?;

    let tempo = score.tempo.filter(|t| t.is_finite() && *t > 0.0).unwrap_or(DEFAULT_TEMPO);
    let ms_per_beat = 60_000.0 / tempo;

    let mut events: Vec<NoteEvent> = Vec::new();
    let mut now_ms = 0.0;
    // event still open because the previous note was tied
    let mut open_tie: Option<usize> = None;

    for (i, element) in score.elements.iter().enumerate() {
        let duration_ms = element.duration().sounding() * ms_per_beat;

        match element {
            MusicElement::Note(note) => {
                let midi = note.pitch.semitone_value();
                let continues = open_tie
                    .and_then(|e| events.get_mut(e))
                    .filter(|e| e.midi == midi);
                match continues {
                    Some(event) => event.duration_ms += duration_ms,
                    None => {
                        events.push(NoteEvent {
                            element_index: i,
                            midi,
                            start_ms: now_ms,
                            duration_ms,
                        });
                    }
                }
                open_tie = if note.tied { Some(events.len() - 1) } else { None };
            }
            MusicElement::Rest(_) => open_tie = None,
        }

        now_ms += duration_ms;
    }

    Ok(events)
}

/// Total sounding length of the score in milliseconds (rests included).
pub fn total_duration_ms(score: &Score) -> f64 {
    let tempo = score.tempo.filter(|t| t.is_finite() && *t > 0.0).unwrap_or(DEFAULT_TEMPO);
    score
        .elements
        .iter()
        .map(|e| e.duration().sounding())
        .sum::<f64>()
        * 60_000.0
        / tempo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use crate::model::{Clef, Note, TimeSignature};
    use crate::pitch::{Pitch, Step};

    fn score(elements: Vec<MusicElement>) -> Score {
        Score::new(Clef::Treble, TimeSignature::new(4, 4)).with_elements(elements)
    }

    #[test]
    fn dotted_notes_sound_longer() {
        let c = Pitch::natural(Step::C, 4);
        let events = generate_timemap(&score(vec![
            MusicElement::note(c, Duration::quarter().dotted()),
            MusicElement::note(c, Duration::eighth()),
        ]))
        .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].duration_ms, 750.0);
        assert_eq!(events[1].start_ms, 750.0);
        assert_eq!(events[1].duration_ms, 250.0);
    }

    #[test]
    fn ties_merge_equal_pitches_only() {
        let g = Pitch::natural(Step::G, 4);
        let a = Pitch::natural(Step::A, 4);
        let events = generate_timemap(&score(vec![
            MusicElement::Note(Note::new(g, Duration::half()).tied()),
            MusicElement::note(g, Duration::quarter()),
            MusicElement::Note(Note::new(g, Duration::quarter()).tied()),
            MusicElement::note(a, Duration::quarter()),
        ]))
        .unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].element_index, 0);
        assert_eq!(events[0].duration_ms, 1500.0);
        assert_eq!(events[1].element_index, 2);
        assert_eq!(events[2].midi, 69);
        assert_eq!(events[2].start_ms, 2000.0);
    }

    #[test]
    fn rests_leave_gaps_and_respect_tempo() {
        let mut s = score(vec![
            MusicElement::rest(Duration::quarter()),
            MusicElement::note(Pitch::natural(Step::C, 5), Duration::quarter()),
        ]);
        s.tempo = Some(60.0);
        let events = generate_timemap(&s).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_ms, 1000.0);
        assert_eq!(total_duration_ms(&s), 2000.0);
    }

    #[test]
    fn invalid_scores_are_rejected() {
        let s = score(vec![MusicElement::rest(Duration::new(-1.0))]);
        assert!(generate_timemap(&s).is_err());
    }
}
