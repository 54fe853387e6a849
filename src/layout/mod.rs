//! Score layout engine: converts a `Score` into render-agnostic geometry.
//!
//! The engine is a pure function: the same score and options always give
//! the same `Layout`, and nothing is retained between calls. It computes
//! vertical placement (staff steps, ledger lines), stems, beam groups with
//! their per-level segments, ties, barlines and horizontal anchors. Glyph
//! choice and painting belong to the renderer consuming the layout.
//!
//! Units: x positions and lengths are in staff spaces; vertical positions
//! are staff steps (half a space each), with the bottom line at step 2.

pub mod barlines;
pub mod beams;
pub mod constants;
pub mod key_signature;
pub mod ledger;
mod meter;
pub mod options;
mod spacing;
pub mod stems;
pub mod ties;

use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::error::{LayoutError, LayoutErrorKind};
use crate::model::*;
use barlines::{schedule_barlines, BarlineKind, BarlineMark};
use beams::{beam_segments, find_beam_groups, BeamGroup, BeamSegment};
use constants::FIVE_LINE_STAFF;
use key_signature::{key_signature_layout, KeyAccidental};
use ledger::{ledger_lines, StaffBounds};
use options::LayoutOptions;
use spacing::{compute_spacing, Spacing};
use stems::{beamed_stems, group_stem_direction, single_stem, stem_direction, Stem};
use ties::{tie_height, tie_placement, Tie};

// ═══════════════════════════════════════════════════════════════════════
// Layout structures
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Note,
    Rest,
}

/// Computed geometry for one element of the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    /// Index into `Score::elements`
    pub index: usize,
    pub kind: ElementKind,
    /// Horizontal anchor (notehead or rest center)
    pub x: f64,
    /// Room up to the next element, excluding any barline gap
    pub slot_width: f64,
    /// Cumulative nominal beats before this element
    pub beat_offset: f64,
    /// Nominal length in beats
    pub duration: f64,
    pub dots: u8,
    /// Notehead position; `None` for rests
    pub staff_step: Option<i32>,
    pub accidental: Option<Accidental>,
    pub stem: Option<Stem>,
    /// Flags on the stem; always 0 for beamed notes
    pub flags: u8,
    /// Id of the beam group this note belongs to
    pub beam_group: Option<usize>,
    pub beams: Vec<BeamSegment>,
    /// Steps of the ledger lines, nearest the staff first
    pub ledger_lines: Vec<i32>,
    pub tie: Option<Tie>,
    pub barline_after: Option<BarlineKind>,
}

/// A barline with its resolved position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Barline {
    pub after_index: usize,
    pub kind: BarlineKind,
    pub x: f64,
}

/// Complete layout of a score. Immutable; recompute on every edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub clef: Clef,
    pub time: TimeSignature,
    pub staff: StaffBounds,
    /// Clef + key signature + time signature
    pub header_width: f64,
    pub key_signature: Vec<KeyAccidental>,
    pub records: Vec<LayoutRecord>,
    pub beam_groups: Vec<BeamGroup>,
    pub barlines: Vec<Barline>,
    /// Total staff width
    pub width: f64,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of measures (the final partial one included).
    pub fn measure_count(&self) -> usize {
        self.barlines.len()
    }

    /// x position of a beat offset, interpolated within the element slot
    /// that contains it. Used to place a playback cursor.
    pub fn x_at_beat(&self, beat: f64) -> f64 {
        let Some(first) = self.records.first() else {
            return self.header_width;
        };
        if beat <= first.beat_offset {
            return first.x;
        }
        let record = self
            .records
            .iter()
            .rev()
            .find(|r| r.beat_offset <= beat)
            .unwrap_or(first);
        let fraction = ((beat - record.beat_offset) / record.duration).min(1.0);
        record.x + fraction * record.slot_width
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Lay out a score with the default dimensions.
pub fn layout_score(score: &Score) -> Result<Layout, LayoutError> {
    layout_score_with(score, &LayoutOptions::default())
}

/// Lay out a score. Fails on the first invalid element without producing
/// any partial output.
pub fn layout_score_with(score: &Score, options: &LayoutOptions) -> Result<Layout, LayoutError> {
    options.validate()?;
    validate_score(score)?;

    let staff = FIVE_LINE_STAFF;
    let middle = staff.middle();
    let measure_length = score.time.beats_per_measure();
    let elements = &score.elements;

    let header_width = options.header_width(score.key);
    let key_signature = key_signature_layout(score.key, score.clef, options);

    let marks = schedule_barlines(elements, measure_length);
    let groups = find_beam_groups(elements, score.time);
    check_beam_groups(elements, &groups, &marks)?;

    let spacing = compute_spacing(elements, &marks, header_width, options);

    let mut records: Vec<LayoutRecord> = elements
        .iter()
        .enumerate()
        .map(|(i, element)| base_record(i, element, score.clef, &spacing, staff, options))
        .collect();

    let mut beam_groups = Vec::with_capacity(groups.len());
    for (id, members) in groups.into_iter().enumerate() {
        beam_groups.push(apply_beam_group(id, members, &mut records, middle, options)?);
    }

    apply_ties(elements, &mut records, &spacing, middle);

    let mut barlines = Vec::with_capacity(marks.len());
    for (mark, &x) in marks.iter().zip(&spacing.barline_x) {
        records[mark.after_index].barline_after = Some(mark.kind);
        barlines.push(Barline {
            after_index: mark.after_index,
            kind: mark.kind,
            x,
        });
    }

    let content_end = barlines.last().map_or(header_width, |b| b.x);
    let width = content_end.max(options.min_width);

    log::debug!(
        "laid out {} elements: {} beam groups, {} measures, width {:.1}",
        records.len(),
        beam_groups.len(),
        barlines.len(),
        width
    );

    Ok(Layout {
        clef: score.clef,
        time: score.time,
        staff,
        header_width,
        key_signature,
        records,
        beam_groups,
        barlines,
        width,
    })
}

/// Reject scores the engine cannot lay out (or play back).
pub(crate) fn validate_score(score: &Score) -> Result<(), LayoutError> {
    if !score.time.is_valid() {
        return Err(LayoutError::score(
            LayoutErrorKind::InvalidTimeSignature,
            format!("time signature {} has a zero term", score.time),
        ));
    }

    for (i, element) in score.elements.iter().enumerate() {
        let duration = element.duration();
        if !duration.is_valid() {
            return Err(LayoutError::at(
                LayoutErrorKind::InvalidDuration,
                i,
                format!("duration must be positive and finite, got {}", duration.beats),
            ));
        }
        if let MusicElement::Note(note) = element {
            if !note.pitch.is_valid() {
                return Err(LayoutError::at(
                    LayoutErrorKind::InvalidPitch,
                    i,
                    format!(
                        "octave {} / alteration {} out of range",
                        note.pitch.octave, note.pitch.alter
                    ),
                ));
            }
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

fn base_record(
    index: usize,
    element: &MusicElement,
    clef: Clef,
    spacing: &Spacing,
    staff: StaffBounds,
    options: &LayoutOptions,
) -> LayoutRecord {
    let duration = element.duration();
    let x = spacing.anchors[index];
    let mut record = LayoutRecord {
        index,
        kind: ElementKind::Rest,
        x,
        slot_width: spacing.slot_ends[index] - x,
        beat_offset: spacing.beat_offsets[index],
        duration: duration.nominal(),
        dots: duration.dot_count(),
        staff_step: None,
        accidental: None,
        stem: None,
        flags: 0,
        beam_group: None,
        beams: Vec::new(),
        ledger_lines: Vec::new(),
        tie: None,
        barline_after: None,
    };

    if let MusicElement::Note(note) = element {
        let step = note.pitch.diatonic_step(clef);
        record.kind = ElementKind::Note;
        record.staff_step = Some(step);
        record.accidental = note.accidental;
        record.ledger_lines = ledger_lines(step, staff);
        if duration.has_stem() {
            let direction = stem_direction(step, staff.middle());
            record.stem = Some(single_stem(step, direction, options.stem_length));
            record.flags = duration.beam_level();
        }
    }

    record
}

/// Beam groups must hold only short notes, be contiguous, and never run
/// across a regular barline.
fn check_beam_groups(
    elements: &[MusicElement],
    groups: &[Vec<usize>],
    marks: &[BarlineMark],
) -> Result<(), LayoutError> {
    let inconsistent = |index: usize, detail: String| {
        Err(LayoutError::at(LayoutErrorKind::InternalInconsistency, index, detail))
    };

    for group in groups {
        let Some((&last, body)) = group.split_last() else {
            continue;
        };
        if group.len() < 2 {
            return inconsistent(last, "beam group with a single member".into());
        }
        for pair in group.windows(2) {
            if pair[1] != pair[0] + 1 {
                return inconsistent(pair[1], "beam group is not contiguous".into());
            }
        }
        for &i in group {
            let element = &elements[i];
            if element.is_rest() || !element.duration().is_sub_beat() {
                return inconsistent(i, "beam group member is not a short note".into());
            }
        }
        for mark in marks {
            if mark.kind == BarlineKind::Regular && body.contains(&mark.after_index) {
                return inconsistent(mark.after_index, "beam group crosses a barline".into());
            }
        }
    }

    Ok(())
}

fn apply_beam_group(
    id: usize,
    members: Vec<usize>,
    records: &mut [LayoutRecord],
    middle: i32,
    options: &LayoutOptions,
) -> Result<BeamGroup, LayoutError> {
    let mut heads = Vec::with_capacity(members.len());
    let mut levels = Vec::with_capacity(members.len());
    for &i in &members {
        let record = &records[i];
        let Some(step) = record.staff_step else {
            return Err(LayoutError::at(
                LayoutErrorKind::InternalInconsistency,
                i,
                "beamed element has no staff step",
            ));
        };
        heads.push((record.x, step));
        levels.push(Duration::new(record.duration).beam_level());
    }

    let steps: Vec<i32> = heads.iter().map(|&(_, s)| s).collect();
    let direction = group_stem_direction(&steps, middle);
    let beamed = beamed_stems(&heads, direction, options);
    let segments = beam_segments(&levels);

    for ((&i, stem), beams) in members.iter().zip(beamed.stems).zip(segments) {
        let record = &mut records[i];
        record.stem = Some(stem);
        record.flags = 0;
        record.beam_group = Some(id);
        record.beams = beams;
    }

    let max_level = levels.iter().copied().max().unwrap_or(1);
    log::trace!(
        "beam group {id}: elements {:?}, stems {:?}, {} levels",
        members,
        direction,
        max_level
    );

    Ok(BeamGroup {
        id,
        members,
        direction,
        start: beamed.start,
        end: beamed.end,
        max_level,
    })
}

fn apply_ties(elements: &[MusicElement], records: &mut [LayoutRecord], spacing: &Spacing, middle: i32) {
    for (i, element) in elements.iter().enumerate() {
        let MusicElement::Note(note) = element else {
            continue;
        };
        if !note.tied {
            continue;
        }

        let to = match elements.get(i + 1) {
            Some(MusicElement::Note(_)) => Some(i + 1),
            _ => None,
        };
        let span = match to {
            Some(next) => spacing.anchors[next] - spacing.anchors[i],
            None => {
                log::debug!("tie from element {i} has no following note");
                spacing.slot_ends[i] - spacing.anchors[i]
            }
        };

        let record = &mut records[i];
        let step = record.staff_step.unwrap_or(middle);
        record.tie = Some(Tie {
            to,
            placement: tie_placement(record.stem.map(|s| s.direction), step, middle),
            span,
            height: tie_height(span),
        });
    }
}
