//! Horizontal placement: beat offsets and x anchors for every element.
//!
//! Anchors grow linearly with the cumulative nominal beat offset. Dots and
//! barlines add fixed room on top, so anchors are strictly increasing.

use super::barlines::BarlineMark;
use super::options::LayoutOptions;
use crate::model::MusicElement;

pub(super) struct Spacing {
    pub(super) beat_offsets: Vec<f64>,
    pub(super) anchors: Vec<f64>,
    /// Right edge of each element's slot (before any barline gap)
    pub(super) slot_ends: Vec<f64>,
    /// x of each barline, parallel to the scheduled marks
    pub(super) barline_x: Vec<f64>,
}

pub(super) fn compute_spacing(
    elements: &[MusicElement],
    marks: &[BarlineMark],
    header_width: f64,
    options: &LayoutOptions,
) -> Spacing {
    let n = elements.len();
    let mut spacing = Spacing {
        beat_offsets: Vec::with_capacity(n),
        anchors: Vec::with_capacity(n),
        slot_ends: Vec::with_capacity(n),
        barline_x: Vec::with_capacity(marks.len()),
    };

    let mut marks = marks.iter().peekable();
    let mut x = header_width;
    let mut beat = 0.0;

    for (i, element) in elements.iter().enumerate() {
        let duration = element.duration();
        spacing.beat_offsets.push(beat);
        spacing.anchors.push(x);

        beat += duration.nominal();
        x += duration.nominal() * options.beat_width + duration.dot_count() as f64 * options.dot_width;
        spacing.slot_ends.push(x);

        if marks.next_if(|m| m.after_index == i).is_some() {
            spacing.barline_x.push(x + options.barline_gap / 2.0);
            x += options.barline_gap;
        }
    }

    spacing
}
