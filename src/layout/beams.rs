//! Beam grouping: which runs of short notes share a beam, and which beam
//! levels each note carries.

use serde::{Deserialize, Serialize};

use super::meter::{BeamGrid, BeatCursor};
use super::stems::{BeamPoint, StemDirection};
use crate::model::{MusicElement, TimeSignature};

/// Role of one beam level at one note (MusicXML beam vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeamKind {
    Begin,
    Continue,
    End,
    /// Stub pointing to the next note
    ForwardHook,
    /// Stub pointing to the previous note
    BackwardHook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeamSegment {
    /// 1 = primary (eighth) beam, 2 = sixteenth beam, …
    pub level: u8,
    pub kind: BeamKind,
}

/// A rendered beam: a contiguous run of at least two notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamGroup {
    pub id: usize,
    /// Element indices, ascending and contiguous
    pub members: Vec<usize>,
    pub direction: StemDirection,
    /// Primary beam line, at the first and last member
    pub start: BeamPoint,
    pub end: BeamPoint,
    /// Deepest beam level in the group
    pub max_level: u8,
}

/// Partition the sequence into beam groups.
///
/// Only notes shorter than a beat are beamable. A group closes at any
/// other element and at a measure boundary. Within the measure it closes
/// on the meter's beaming unit (half a bar in common time). A group that
/// holds a sixteenth or shorter stays inside the beat its first note
/// starts in, so a note that would carry it into another beat begins a
/// new group. Runs of a single note are dropped (that note keeps its
/// flag).
pub fn find_beam_groups(elements: &[MusicElement], time: TimeSignature) -> Vec<Vec<usize>> {
    let grid = BeamGrid::for_time(time);
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut deep = false;
    let mut group_beat = 0.0;
    let mut cursor = BeatCursor::new(time.beats_per_measure());

    fn close(current: &mut Vec<usize>, groups: &mut Vec<Vec<usize>>, deep: &mut bool) {
        if current.len() >= 2 {
            groups.push(std::mem::take(current));
        } else {
            current.clear();
        }
        *deep = false;
    }

    for (i, element) in elements.iter().enumerate() {
        let duration = element.duration();
        let span = cursor.advance(duration.nominal());

        let beamable = matches!(element, MusicElement::Note(_)) && duration.is_sub_beat();
        if !beamable {
            close(&mut current, &mut groups, &mut deep);
            continue;
        }

        let deep_note = duration.beam_level() >= 2;
        if !current.is_empty()
            && (deep || deep_note)
            && (span.beat_index(grid.beat) != group_beat || span.straddles(grid.beat))
        {
            close(&mut current, &mut groups, &mut deep);
        }
        if current.is_empty() {
            group_beat = span.beat_index(grid.beat);
        }
        current.push(i);
        deep |= deep_note;

        if span.ends_measure || span.crosses(grid.unit) || (deep && span.crosses(grid.beat)) {
            close(&mut current, &mut groups, &mut deep);
        }
    }
    close(&mut current, &mut groups, &mut deep);

    groups
}

/// Beam segments for each member of a group, given each member's beam
/// level. Level 1 always spans the group. A deeper level connects two
/// neighbors only when both need it; otherwise the note gets a hook
/// toward the neighbor with the higher requirement (backward on a tie,
/// unless the note is first).
pub fn beam_segments(levels: &[u8]) -> Vec<Vec<BeamSegment>> {
    let n = levels.len();
    let mut result = Vec::with_capacity(n);

    for i in 0..n {
        let mut segments = Vec::with_capacity(levels[i] as usize);
        let prev = if i > 0 { Some(levels[i - 1]) } else { None };
        let next = levels.get(i + 1).copied();

        for level in 1..=levels[i] {
            let left = prev.is_some_and(|p| p >= level);
            let right = next.is_some_and(|q| q >= level);
            let kind = match (left, right) {
                (true, true) => BeamKind::Continue,
                (false, true) => BeamKind::Begin,
                (true, false) => BeamKind::End,
                (false, false) => hook_direction(prev, next),
            };
            segments.push(BeamSegment { level, kind });
        }
        result.push(segments);
    }

    result
}

fn hook_direction(prev: Option<u8>, next: Option<u8>) -> BeamKind {
    match (prev, next) {
        (None, _) => BeamKind::ForwardHook,
        (Some(_), None) => BeamKind::BackwardHook,
        (Some(p), Some(q)) if q > p => BeamKind::ForwardHook,
        _ => BeamKind::BackwardHook,
    }
}
