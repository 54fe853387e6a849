//! Running beat position through an element sequence.
//!
//! Beam grouping and barline scheduling both need to know whether an
//! element ends on (or runs past) a beat or measure boundary. Beat
//! boundaries are counted from the start of the current measure, so odd
//! meters like 5/8 restart the beat grid at every barline.

use crate::duration::BEAT_EPSILON;
use crate::model::TimeSignature;

/// Where one element sits relative to the current measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Span {
    /// Offsets from the start of the measure the element began in
    rel_start: f64,
    rel_end: f64,
    pub(crate) ends_measure: bool,
}

impl Span {
    /// True when the element ends on or runs past a multiple of `grid`.
    pub(crate) fn crosses(&self, grid: f64) -> bool {
        ((self.rel_end + BEAT_EPSILON) / grid).floor() > ((self.rel_start + BEAT_EPSILON) / grid).floor()
    }

    /// Which `grid` beat of the measure the element starts in.
    pub(crate) fn beat_index(&self, grid: f64) -> f64 {
        ((self.rel_start + BEAT_EPSILON) / grid).floor()
    }

    /// True when the element runs past the end of the beat it starts in.
    pub(crate) fn straddles(&self, grid: f64) -> bool {
        self.rel_end > (self.beat_index(grid) + 1.0) * grid + BEAT_EPSILON
    }
}

/// Beat lengths that bound beam groups, in quarter-note beats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BeamGrid {
    /// Groups holding sixteenths or shorter close here
    pub(crate) beat: f64,
    /// Every group closes here
    pub(crate) unit: f64,
}

impl BeamGrid {
    /// Common and cut time let plain eighths run over half a bar;
    /// compound meters beam by the dotted quarter.
    pub(crate) fn for_time(time: TimeSignature) -> Self {
        match (time.beats, time.beat_type) {
            (4, 4) | (2, 2) => Self { beat: 1.0, unit: 2.0 },
            (beats, 8) if beats % 3 == 0 => Self { beat: 1.5, unit: 1.5 },
            _ => Self { beat: 1.0, unit: 1.0 },
        }
    }
}

pub(crate) struct BeatCursor {
    measure_length: f64,
    measure_start: f64,
    position: f64,
}

impl BeatCursor {
    pub(crate) fn new(measure_length: f64) -> Self {
        Self {
            measure_length,
            measure_start: 0.0,
            position: 0.0,
        }
    }

    /// Advance by a nominal duration and report the boundaries reached.
    pub(crate) fn advance(&mut self, beats: f64) -> Span {
        let start = self.position;
        let end = start + beats;
        let rel_start = start - self.measure_start;
        let rel_end = end - self.measure_start;

        let measures_done = ((rel_end + BEAT_EPSILON) / self.measure_length).floor();
        let ends_measure = measures_done >= 1.0;
        if ends_measure {
            self.measure_start += measures_done * self.measure_length;
        }
        self.position = end;

        Span {
            rel_start,
            rel_end,
            ends_measure,
        }
    }
}
