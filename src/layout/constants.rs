//! Shared constants for the layout engine (staff spaces unless noted).

use super::ledger::StaffBounds;

// ── Staff ───────────────────────────────────────────────────────────
pub const FIVE_LINE_STAFF: StaffBounds = StaffBounds { bottom: 2, top: 10 };
pub(super) const STEPS_PER_SPACE: f64 = 2.0;

// ── Header ──────────────────────────────────────────────────────────
pub(super) const CLEF_SPACE: f64 = 3.5; // horizontal space for the clef
pub(super) const KEY_SIG_ACCIDENTAL_SPACE: f64 = 1.0;
pub(super) const TIME_SIG_SPACE: f64 = 2.5;

// ── Horizontal spacing ──────────────────────────────────────────────
pub(super) const BEAT_WIDTH: f64 = 4.0;
pub(super) const DOT_SPACE: f64 = 1.0; // extra room per augmentation dot
pub(super) const BARLINE_GAP: f64 = 1.0;
pub(super) const MIN_STAFF_WIDTH: f64 = 20.0;

// ── Stems & beams ───────────────────────────────────────────────────
pub(super) const STEM_LENGTH: f64 = 3.5;
pub(super) const MIN_BEAMED_STEM_LENGTH: f64 = 2.5;
pub(super) const MAX_BEAM_SLOPE: f64 = 0.5; // spaces of rise per space of run

// ── Ties ────────────────────────────────────────────────────────────
pub(super) const TIE_HEIGHT_FACTOR: f64 = 0.15;
pub(super) const TIE_MIN_HEIGHT: f64 = 0.5;
pub(super) const TIE_MAX_HEIGHT: f64 = 2.5;
