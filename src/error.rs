//! Error types for importing scores and computing layouts.
//!
//! Layout failures carry the index of the offending element so the caller
//! can point at it (reject the edit, highlight the note). Import failures
//! are reported separately because they happen before a `Score` exists.

use thiserror::Error;

/// What went wrong while laying out a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutErrorKind {
    /// Duration is zero, negative, NaN or infinite
    #[error("invalid duration")]
    InvalidDuration,

    /// Octave or alteration outside the supported range
    #[error("invalid pitch")]
    InvalidPitch,

    /// Time signature with a zero numerator or denominator
    #[error("invalid time signature")]
    InvalidTimeSignature,

    /// Layout options with a non-positive width or length
    #[error("invalid layout options")]
    InvalidOptions,

    /// An engine invariant did not hold (indicates a bug)
    #[error("internal inconsistency")]
    InternalInconsistency,
}

/// A structured layout failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{}: {detail}", location(.element_index))]
pub struct LayoutError {
    pub kind: LayoutErrorKind,
    /// Index into `Score::elements`, when the failure belongs to one element
    pub element_index: Option<usize>,
    pub detail: String,
}

fn location(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at element {i}"),
        None => String::new(),
    }
}

impl LayoutError {
    pub fn at(kind: LayoutErrorKind, index: usize, detail: impl Into<String>) -> Self {
        Self {
            kind,
            element_index: Some(index),
            detail: detail.into(),
        }
    }

    pub fn score(kind: LayoutErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            element_index: None,
            detail: detail.into(),
        }
    }
}

/// Failures while reading an exercise, MusicXML or MXL document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid pitch '{0}'")]
    InvalidPitch(String),

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("unknown clef '{0}'")]
    UnknownClef(String),

    #[error("invalid time signature '{0}'")]
    InvalidTimeSignature(String),

    #[error("invalid key signature '{0}'")]
    InvalidKey(String),

    #[error("unknown element type '{0}'")]
    UnknownElement(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("MXL archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unsupported document: {0}")]
    Unsupported(String),
}

/// Either stage of the bytes-to-layout pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}
