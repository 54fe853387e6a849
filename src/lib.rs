//! stafflayout — music notation layout engine for NoteLab exercises.
//!
//! Turns a single-staff, single-voice score into render-agnostic geometry:
//! staff steps, stems, beam groups, ledger lines, ties, barlines and
//! horizontal anchors. Scores come from the exercise JSON format, from
//! MusicXML (.musicxml) or from compressed MXL (.mxl) files.
//!
//! # Example
//! ```no_run
//! use stafflayout::{layout_score, parse_file};
//!
//! let score = parse_file("path/to/exercise.json").unwrap();
//! let layout = layout_score(&score).unwrap();
//! println!("Measures: {}", layout.measure_count());
//! println!("Beam groups: {}", layout.beam_groups.len());
//! ```

pub mod duration;
pub mod error;
pub mod exercise;
pub mod layout;
pub mod model;
pub mod mxl;
pub mod parser;
pub mod pitch;
pub mod timemap;

#[cfg(target_os = "android")]
pub mod android;

use std::path::Path;

pub use duration::{Dots, Duration};
pub use error::{Error, LayoutError, LayoutErrorKind, ParseError};
pub use exercise::parse_exercise;
pub use layout::options::LayoutOptions;
pub use layout::{layout_score, layout_score_with, Layout, LayoutRecord};
pub use model::*;
pub use mxl::parse_mxl;
pub use parser::parse_musicxml;
pub use pitch::{Pitch, Step};
pub use timemap::{generate_timemap, NoteEvent};

/// Parse a score file from a path.
/// Detects the format from the file extension:
/// - `.json` → exercise JSON
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score, ParseError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse a score from raw bytes with an optional format hint.
/// Without a known extension the format is sniffed from the content.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score, ParseError> {
    let ext = extension.map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => parse_exercise(std::str::from_utf8(data)?),
        Some("musicxml") | Some("xml") => parse_musicxml(std::str::from_utf8(data)?),
        Some("mxl") => parse_mxl(data),
        _ => {
            if let Ok(text) = std::str::from_utf8(data) {
                let text = text.trim_start_matches('\u{feff}').trim_start();
                if text.starts_with('{') {
                    return parse_exercise(text);
                }
                if text.starts_with('<') {
                    return parse_musicxml(text);
                }
            }
            parse_mxl(data)
        }
    }
}

/// Parse score bytes and lay them out with the default dimensions.
pub fn layout_bytes(data: &[u8], extension: Option<&str>) -> Result<Layout, Error> {
    let score = parse_bytes(data, extension)?;
    Ok(layout_score(&score)?)
}

/// Serialize a layout for the rendering side of an FFI boundary.
pub fn layout_to_json(layout: &Layout) -> serde_json::Result<String> {
    serde_json::to_string(layout)
}

/// Parse score bytes and return the layout as JSON.
pub fn layout_bytes_to_json(data: &[u8], extension: Option<&str>) -> Result<String, String> {
    let layout = layout_bytes(data, extension).map_err(|e| e.to_string())?;
    layout_to_json(&layout).map_err(|e| format!("JSON serialization error: {e}"))
}

/// Parse score bytes and return the playback timeline as JSON.
pub fn timemap_bytes_to_json(data: &[u8], extension: Option<&str>) -> Result<String, String> {
    let score = parse_bytes(data, extension).map_err(|e| e.to_string())?;
    let events = generate_timemap(&score).map_err(|e| e.to_string())?;
    serde_json::to_string(&events).map_err(|e| format!("JSON serialization error: {e}"))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Read the FFI arguments shared by the byte-based entry points.
///
/// # Safety
/// `data` must point to `len` valid bytes. `extension` may be null.
unsafe fn ffi_args<'a>(data: *const u8, len: usize, extension: *const c_char) -> Option<(&'a [u8], Option<&'a str>)> {
    if data.is_null() || len == 0 {
        return None;
    }
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };
    let ext = if extension.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(extension) }.to_str().ok()
    };
    Some((bytes, ext))
}

fn into_c_string(result: Result<String, String>) -> *mut c_char {
    match result {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(e) => {
            log::warn!("stafflayout FFI call failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Parse score bytes and return the layout as a JSON C string.
/// The caller must free the returned string with `stafflayout_free_string`.
///
/// # Safety
/// `data` must point to `len` valid bytes. `extension` may be null.
#[no_mangle]
pub unsafe extern "C" fn stafflayout_layout_bytes(
    data: *const u8,
    len: usize,
    extension: *const c_char,
) -> *mut c_char {
    match unsafe { ffi_args(data, len, extension) } {
        Some((bytes, ext)) => into_c_string(layout_bytes_to_json(bytes, ext)),
        None => std::ptr::null_mut(),
    }
}

/// Parse score bytes and return the playback timeline as a JSON C string.
/// The caller must free the returned string with `stafflayout_free_string`.
///
/// # Safety
/// `data` must point to `len` valid bytes. `extension` may be null.
#[no_mangle]
pub unsafe extern "C" fn stafflayout_timemap_bytes(
    data: *const u8,
    len: usize,
    extension: *const c_char,
) -> *mut c_char {
    match unsafe { ffi_args(data, len, extension) } {
        Some((bytes, ext)) => into_c_string(timemap_bytes_to_json(bytes, ext)),
        None => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by stafflayout functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a stafflayout function, or null.
#[no_mangle]
pub unsafe extern "C" fn stafflayout_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_the_format_without_an_extension() {
        let json = br#"{ "measures": [ { "elements": [ { "type": "rest", "duration": 4 } ] } ] }"#;
        assert_eq!(parse_bytes(json, None).unwrap().len(), 1);

        let xml = br#"<?xml version="1.0"?><score-partwise><part-list/></score-partwise>"#;
        assert!(matches!(parse_bytes(xml, None), Err(ParseError::Unsupported(_))));

        assert!(matches!(parse_bytes(b"PK\x03\x04junk", None), Err(ParseError::Archive(_))));
    }

    #[test]
    fn extension_hint_is_case_insensitive() {
        let json = br#"{ "measures": [] }"#;
        assert!(parse_bytes(json, Some("JSON")).unwrap().is_empty());
    }

    #[test]
    fn ffi_round_trip() {
        let json = br#"{ "measures": [ { "elements": [ { "type": "note", "duration": 1, "pitch": "C4" } ] } ] }"#;
        let ext = CString::new("json").unwrap();
        unsafe {
            let out = stafflayout_layout_bytes(json.as_ptr(), json.len(), ext.as_ptr());
            assert!(!out.is_null());
            let text = CStr::from_ptr(out).to_str().unwrap().to_string();
            stafflayout_free_string(out);
            assert!(text.contains("\"records\""));

            assert!(stafflayout_layout_bytes(std::ptr::null(), 0, ext.as_ptr()).is_null());
        }
    }
}
