//! MXL import for compressed MusicXML archives.
//!
//! An .mxl file is a ZIP archive whose `META-INF/container.xml` names the
//! root MusicXML file. Archives without a container fall back to the first
//! `.xml`/`.musicxml` entry outside `META-INF/`.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::ParseError;
use crate::model::Score;
use crate::parser;

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Read and parse a .mxl file from raw bytes.
pub fn parse_mxl(data: &[u8]) -> Result<Score, ParseError> {
    let xml = extract_musicxml(data)?;
    parser::parse_musicxml(&xml)
}

/// Extract the root MusicXML document from .mxl bytes.
pub fn extract_musicxml(data: &[u8]) -> Result<String, ParseError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let root_path = root_file_path(&mut archive)?;
    log::debug!("MXL root file: {root_path}");
    read_entry(&mut archive, &root_path)
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String, ParseError> {
    let mut entry = archive.by_name(name)?;
    let mut text = String::new();
    entry.read_to_string(&mut text)?;
    Ok(text)
}

fn root_file_path(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, ParseError> {
    let has_container = archive.file_names().any(|n| n == CONTAINER_PATH);
    if has_container {
        let container = read_entry(archive, CONTAINER_PATH)?;
        let doc = roxmltree::Document::parse(&container)?;
        return doc
            .descendants()
            .find(|n| n.tag_name().name() == "rootfile")
            .and_then(|n| n.attribute("full-path"))
            .map(str::to_string)
            .ok_or_else(|| ParseError::Unsupported("no rootfile in container.xml".to_string()));
    }

    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    names
        .iter()
        .find(|n| !n.starts_with("META-INF/") && (n.ends_with(".xml") || n.ends_with(".musicxml")))
        .map(|n| n.to_string())
        .ok_or_else(|| ParseError::Unsupported(format!("no MusicXML file in archive: {names:?}")))
}
