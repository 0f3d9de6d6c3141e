use std::collections::BTreeMap;
use std::path::Path;

use super::plain::search_text;
use super::ExtractError;
use crate::matcher::{decode_lossy, find_all_bytes};
use crate::types::{Location, MatchRecord};

/// Binary word-processor files store body text as either 8-bit or UTF-16
/// runs, so both encodings are searched and merged by position.
pub fn search_legacy_document(
    path: &Path,
    term: &str,
    context_chars: usize,
) -> Result<Vec<MatchRecord>, ExtractError> {
    let bytes = std::fs::read(path)?;

    let mut merged: BTreeMap<usize, MatchRecord> = utf16_positions(&bytes, term)
        .into_iter()
        .map(|position| (position, MatchRecord::new(Location::Offset { position }, "")))
        .collect();

    // On a position collision the text-pass record wins.
    for record in search_text(&decode_lossy(&bytes), term, context_chars) {
        merged.insert(record.position(), record);
    }

    Ok(merged.into_values().collect())
}

/// Byte positions of the lower-cased term encoded as UTF-16LE (no BOM) in
/// the ASCII-lower-cased file bytes.
fn utf16_positions(bytes: &[u8], term: &str) -> Vec<usize> {
    let needle: Vec<u8> = term
        .to_lowercase()
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();

    find_all_bytes(&bytes.to_ascii_lowercase(), &needle)
}
