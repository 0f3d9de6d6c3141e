use std::path::Path;

use super::ExtractError;
use crate::matcher::{decode_lossy, find_matches};
use crate::types::{Location, MatchRecord};

pub fn search_plain_text(
    path: &Path,
    term: &str,
    context_chars: usize,
) -> Result<Vec<MatchRecord>, ExtractError> {
    let bytes = std::fs::read(path)?;
    Ok(search_text(&decode_lossy(&bytes), term, context_chars))
}

pub(crate) fn search_text(content: &str, term: &str, context_chars: usize) -> Vec<MatchRecord> {
    find_matches(content, term, context_chars)
        .into_iter()
        .map(|m| MatchRecord::new(Location::Context { position: m.position }, m.context))
        .collect()
}
