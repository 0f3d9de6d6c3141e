use std::path::Path;

use super::ooxml::{open_archive, paragraphs, read_entry, ParagraphScope};
use super::ExtractError;
use crate::matcher::{contains_ignore_case, find_all_str};
use crate::types::{Location, MatchRecord};

const DOCUMENT_PART: &str = "word/document.xml";

/// One record per body paragraph containing the term, numbered from 1 over
/// all body paragraphs (empty ones included).
pub fn search_docx(path: &Path, term: &str) -> Result<Vec<MatchRecord>, ExtractError> {
    let mut archive = open_archive(path)?;
    let xml = read_entry(&mut archive, DOCUMENT_PART)?;

    Ok(paragraphs(&xml, ParagraphScope::Body)?
        .into_iter()
        .enumerate()
        .filter(|(_, text)| contains_ignore_case(text, term))
        .map(|(i, text)| MatchRecord::new(Location::Paragraph { index: i + 1 }, text))
        .collect())
}

/// Flattens every paragraph of the body into one lower-cased string and
/// reports the character offset of each occurrence.
pub fn search_docm(path: &Path, term: &str) -> Result<Vec<MatchRecord>, ExtractError> {
    let mut archive = open_archive(path)?;
    let xml = read_entry(&mut archive, DOCUMENT_PART)?;

    let text = paragraphs(&xml, ParagraphScope::All)?
        .join("\n")
        .to_lowercase();

    Ok(char_offsets(&text, &find_all_str(&text, &term.to_lowercase()))
        .into_iter()
        .map(|position| MatchRecord::new(Location::Offset { position }, ""))
        .collect())
}

/// Converts ascending byte offsets into character offsets in one pass.
fn char_offsets(text: &str, byte_offsets: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(byte_offsets.len());
    let mut chars = 0;
    let mut last = 0;
    for &pos in byte_offsets {
        chars += text[last..pos].chars().count();
        last = pos;
        out.push(chars);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::ooxml::fixtures::{document_xml, para, write_zip};
    use super::*;
    use tempfile::TempDir;

    fn sample_body() -> String {
        format!(
            "{}{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            para("Introduction"),
            para("The FindMe clause"),
            para("cell findme"),
            para("closing findme and findme")
        )
    }

    #[test]
    fn docx_reports_body_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contract.docx");
        write_zip(&path, &[(DOCUMENT_PART, &document_xml(&sample_body()))]);

        let records = search_docx(&path, "findme").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].to_string(),
            "Paragraph: 2 | Text: The FindMe clause"
        );
        assert_eq!(records[1].location, Location::Paragraph { index: 3 });
    }

    #[test]
    fn docm_reports_every_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("macro.docm");
        write_zip(&path, &[(DOCUMENT_PART, &document_xml(&sample_body()))]);

        let records = search_docm(&path, "FINDME").unwrap();
        let offsets: Vec<_> = records.iter().map(MatchRecord::position).collect();

        // "introduction\nthe findme clause\ncell findme\nclosing findme and findme"
        assert_eq!(offsets, vec![17, 36, 51, 62]);
    }

    #[test]
    fn offsets_count_characters() {
        assert_eq!(char_offsets("ééx x", &[4, 6]), vec![2, 4]);
    }

    #[test]
    fn missing_document_part() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.docx");
        write_zip(&path, &[("other.xml", "<x/>")]);

        assert!(matches!(
            search_docx(&path, "x"),
            Err(ExtractError::Zip(_))
        ));
    }
}
