use std::path::Path;

use super::ExtractError;
use crate::matcher::{find_all_str, window};
use crate::types::{Location, MatchRecord};

/// Every occurrence on every page, with an un-highlighted context window.
pub fn search_pdf(
    path: &Path,
    term: &str,
    context_chars: usize,
) -> Result<Vec<MatchRecord>, ExtractError> {
    let doc = lopdf::Document::load(path)?;
    if doc.is_encrypted() {
        return Err(ExtractError::Format("encrypted PDF".to_string()));
    }

    let needle = term.to_lowercase();
    let mut records = Vec::new();

    // get_pages is keyed by 1-based page number
    for page_number in doc.get_pages().into_keys() {
        let text = doc.extract_text(&[page_number])?.to_lowercase();
        records.extend(page_matches(&text, &needle, context_chars, page_number as usize));
    }

    Ok(records)
}

fn page_matches(text: &str, needle: &str, context_chars: usize, page: usize) -> Vec<MatchRecord> {
    find_all_str(text, needle)
        .into_iter()
        .map(|pos| {
            MatchRecord::new(
                Location::Page { number: page },
                window(text, pos, needle.len(), context_chars).trim(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use tempfile::TempDir;

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 700.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "Resources" => resources_id,
                })
                .into()
            })
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn reports_page_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manual.pdf");
        write_pdf(&path, &["Nothing here", "Install FindMe first"]);

        let records = search_pdf(&path, "findme", 32).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, Location::Page { number: 2 });
        assert!(records[0].text.contains("install findme first"));
    }

    #[test]
    fn page_window_is_trimmed() {
        let records = page_matches("  lead findme tail  \n", "findme", 32, 4);
        assert_eq!(records[0].text, "lead findme tail");
        assert_eq!(records[0].to_string(), "Page 4:\nlead findme tail\n");
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 garbage").unwrap();

        assert!(search_pdf(&path, "x", 32).is_err());
    }
}
