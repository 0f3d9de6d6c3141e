mod diagram;
mod document;
mod legacy_doc;
mod log;
mod ooxml;
mod pdf;
mod plain;
mod sheet;

use std::path::Path;
use thiserror::Error;

use crate::types::{MatchRecord, SearchOptions, StrategyTag};

pub use diagram::search_diagram;
pub use document::{search_docm, search_docx};
pub use legacy_doc::search_legacy_document;
pub use log::search_log;
pub use pdf::search_pdf;
pub use plain::search_plain_text;
pub use sheet::{search_xls, search_xlsx};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),
    #[error("failed to parse PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("unsupported structure: {0}")]
    Format(String),
}

/// Run the extractor for `strategy` against one file.
pub fn extract(
    strategy: StrategyTag,
    path: &Path,
    term: &str,
    options: &SearchOptions,
) -> Result<Vec<MatchRecord>, ExtractError> {
    match strategy {
        StrategyTag::PlainText => search_plain_text(path, term, options.context_chars),
        StrategyTag::LegacyLog => search_log(path, term, options.case_sensitive),
        StrategyTag::LegacySpreadsheet => search_xls(path, term, options.sheet_match_limit),
        StrategyTag::LegacyDocument => search_legacy_document(path, term, options.context_chars),
        StrategyTag::ModernDocumentDocx => search_docx(path, term),
        StrategyTag::ModernDocumentDocm => search_docm(path, term),
        StrategyTag::ModernSpreadsheet => search_xlsx(path, term),
        StrategyTag::Pdf => search_pdf(path, term, options.context_chars),
        StrategyTag::Diagram => search_diagram(path, term),
        StrategyTag::Skip => Ok(Vec::new()),
    }
}
