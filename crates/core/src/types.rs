use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONTEXT_CHARS: usize = 32;
pub const DEFAULT_SHEET_MATCH_LIMIT: usize = 10;

/// Which extraction algorithm applies to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    PlainText,
    LegacyLog,
    LegacySpreadsheet,
    LegacyDocument,
    ModernDocumentDocx,
    ModernDocumentDocm,
    ModernSpreadsheet,
    Pdf,
    Diagram,
    Skip,
}

impl StrategyTag {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::LegacyLog => "log",
            Self::LegacySpreadsheet => "xls",
            Self::LegacyDocument => "doc",
            Self::ModernDocumentDocx => "docx",
            Self::ModernDocumentDocm => "docm",
            Self::ModernSpreadsheet => "xlsx",
            Self::Pdf => "pdf",
            Self::Diagram => "vsdx",
            Self::Skip => "skip",
        }
    }

    pub fn is_searchable(&self) -> bool {
        !matches!(self, Self::Skip)
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Where a match was found, in the unit the extractor reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Context { position: usize },
    Line { number: usize },
    SheetCell { sheet: String, row: usize, column: usize },
    MoreInSheet { sheet: String },
    SheetCoordinate { sheet: String, coordinate: String },
    Paragraph { index: usize },
    Offset { position: usize },
    Page { number: usize },
    PageName { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub location: Location,
    pub text: String,
}

impl MatchRecord {
    pub fn new(location: Location, text: impl Into<String>) -> Self {
        Self {
            location,
            text: text.into(),
        }
    }

    /// Ordering key within one file. Cell locations have no single scalar
    /// key and report 0; their extractors already emit in sheet order.
    pub fn position(&self) -> usize {
        match &self.location {
            Location::Context { position } | Location::Offset { position } => *position,
            Location::Line { number } | Location::Page { number } => *number,
            Location::Paragraph { index } => *index,
            Location::SheetCell { .. }
            | Location::MoreInSheet { .. }
            | Location::SheetCoordinate { .. }
            | Location::PageName { .. } => 0,
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Location::Context { .. } => write!(f, "CONTEXT: '{}'", self.text),
            Location::Line { number } => write!(f, "Line {}: {}", number, self.text),
            Location::SheetCell { sheet, row, column } => write!(
                f,
                "Sheet: '{}' | Row: {} | Cell: {} | Value: {}",
                sheet, row, column, self.text
            ),
            Location::MoreInSheet { .. } => f.write_str("[... more results in this sheet]"),
            Location::SheetCoordinate { sheet, coordinate } => write!(
                f,
                "Sheet: '{}' | Cell: {} | Content: {}",
                sheet, coordinate, self.text
            ),
            Location::Paragraph { index } => {
                write!(f, "Paragraph: {} | Text: {}", index, self.text)
            }
            Location::Offset { position } if self.text.is_empty() => {
                write!(f, "Position: {}", position)
            }
            Location::Offset { position } => write!(f, "Position: {} | {}", position, self.text),
            Location::Page { number } => write!(f, "Page {}:\n{}\n", number, self.text),
            Location::PageName { name } => f.write_str(name),
        }
    }
}

/// All matches for one file, flattened for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub file_name: String,
    pub path: PathBuf,
    pub match_count: usize,
    pub details: String,
}

impl FileResult {
    pub const DETAILS_DELIMITER: &'static str = "\n";

    pub fn from_records(path: &Path, records: &[MatchRecord]) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let details = records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(Self::DETAILS_DELIMITER);

        Self {
            file_name,
            path: path.to_path_buf(),
            match_count: records.len(),
            details,
        }
    }
}

/// One unit of the one-way stream from a scan to its consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ScanEvent {
    Status(String),
    StatusBar(String),
    Progress { percent: u8, label: String },
    FileResult(FileResult),
    Error(String),
    Complete,
    Cancelled,
}

impl ScanEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }
}

/// How a scan run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed {
        matched_files: usize,
        processed_files: usize,
        elapsed: Duration,
    },
    Cancelled {
        processed_files: usize,
    },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub context_chars: usize,
    pub sheet_match_limit: usize,
    /// Only the log extractor honours this; all other formats fold case.
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            sheet_match_limit: DEFAULT_SHEET_MATCH_LIMIT,
            case_sensitive: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("search term must not be empty")]
    EmptyTerm,
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    root: PathBuf,
    term: String,
    options: SearchOptions,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>, term: impl Into<String>) -> Result<Self, RequestError> {
        let root = root.into();
        let term = term.into();

        if term.is_empty() {
            return Err(RequestError::EmptyTerm);
        }
        if !root.is_dir() {
            return Err(RequestError::NotADirectory(root));
        }

        Ok(Self {
            root,
            term,
            options: SearchOptions::default(),
        })
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.options.context_chars = context_chars;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.options.case_sensitive = case_sensitive;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }
}
