use chrono::{Local, NaiveDate};
use purr_search_core::FileResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

pub const EXPORT_HEADER: [&str; 4] = ["File", "Matches", "Details", "Path"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode row: {0}")]
    Csv(#[from] csv::Error),
}

/// Destination for exported results, one row per matching file.
pub trait ResultSink {
    fn append(&mut self, result: &FileResult) -> Result<(), ExportError>;
    fn flush(&mut self) -> Result<(), ExportError>;
}

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create(path: &Path) -> Result<Self, ExportError> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvSink<W> {
    /// Writes the header row immediately.
    pub fn from_writer(inner: W) -> Result<Self, ExportError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(EXPORT_HEADER)?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W, ExportError> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn append(&mut self, result: &FileResult) -> Result<(), ExportError> {
        let count = result.match_count.to_string();
        let path = result.path.to_string_lossy();
        self.writer.write_record([
            result.file_name.as_str(),
            count.as_str(),
            result.details.as_str(),
            path.as_ref(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Append-only record of the results a scan produced, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    results: Vec<FileResult>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[FileResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.results.iter().map(|r| r.match_count).sum()
    }

    pub fn export_to(&self, sink: &mut dyn ResultSink) -> Result<usize, ExportError> {
        for result in &self.results {
            sink.append(result)?;
        }
        sink.flush()?;
        Ok(self.results.len())
    }
}

pub fn export_name_for(date: NaiveDate) -> String {
    format!("search_results_{}.csv", date.format("%Y-%m-%d"))
}

pub fn default_export_name() -> String {
    export_name_for(Local::now().date_naive())
}
