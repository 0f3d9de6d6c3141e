use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cancel::CancellationToken;
use crate::classifier::classify_file;
use crate::extract::extract;
use crate::types::{FileResult, ScanEvent, ScanOutcome, SearchRequest};

const NO_EXTENSION: &str = "No extension";
const STOPPED_MESSAGE: &str = "\n\n Search stopped by user.\n";

/// Advisory file count taken before the real scan. Only used for progress
/// percentages; the tree may change between the two walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Estimate {
    pub total_files: usize,
    pub by_type: BTreeMap<String, usize>,
    pub log_files: usize,
}

impl Estimate {
    pub fn summary(&self) -> String {
        let mut message = format!(
            "Searching in {} files.\nThis may take a while depending on the number of files.\n\nFILES COUNT BY TYPE:",
            self.total_files
        );

        for (ext, count) in &self.by_type {
            let label = if ext.is_empty() { NO_EXTENSION } else { ext };
            message.push_str(&format!("\n{}: {}", label, count));
        }

        if self.log_files > 0 {
            message.push_str(&format!(
                "\n\nTotal log files (including compressed): {}",
                self.log_files
            ));
        }

        message
    }
}

/// Walk `root` counting files the scan will search.
pub fn estimate(root: &Path) -> Result<Estimate, walkdir::Error> {
    let mut estimate = Estimate::default();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err),
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let classification = classify_file(entry.path());
        if !classification.strategy.is_searchable() {
            continue;
        }

        let key = if classification.is_log {
            estimate.log_files += 1;
            let gzipped = entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(".gz");
            let key = if gzipped { "log.gz" } else { "log" };
            key.to_string()
        } else {
            classification.extension
        };

        estimate.total_files += 1;
        *estimate.by_type.entry(key).or_default() += 1;
    }

    Ok(estimate)
}

struct ScanState<'a> {
    tx: &'a Sender<ScanEvent>,
    total: usize,
    processed: usize,
    matched: usize,
    last_percent: u8,
    disconnected: bool,
}

impl<'a> ScanState<'a> {
    fn new(tx: &'a Sender<ScanEvent>) -> Self {
        Self {
            tx,
            total: 0,
            processed: 0,
            matched: 0,
            last_percent: 0,
            disconnected: false,
        }
    }

    fn emit(&mut self, event: ScanEvent) {
        if self.tx.send(event).is_err() {
            self.disconnected = true;
        }
    }

    fn progress(&mut self, percent: u8, label: impl Into<String>) {
        self.last_percent = percent;
        self.emit(ScanEvent::Progress {
            percent,
            label: label.into(),
        });
    }

    /// processed/total, clamped so a stale estimate never overshoots.
    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.processed * 100 / self.total).min(100) as u8
    }

    fn cancel(mut self) -> ScanOutcome {
        info!(processed = self.processed, "scan cancelled");
        self.emit(ScanEvent::Status(STOPPED_MESSAGE.to_string()));
        self.progress(100, "Stopped");
        self.emit(ScanEvent::Cancelled);
        ScanOutcome::Cancelled {
            processed_files: self.processed,
        }
    }

    fn fail(mut self, message: String) -> ScanOutcome {
        warn!(%message, "scan failed");
        self.emit(ScanEvent::Error(message.clone()));
        ScanOutcome::Failed(message)
    }
}

/// Runs one scan to completion on the calling thread, emitting events in
/// order on `tx`. A dropped receiver is treated like a cancellation.
pub fn run_scan(
    request: &SearchRequest,
    token: &CancellationToken,
    tx: &Sender<ScanEvent>,
) -> ScanOutcome {
    let started = Instant::now();
    let root = request.root();
    let mut state = ScanState::new(tx);

    info!(root = %root.display(), term = request.term(), "scan started");

    let estimate = match estimate(root) {
        Ok(estimate) => estimate,
        Err(err) => return state.fail(format!("Search failed with error: {}", err)),
    };
    state.total = estimate.total_files;
    state.emit(ScanEvent::Status(estimate.summary()));
    state.progress(0, "0%");

    if token.is_cancelled() {
        return state.cancel();
    }

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return state.fail(format!("Search failed with error: {}", err))
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                state.emit(ScanEvent::Error(format!("Error reading directory entry: {}", err)));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        if token.is_cancelled() || state.disconnected {
            return state.cancel();
        }

        let path = entry.path();
        let strategy = classify_file(path).strategy;
        if !strategy.is_searchable() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        state.emit(ScanEvent::StatusBar(format!("Searching in file: {}", file_name)));
        debug!(path = %path.display(), %strategy, "searching file");

        match extract(strategy, path, request.term(), request.options()) {
            Ok(records) if !records.is_empty() => {
                state.matched += 1;
                state.emit(ScanEvent::FileResult(FileResult::from_records(path, &records)));
            }
            Ok(_) => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "extraction failed");
                state.emit(ScanEvent::Error(format!(
                    "Error processing {}: {}",
                    path.display(),
                    err
                )));
            }
        }

        state.processed += 1;
        let percent = state.percent();
        state.progress(percent, format!("{}%", percent));
    }

    if state.last_percent < 100 {
        state.progress(100, "100%");
    }

    let elapsed = started.elapsed();
    info!(
        matched = state.matched,
        processed = state.processed,
        elapsed_ms = elapsed.as_millis() as u64,
        "scan finished"
    );
    state.emit(ScanEvent::Status(format!(
        "\n\nSearch finished in {:.3} seconds. {} files found with matches.",
        elapsed.as_secs_f64(),
        state.matched
    )));
    state.emit(ScanEvent::Complete);

    ScanOutcome::Completed {
        matched_files: state.matched,
        processed_files: state.processed,
        elapsed,
    }
}
