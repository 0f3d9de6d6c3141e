pub mod cancel;
pub mod classifier;
pub mod extract;
pub mod matcher;
pub mod scan;
pub mod searcher;
#[cfg(test)]
mod testutils;
pub mod types;

pub use cancel::CancellationToken;
pub use classifier::{classify, classify_file, is_log, is_temp_file, FileClassification};
pub use extract::{extract, ExtractError};
pub use matcher::{find_matches, highlight, TextMatch};
pub use scan::{estimate, run_scan, Estimate};
pub use searcher::Searcher;
pub use types::{
    FileResult, Location, MatchRecord, RequestError, ScanEvent, ScanOutcome, SearchOptions,
    SearchRequest, StrategyTag, DEFAULT_CONTEXT_CHARS, DEFAULT_SHEET_MATCH_LIMIT,
};
