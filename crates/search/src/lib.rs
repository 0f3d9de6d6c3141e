pub mod config;
pub mod export;
pub mod history;
pub mod report;

pub use config::{config_dir, default_config_path, Config};
pub use export::{
    default_export_name, export_name_for, CsvSink, ExportError, ResultLog, ResultSink,
    EXPORT_HEADER,
};
pub use history::{HistoryError, HistoryStore, JsonHistory, MemoryHistory, DEFAULT_HISTORY_LIMIT};
pub use report::{event_json, format_result, format_results, ScanView};
