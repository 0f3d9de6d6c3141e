use purr_search_core::{FileResult, ScanEvent};

use crate::export::ResultLog;

/// Front-end state folded from a scan's event stream.
#[derive(Debug, Clone, Default)]
pub struct ScanView {
    pub results: ResultLog,
    /// Status and error messages in arrival order.
    pub transcript: Vec<String>,
    pub status_bar: String,
    pub percent: u8,
    pub progress_label: String,
    pub errors: usize,
    pub finished: bool,
    pub cancelled: bool,
}

impl ScanView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::Status(message) => self.transcript.push(message.clone()),
            ScanEvent::StatusBar(message) => self.status_bar = message.clone(),
            ScanEvent::Progress { percent, label } => {
                self.percent = *percent;
                self.progress_label = label.clone();
            }
            ScanEvent::FileResult(result) => self.results.append(result.clone()),
            ScanEvent::Error(message) => {
                self.errors += 1;
                self.transcript.push(message.clone());
            }
            ScanEvent::Complete => self.finished = true,
            ScanEvent::Cancelled => {
                self.finished = true;
                self.cancelled = true;
            }
        }
    }
}

pub fn format_result(result: &FileResult) -> String {
    format!(
        "## {} ({} matches)\n{}\n{}\n",
        result.file_name,
        result.match_count,
        result.path.display(),
        result.details
    )
}

pub fn format_results(results: &[FileResult], term: &str) -> String {
    if results.is_empty() {
        return format!("No matches found for \"{}\".\n", term);
    }

    let mut output = format!("Found \"{}\" in {} files:\n\n", term, results.len());
    for result in results {
        output.push_str(&format_result(result));
        output.push('\n');
    }
    output
}

/// One JSON object per line, for piping into other tools.
pub fn event_json(event: &ScanEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> FileResult {
        FileResult {
            file_name: "notes.txt".into(),
            path: PathBuf::from("/docs/notes.txt"),
            match_count: 1,
            details: "CONTEXT: 'a [MATCH: b] c'".into(),
        }
    }

    #[test]
    fn view_folds_events() {
        let mut view = ScanView::new();
        let events = [
            ScanEvent::Status("Searching in 1 files.".into()),
            ScanEvent::Progress {
                percent: 0,
                label: "0%".into(),
            },
            ScanEvent::StatusBar("Searching in file: notes.txt".into()),
            ScanEvent::FileResult(sample()),
            ScanEvent::Error("Error processing /docs/x.pdf: bad".into()),
            ScanEvent::Progress {
                percent: 100,
                label: "100%".into(),
            },
            ScanEvent::Complete,
        ];
        for event in &events {
            view.apply(event);
        }

        assert_eq!(view.results.len(), 1);
        assert_eq!(view.transcript.len(), 2);
        assert_eq!(view.errors, 1);
        assert_eq!(view.percent, 100);
        assert_eq!(view.status_bar, "Searching in file: notes.txt");
        assert!(view.finished);
        assert!(!view.cancelled);
    }

    #[test]
    fn cancelled_view() {
        let mut view = ScanView::new();
        view.apply(&ScanEvent::Cancelled);
        assert!(view.finished && view.cancelled);
    }

    #[test]
    fn formats_results() {
        let output = format_results(&[sample()], "b");
        assert!(output.starts_with("Found \"b\" in 1 files:"));
        assert!(output.contains("## notes.txt (1 matches)\n/docs/notes.txt\n"));
        assert_eq!(format_results(&[], "b"), "No matches found for \"b\".\n");
    }

    #[test]
    fn events_serialize_tagged() {
        let json = event_json(&ScanEvent::Progress {
            percent: 50,
            label: "50%".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"event":"progress","data":{"percent":50,"label":"50%"}}"#
        );
        assert_eq!(
            event_json(&ScanEvent::Complete).unwrap(),
            r#"{"event":"complete"}"#
        );
    }
}
