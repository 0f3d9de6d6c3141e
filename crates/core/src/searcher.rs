use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tracing::error;

use crate::cancel::CancellationToken;
use crate::scan::run_scan;
use crate::types::{ScanEvent, ScanOutcome, SearchRequest};

const PANIC_MESSAGE: &str = "Internal error: scan thread panicked unexpectedly";

struct ActiveScan {
    token: CancellationToken,
    handle: JoinHandle<ScanOutcome>,
}

/// Owns at most one background scan. Events arrive on the receiver handed
/// out by [`Searcher::start`]; the outcome is collected with `stop` or `wait`.
#[derive(Default)]
pub struct Searcher {
    active: Option<ActiveScan>,
}

impl Searcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a scan. Returns `None` while a previous scan is still running.
    pub fn start(&mut self, request: SearchRequest) -> Option<Receiver<ScanEvent>> {
        if self.is_running() {
            return None;
        }
        // a finished scan whose outcome nobody collected
        if let Some(previous) = self.active.take() {
            let _ = previous.handle.join();
        }

        let (tx, rx) = mpsc::channel();
        let token = CancellationToken::new();
        let worker_token = token.clone();

        let handle = thread::spawn(move || {
            let panic_tx = tx.clone();
            let result = catch_unwind(AssertUnwindSafe(|| run_scan(&request, &worker_token, &tx)));
            result.unwrap_or_else(|_| {
                error!("scan thread panicked");
                let _ = panic_tx.send(ScanEvent::Error(PANIC_MESSAGE.to_string()));
                ScanOutcome::Failed(PANIC_MESSAGE.to_string())
            })
        });

        self.active = Some(ActiveScan { token, handle });
        Some(rx)
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|scan| !scan.handle.is_finished())
    }

    /// Request cancellation without waiting. Safe to call at any time.
    pub fn cancel(&self) {
        if let Some(scan) = &self.active {
            scan.token.cancel();
        }
    }

    /// Token of the current scan, for cancelling from another thread such
    /// as a signal handler.
    pub fn cancellation_token(&self) -> Option<CancellationToken> {
        self.active.as_ref().map(|scan| scan.token.clone())
    }

    /// Cancel and block until the worker exits.
    pub fn stop(&mut self) -> Option<ScanOutcome> {
        self.cancel();
        self.wait()
    }

    /// Block until the current scan finishes on its own.
    pub fn wait(&mut self) -> Option<ScanOutcome> {
        let scan = self.active.take()?;
        Some(
            scan.handle
                .join()
                .unwrap_or_else(|_| ScanOutcome::Failed(PANIC_MESSAGE.to_string())),
        )
    }
}

impl Drop for Searcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
