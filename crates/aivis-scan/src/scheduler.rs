//! Batch scan scheduling.
//!
//! Keywords are processed in consecutive windows of a small fixed size:
//! scans inside a window run in parallel, windows themselves are strictly
//! sequential, and the whole window settles before the next one starts. This
//! bounds fan-out against the external provider without serializing the
//! batch.

use std::time::Duration;

use futures::future;
use tokio::sync::mpsc;

use crate::error::ScanError;
use crate::executor::{ScanExecutor, SurfaceProvider};
use crate::types::{BatchProgress, KeywordSnapshot, KeywordSpec};

/// Per-keyword scan entry point the scheduler drives.
///
/// Implemented by [`ScanExecutor`]; tests substitute fakes to control
/// per-keyword outcomes and observe scheduling behavior.
pub trait KeywordScanner {
    fn scan_one(
        &self,
        keyword: &KeywordSpec,
        domain: &str,
    ) -> impl std::future::Future<Output = Result<KeywordSnapshot, ScanError>> + Send;
}

impl<P: SurfaceProvider + Sync> KeywordScanner for ScanExecutor<P> {
    async fn scan_one(
        &self,
        keyword: &KeywordSpec,
        domain: &str,
    ) -> Result<KeywordSnapshot, ScanError> {
        ScanExecutor::scan_one(self, keyword, domain).await
    }
}

/// Drives a batch of keyword scans window-by-window.
pub struct BatchScheduler {
    window_size: usize,
    inter_window_delay: Duration,
}

impl BatchScheduler {
    /// `window_size` is clamped to at least 1. `inter_window_delay` is an
    /// optional pause between windows to stay under the provider's rate
    /// limit; zero disables it.
    #[must_use]
    pub fn new(window_size: usize, inter_window_delay: Duration) -> Self {
        Self {
            window_size: window_size.max(1),
            inter_window_delay,
        }
    }

    /// Scans every keyword and returns the merged result list.
    ///
    /// Guarantees:
    /// - every input keyword yields exactly one entry — a real snapshot or a
    ///   failed placeholder; one bad keyword never aborts the batch;
    /// - results merge by keyword id (replace-if-present, else append), so a
    ///   keyword scanned twice in one run keeps only its latest snapshot;
    /// - one [`BatchProgress`] event is published per settled window.
    ///
    /// If the progress receiver is dropped the scheduler stops after the
    /// window currently in flight: that window still settles (per-call
    /// timeouts bound its latency), its results are discarded along with the
    /// rest of the run, and no spawned work is left behind.
    pub async fn run<S: KeywordScanner>(
        &self,
        scanner: &S,
        keywords: &[KeywordSpec],
        domain: &str,
        progress: Option<&mpsc::UnboundedSender<BatchProgress>>,
    ) -> Vec<KeywordSnapshot> {
        let total = keywords.len();
        let mut results: Vec<KeywordSnapshot> = Vec::with_capacity(total);
        let mut completed = 0_usize;

        let mut windows = keywords.chunks(self.window_size).peekable();
        while let Some(window) = windows.next() {
            let outcomes = future::join_all(
                window
                    .iter()
                    .map(|keyword| async move { (keyword, scanner.scan_one(keyword, domain).await) }),
            )
            .await;

            for (keyword, outcome) in outcomes {
                let snapshot = match outcome {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!(
                            keyword = %keyword.term,
                            error = %e,
                            "keyword scan failed; substituting placeholder"
                        );
                        KeywordSnapshot::failed_placeholder(keyword, domain)
                    }
                };
                merge_result(&mut results, snapshot);
            }

            completed += window.len();

            if let Some(tx) = progress {
                if tx
                    .send(BatchProgress { completed, total })
                    .is_err()
                {
                    tracing::debug!(
                        completed,
                        total,
                        "progress consumer dropped; abandoning remaining windows"
                    );
                    break;
                }
            }

            if windows.peek().is_some() && !self.inter_window_delay.is_zero() {
                tokio::time::sleep(self.inter_window_delay).await;
            }
        }

        results
    }
}

/// Replace the entry with the same keyword id, or append. Last writer wins.
fn merge_result(results: &mut Vec<KeywordSnapshot>, snapshot: KeywordSnapshot) {
    match results
        .iter_mut()
        .find(|existing| existing.keyword_id == snapshot.keyword_id)
    {
        Some(existing) => *existing = snapshot,
        None => results.push(snapshot),
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
