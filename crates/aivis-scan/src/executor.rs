//! Per-keyword scan execution.
//!
//! Fetches the three surfaces concurrently, extracts the domain's rank from
//! each, and assembles one [`KeywordSnapshot`]. A failed surface degrades to
//! "not cited" — the scan as a whole fails only when every surface fails or
//! an input is invalid.

use std::time::Instant;

use aivis_serp::{FetchedSurfaces, SerpClient};

use crate::error::ScanError;
use crate::rank::{find_rank, RankMatch};
use crate::types::{AiModeStatus, KeywordSnapshot, KeywordSpec, ScanStatus};

/// Source of the three per-keyword surface fetches.
///
/// The production implementation is [`SerpClient`]; tests substitute a fake
/// returning canned [`FetchedSurfaces`].
pub trait SurfaceProvider {
    fn fetch_all(
        &self,
        keyword: &str,
        location: &str,
    ) -> impl std::future::Future<Output = FetchedSurfaces> + Send;
}

impl SurfaceProvider for SerpClient {
    async fn fetch_all(&self, keyword: &str, location: &str) -> FetchedSurfaces {
        SerpClient::fetch_all(self, keyword, location).await
    }
}

/// Executes single-keyword scans against an injected provider.
pub struct ScanExecutor<P> {
    provider: P,
}

impl<P: SurfaceProvider> ScanExecutor<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Scans one keyword and returns its reconciled snapshot.
    ///
    /// Persistence is the caller's responsibility — this computes, it does
    /// not store.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Validation`] if the keyword term or domain is empty;
    ///   raised before any network call.
    /// - [`ScanError::AllSourcesFailed`] if none of the three surface fetches
    ///   succeeded.
    pub async fn scan_one(
        &self,
        keyword: &KeywordSpec,
        domain: &str,
    ) -> Result<KeywordSnapshot, ScanError> {
        if keyword.term.trim().is_empty() {
            return Err(ScanError::Validation("keyword term is empty".to_string()));
        }
        if domain.trim().is_empty() {
            return Err(ScanError::Validation("domain is empty".to_string()));
        }

        let started = Instant::now();

        let surfaces = self
            .provider
            .fetch_all(&keyword.term, &keyword.location)
            .await;

        if surfaces.all_failed() {
            return Err(ScanError::AllSourcesFailed {
                keyword: keyword.term.clone(),
            });
        }

        let organic = match &surfaces.organic {
            Ok(response) => find_rank(&response.entries(), domain),
            Err(_) => RankMatch::not_cited(),
        };

        let (ai_overview, ai_overview_text) = match &surfaces.ai_overview {
            Ok(response) => match &response.ai_overview {
                Some(overview) => (find_rank(&overview.entries(), domain), overview.text()),
                None => (RankMatch::not_cited(), None),
            },
            Err(_) => (RankMatch::not_cited(), None),
        };

        let (ai_mode, ai_mode_status) = match &surfaces.ai_mode {
            Ok(response) => {
                let entries = response.entries();
                let rank = find_rank(&entries, domain);
                let status = if rank.cited {
                    AiModeStatus::Cited
                } else if entries.is_empty() {
                    AiModeStatus::NotFound
                } else {
                    AiModeStatus::NotCited
                };
                (rank, status)
            }
            Err(_) => (RankMatch::not_cited(), AiModeStatus::NotFound),
        };

        let screenshot_url = match &surfaces.ai_overview {
            Ok(response) => response.screenshot_url(),
            Err(_) => None,
        }
        .or(match &surfaces.organic {
            Ok(response) => response.screenshot_url(),
            Err(_) => None,
        });

        let ai_mode_screenshot_url = match &surfaces.ai_mode {
            Ok(response) => response.screenshot_url(),
            Err(_) => None,
        };

        let scan_duration_ms =
            i32::try_from(started.elapsed().as_millis()).unwrap_or(i32::MAX);

        let snapshot = KeywordSnapshot {
            keyword_id: keyword.id,
            term: keyword.term.clone(),
            domain: domain.to_string(),
            organic,
            ai_overview,
            ai_mode,
            ai_mode_status,
            ai_overview_text,
            screenshot_url,
            ai_mode_screenshot_url,
            status: ScanStatus::Scanned,
            scan_duration_ms,
        };

        tracing::debug!(
            keyword = %keyword.term,
            domain,
            organic_rank = ?snapshot.organic.position,
            ai_overview_cited = snapshot.ai_overview.cited,
            ai_mode_status = %snapshot.ai_mode_status,
            duration_ms = snapshot.scan_duration_ms,
            "keyword scan complete"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
