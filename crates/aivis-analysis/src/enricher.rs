//! Late-arriving analysis enrichment.
//!
//! Runs independently of the scan that produced a snapshot: once the
//! assessment engine answers, only the snapshot's analysis columns are
//! patched — rank and citation fields committed by the scan are never
//! rewritten. Enrichment failure leaves the columns NULL and is logged;
//! it never propagates into the scan pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use aivis_scan::KeywordSnapshot;

use crate::client::AssessmentClient;
use crate::error::AnalysisError;
use crate::types::{Analysis, AssessmentRequest};

/// Observable state of one snapshot's enrichment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Tracks enrichment outcomes keyed by snapshot id, so consumers can show
/// an analysis-pending state and tests can assert on completion instead of
/// racing a dangling task.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentTracker {
    inner: Arc<Mutex<HashMap<i64, EnrichmentStatus>>>,
}

impl EnrichmentTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self, snapshot_id: i64) -> Option<EnrichmentStatus> {
        self.inner.lock().ok()?.get(&snapshot_id).copied()
    }

    fn set(&self, snapshot_id: i64, status: EnrichmentStatus) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(snapshot_id, status);
        }
    }
}

/// Enriches persisted snapshots with qualitative analysis.
pub struct Enricher {
    pool: PgPool,
    client: Arc<AssessmentClient>,
    tracker: EnrichmentTracker,
}

/// Text worth analyzing from a freshly scanned snapshot, if any.
///
/// Enrichment is gated on an AI citation: uncited, textless snapshots skip
/// the engine entirely to save cost. Preference order: the overview
/// citation's snippet, then the overview prose, then the AI-mode snippet.
#[must_use]
pub fn eligible_text(snapshot: &KeywordSnapshot) -> Option<String> {
    if !snapshot.cited_on_ai_surface() {
        return None;
    }
    snapshot
        .ai_overview
        .snippet
        .clone()
        .or_else(|| snapshot.ai_overview_text.clone())
        .or_else(|| snapshot.ai_mode.snippet.clone())
        .filter(|text| !text.trim().is_empty())
}

impl Enricher {
    #[must_use]
    pub fn new(pool: PgPool, client: Arc<AssessmentClient>) -> Self {
        Self {
            pool,
            client,
            tracker: EnrichmentTracker::new(),
        }
    }

    #[must_use]
    pub fn tracker(&self) -> EnrichmentTracker {
        self.tracker.clone()
    }

    /// Assesses the captured text and patches the snapshot's analysis fields.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the engine call, payload extraction, or
    /// the targeted update fails. The snapshot's non-analysis fields are
    /// untouched in every case.
    pub async fn enrich(
        &self,
        snapshot_id: i64,
        request: &AssessmentRequest,
    ) -> Result<Analysis, AnalysisError> {
        let analysis = self.client.assess(request).await?;

        let score = Decimal::from_f64(analysis.sentiment_score)
            .unwrap_or_default()
            .round_dp(3);

        let sources = if analysis.sources.is_empty() {
            None
        } else {
            Some(serde_json::json!(analysis.sources))
        };

        aivis_db::update_snapshot_analysis(
            &self.pool,
            snapshot_id,
            score,
            analysis.gap.as_deref(),
            analysis.strategy.as_deref(),
            sources,
        )
        .await?;

        tracing::info!(
            snapshot_id,
            sentiment = analysis.sentiment_score,
            "analysis persisted"
        );

        Ok(analysis)
    }

    /// Fire-and-forget enrichment for a snapshot the scan pipeline just
    /// persisted.
    ///
    /// Returns `None` when the snapshot is not eligible (no AI citation or
    /// no captured text). Otherwise spawns a one-shot task keyed by snapshot
    /// id; its outcome is observable through [`Enricher::tracker`] and the
    /// returned handle. Failures are logged, never raised.
    pub fn spawn(
        &self,
        snapshot_id: i64,
        snapshot: &KeywordSnapshot,
    ) -> Option<JoinHandle<EnrichmentStatus>> {
        let text = eligible_text(snapshot)?;

        let request = AssessmentRequest {
            keyword: snapshot.term.clone(),
            domain: snapshot.domain.clone(),
            text,
        };

        let task = Self {
            pool: self.pool.clone(),
            client: Arc::clone(&self.client),
            tracker: self.tracker.clone(),
        };
        task.tracker.set(snapshot_id, EnrichmentStatus::Pending);

        Some(tokio::spawn(async move {
            let status = match task.enrich(snapshot_id, &request).await {
                Ok(_) => EnrichmentStatus::Succeeded,
                Err(e) => {
                    tracing::warn!(snapshot_id, error = %e, "enrichment failed; analysis fields left absent");
                    EnrichmentStatus::Failed
                }
            };
            task.tracker.set(snapshot_id, status);
            status
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aivis_scan::{AiModeStatus, RankMatch, ScanStatus};

    fn snapshot(overview_cited: bool, mode_cited: bool) -> KeywordSnapshot {
        KeywordSnapshot {
            keyword_id: 1,
            term: "best crm software".to_string(),
            domain: "hypefresh.co".to_string(),
            organic: RankMatch::not_cited(),
            ai_overview: RankMatch {
                cited: overview_cited,
                position: overview_cited.then_some(1),
                url: None,
                title: None,
                snippet: overview_cited.then(|| "overview snippet".to_string()),
            },
            ai_mode: RankMatch {
                cited: mode_cited,
                position: mode_cited.then_some(2),
                url: None,
                title: None,
                snippet: mode_cited.then(|| "mode snippet".to_string()),
            },
            ai_mode_status: if mode_cited {
                AiModeStatus::Cited
            } else {
                AiModeStatus::NotFound
            },
            ai_overview_text: None,
            screenshot_url: None,
            ai_mode_screenshot_url: None,
            status: ScanStatus::Scanned,
            scan_duration_ms: 10,
        }
    }

    #[test]
    fn uncited_snapshot_is_not_eligible() {
        assert!(eligible_text(&snapshot(false, false)).is_none());
    }

    #[test]
    fn overview_snippet_preferred() {
        let text = eligible_text(&snapshot(true, true)).unwrap();
        assert_eq!(text, "overview snippet");
    }

    #[test]
    fn mode_snippet_used_when_overview_uncited() {
        let text = eligible_text(&snapshot(false, true)).unwrap();
        assert_eq!(text, "mode snippet");
    }

    #[test]
    fn overview_prose_fallback() {
        let mut s = snapshot(true, false);
        s.ai_overview.snippet = None;
        s.ai_overview_text = Some("generated overview prose".to_string());
        assert_eq!(
            eligible_text(&s).as_deref(),
            Some("generated overview prose")
        );
    }

    #[test]
    fn cited_but_textless_snapshot_is_not_eligible() {
        let mut s = snapshot(true, false);
        s.ai_overview.snippet = Some("   ".to_string());
        s.ai_overview_text = None;
        assert!(eligible_text(&s).is_none());
    }

    #[test]
    fn tracker_roundtrip() {
        let tracker = EnrichmentTracker::new();
        assert!(tracker.status(7).is_none());
        tracker.set(7, EnrichmentStatus::Pending);
        assert_eq!(tracker.status(7), Some(EnrichmentStatus::Pending));
        tracker.set(7, EnrichmentStatus::Succeeded);
        assert_eq!(tracker.status(7), Some(EnrichmentStatus::Succeeded));
    }
}
