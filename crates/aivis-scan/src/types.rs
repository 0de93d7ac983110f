//! Scan pipeline output types.

use serde::Serialize;

use crate::rank::RankMatch;

/// The keyword inputs a scan needs; callers map their stored keyword rows
/// into this.
#[derive(Debug, Clone)]
pub struct KeywordSpec {
    pub id: i64,
    pub term: String,
    pub location: String,
}

/// AI-mode visibility has three distinct states, not a boolean: an empty or
/// absent result list means the surface produced nothing to be cited *in*,
/// which is a different situation from being passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiModeStatus {
    /// The domain appears among the AI-mode results.
    Cited,
    /// AI mode returned results, none matching the domain.
    NotCited,
    /// AI mode returned no result list at all (or the fetch failed).
    NotFound,
}

impl AiModeStatus {
    /// Stable string form used in persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AiModeStatus::Cited => "cited",
            AiModeStatus::NotCited => "not_cited",
            AiModeStatus::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for AiModeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a scan produced a real measurement or a substituted placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Scanned,
    Failed,
}

impl ScanStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Scanned => "scanned",
            ScanStatus::Failed => "failed",
        }
    }
}

/// One keyword's reconciled measurement across all three surfaces.
///
/// This is the pipeline's in-memory unit of output; persistence maps it onto
/// a snapshot row.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordSnapshot {
    pub keyword_id: i64,
    pub term: String,
    pub domain: String,
    pub organic: RankMatch,
    pub ai_overview: RankMatch,
    pub ai_mode: RankMatch,
    pub ai_mode_status: AiModeStatus,
    /// Overview prose captured for later analysis when no per-citation
    /// snippet was available.
    pub ai_overview_text: Option<String>,
    pub screenshot_url: Option<String>,
    pub ai_mode_screenshot_url: Option<String>,
    pub status: ScanStatus,
    pub scan_duration_ms: i32,
}

impl KeywordSnapshot {
    /// The placeholder substituted when a keyword's scan fails outright:
    /// keyword identity preserved, every rank field absent, duration zero.
    #[must_use]
    pub fn failed_placeholder(keyword: &KeywordSpec, domain: &str) -> Self {
        Self {
            keyword_id: keyword.id,
            term: keyword.term.clone(),
            domain: domain.to_string(),
            organic: RankMatch::not_cited(),
            ai_overview: RankMatch::not_cited(),
            ai_mode: RankMatch::not_cited(),
            ai_mode_status: AiModeStatus::NotFound,
            ai_overview_text: None,
            screenshot_url: None,
            ai_mode_screenshot_url: None,
            status: ScanStatus::Failed,
            scan_duration_ms: 0,
        }
    }

    /// True when either AI surface cited the domain.
    #[must_use]
    pub fn cited_on_ai_surface(&self) -> bool {
        self.ai_overview.cited || self.ai_mode.cited
    }
}

/// Progress published by the batch scheduler after each window settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}
