//! Derived per-keyword display status.
//!
//! Computed at read time from the latest snapshot; never stored.

use serde::Serialize;

/// Sentiment at or below this is treated as strongly negative.
const CRITICAL_SENTIMENT_THRESHOLD: f64 = -0.5;

/// Organic positions 1..=10 count as a first-page ranking.
const TOP_ORGANIC_RANK: i32 = 10;

/// The fields of a snapshot that feed status derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilitySignals {
    pub sentiment_score: Option<f64>,
    pub ai_overview_cited: bool,
    pub ai_mode_cited: bool,
    pub organic_rank: Option<i32>,
}

/// Display status for one tracked keyword.
///
/// Precedence on ties: `Critical` > `Safe` > `Risk` > `Opportunity` > `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    /// Analysis sentiment is strongly negative.
    Critical,
    /// Cited on the AI overview surface.
    Safe,
    /// Ranks in the organic top 10 but has no AI citation on either surface.
    Risk,
    /// Scanned, but none of the above apply.
    Opportunity,
    /// No snapshot exists yet.
    Pending,
}

impl DisplayStatus {
    /// Derive the status from the latest snapshot's signals, or `Pending` if
    /// the keyword has never been scanned.
    #[must_use]
    pub fn derive(signals: Option<&VisibilitySignals>) -> Self {
        let Some(s) = signals else {
            return DisplayStatus::Pending;
        };

        if s.sentiment_score
            .is_some_and(|score| score <= CRITICAL_SENTIMENT_THRESHOLD)
        {
            return DisplayStatus::Critical;
        }

        if s.ai_overview_cited {
            return DisplayStatus::Safe;
        }

        let top_organic = s.organic_rank.is_some_and(|r| r <= TOP_ORGANIC_RANK);
        if top_organic && !s.ai_mode_cited {
            return DisplayStatus::Risk;
        }

        DisplayStatus::Opportunity
    }
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayStatus::Critical => write!(f, "critical"),
            DisplayStatus::Safe => write!(f, "safe"),
            DisplayStatus::Risk => write!(f, "risk"),
            DisplayStatus::Opportunity => write!(f, "opportunity"),
            DisplayStatus::Pending => write!(f, "pending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_snapshot_is_pending() {
        assert_eq!(DisplayStatus::derive(None), DisplayStatus::Pending);
    }

    #[test]
    fn strongly_negative_sentiment_is_critical() {
        let signals = VisibilitySignals {
            sentiment_score: Some(-0.8),
            ai_overview_cited: true,
            ..VisibilitySignals::default()
        };
        assert_eq!(
            DisplayStatus::derive(Some(&signals)),
            DisplayStatus::Critical
        );
    }

    #[test]
    fn critical_takes_precedence_over_safe() {
        let signals = VisibilitySignals {
            sentiment_score: Some(-0.5),
            ai_overview_cited: true,
            ai_mode_cited: true,
            organic_rank: Some(1),
        };
        assert_eq!(
            DisplayStatus::derive(Some(&signals)),
            DisplayStatus::Critical
        );
    }

    #[test]
    fn ai_overview_citation_is_safe() {
        let signals = VisibilitySignals {
            ai_overview_cited: true,
            organic_rank: Some(3),
            ..VisibilitySignals::default()
        };
        assert_eq!(DisplayStatus::derive(Some(&signals)), DisplayStatus::Safe);
    }

    #[test]
    fn top_organic_without_ai_citation_is_risk() {
        let signals = VisibilitySignals {
            organic_rank: Some(5),
            ..VisibilitySignals::default()
        };
        assert_eq!(DisplayStatus::derive(Some(&signals)), DisplayStatus::Risk);
    }

    #[test]
    fn organic_rank_eleven_is_not_risk() {
        let signals = VisibilitySignals {
            organic_rank: Some(11),
            ..VisibilitySignals::default()
        };
        assert_eq!(
            DisplayStatus::derive(Some(&signals)),
            DisplayStatus::Opportunity
        );
    }

    #[test]
    fn ai_mode_citation_suppresses_risk() {
        let signals = VisibilitySignals {
            organic_rank: Some(2),
            ai_mode_cited: true,
            ..VisibilitySignals::default()
        };
        assert_eq!(
            DisplayStatus::derive(Some(&signals)),
            DisplayStatus::Opportunity
        );
    }

    #[test]
    fn mild_sentiment_does_not_trigger_critical() {
        let signals = VisibilitySignals {
            sentiment_score: Some(-0.2),
            ai_overview_cited: true,
            ..VisibilitySignals::default()
        };
        assert_eq!(DisplayStatus::derive(Some(&signals)), DisplayStatus::Safe);
    }

    #[test]
    fn nothing_set_is_opportunity() {
        let signals = VisibilitySignals::default();
        assert_eq!(
            DisplayStatus::derive(Some(&signals)),
            DisplayStatus::Opportunity
        );
    }
}
