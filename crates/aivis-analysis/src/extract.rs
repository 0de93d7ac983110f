//! Defensive extraction of the engine's structured payload.
//!
//! The assessment engine is asked for strict JSON but routinely wraps it in
//! prose, markdown fences, or trailing commentary. Extraction therefore
//! tolerates anything containing one JSON object and degrades to an error
//! value — it never panics and never propagates a parse failure as a crash.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::AnalysisError;
use crate::types::Analysis;

/// Grabs the outermost `{...}` region of a prose reply.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("static pattern compiles"));

/// Sentiment arrives either as a label or as a number on the engine's
/// historical `0..=1` scale.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSentiment {
    Score(f64),
    Label(String),
}

/// `gap`/`strategy` fields arrive as a single string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn join(self) -> Option<String> {
        let joined = match self {
            TextOrList::Text(t) => t,
            TextOrList::List(items) => items.join("; "),
        };
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    sentiment: Option<RawSentiment>,
    #[serde(alias = "gaps")]
    gap: Option<TextOrList>,
    #[serde(alias = "strategies")]
    strategy: Option<TextOrList>,
    #[serde(default)]
    sources: Vec<String>,
}

/// Maps the engine's sentiment value onto the stored `[-1, 1]` scale.
///
/// - Labels: `Positive` → 0.7, `Negative` → -0.7, `Neutral` and
///   `Not Mentioned` (and anything unrecognized) → 0.0.
/// - Numbers in `0..=1` (the engine's own scale) map linearly via `2x - 1`.
/// - Anything else is clamped into `[-1, 1]`.
fn sentiment_score(raw: Option<RawSentiment>) -> f64 {
    match raw {
        Some(RawSentiment::Score(v)) if (0.0..=1.0).contains(&v) => 2.0 * v - 1.0,
        Some(RawSentiment::Score(v)) => v.clamp(-1.0, 1.0),
        Some(RawSentiment::Label(label)) => match label.trim().to_lowercase().as_str() {
            "positive" => 0.7,
            "negative" => -0.7,
            _ => 0.0,
        },
        None => 0.0,
    }
}

/// Parses an engine reply into an [`Analysis`].
///
/// Accepts a bare JSON object or prose containing one.
///
/// # Errors
///
/// Returns [`AnalysisError::NoPayload`] if no parseable object is present.
pub fn parse_reply(reply: &str) -> Result<Analysis, AnalysisError> {
    let raw = serde_json::from_str::<RawAnalysis>(reply)
        .ok()
        .or_else(|| {
            JSON_OBJECT
                .find(reply)
                .and_then(|m| serde_json::from_str::<RawAnalysis>(m.as_str()).ok())
        })
        .ok_or(AnalysisError::NoPayload)?;

    Ok(Analysis {
        sentiment_score: sentiment_score(raw.sentiment),
        gap: raw.gap.and_then(TextOrList::join),
        strategy: raw.strategy.and_then(TextOrList::join),
        sources: raw.sources,
    })
}
