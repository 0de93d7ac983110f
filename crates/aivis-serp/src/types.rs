//! Search-data provider response types.
//!
//! The provider returns a different JSON shape per surface, and even within
//! one surface the field names drift (`link` vs `url`, `snippet` vs `text`).
//! Each raw type therefore exposes an `entries()` view that collapses the
//! variants into the uniform [`RankedEntry`] the rank extractor consumes.

use serde::Deserialize;

/// One entry of a ranked result list, normalized across all three surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub url: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

/// Which of the three search surfaces a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Organic,
    AiOverview,
    AiMode,
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Surface::Organic => write!(f, "organic"),
            Surface::AiOverview => write!(f, "ai_overview"),
            Surface::AiMode => write!(f, "ai_mode"),
        }
    }
}

/// Query metadata attached to every provider response; carries the optional
/// screenshot reference when the provider captured one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMetadata {
    #[serde(default, alias = "screenshot")]
    pub screenshot_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Organic web search
// ---------------------------------------------------------------------------

/// Response to an organic web-search query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    #[serde(default)]
    pub search_metadata: Option<SearchMetadata>,
}

/// A single organic result. The provider uses `link` for the target URL.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl OrganicResponse {
    /// Normalized ranked view. Entries without any URL are kept with an empty
    /// URL so positions stay aligned with the provider's ordering.
    #[must_use]
    pub fn entries(&self) -> Vec<RankedEntry> {
        self.organic_results
            .iter()
            .map(|r| RankedEntry {
                url: r.link.clone().unwrap_or_default(),
                title: r.title.clone(),
                snippet: r.snippet.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn screenshot_url(&self) -> Option<String> {
        self.search_metadata
            .as_ref()
            .and_then(|m| m.screenshot_url.clone())
    }
}

// ---------------------------------------------------------------------------
// AI-overview-augmented search
// ---------------------------------------------------------------------------

/// Response to an AI-overview query. The overview panel is absent whenever
/// the engine decided not to generate one — that is a normal outcome.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiOverviewResponse {
    #[serde(default)]
    pub ai_overview: Option<AiOverview>,
    #[serde(default)]
    pub search_metadata: Option<SearchMetadata>,
}

/// The AI overview panel with its cited sources.
///
/// Older payloads call the citation list `references`, newer ones `sources`;
/// both are accepted and `references` wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiOverview {
    #[serde(default)]
    pub references: Vec<Citation>,
    #[serde(default)]
    pub sources: Vec<Citation>,
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
}

/// A source cited by an AI surface. `link`/`url` and `snippet`/`text` are
/// interchangeable across provider versions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A block of generated overview prose.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub snippet: Option<String>,
}

impl Citation {
    fn to_entry(&self) -> RankedEntry {
        RankedEntry {
            url: self
                .link
                .clone()
                .or_else(|| self.url.clone())
                .unwrap_or_default(),
            title: self.title.clone(),
            snippet: self.snippet.clone().or_else(|| self.text.clone()),
        }
    }
}

impl AiOverview {
    /// Normalized citation list: `references` if present, else `sources`.
    #[must_use]
    pub fn entries(&self) -> Vec<RankedEntry> {
        let citations = if self.references.is_empty() {
            &self.sources
        } else {
            &self.references
        };
        citations.iter().map(Citation::to_entry).collect()
    }

    /// The overview's generated prose, joined across blocks. Used as analysis
    /// input when no per-citation snippet was captured.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let joined: Vec<&str> = self
            .text_blocks
            .iter()
            .filter_map(|b| b.snippet.as_deref())
            .collect();
        if joined.is_empty() {
            None
        } else {
            Some(joined.join(" "))
        }
    }
}

impl AiOverviewResponse {
    #[must_use]
    pub fn screenshot_url(&self) -> Option<String> {
        self.search_metadata
            .as_ref()
            .and_then(|m| m.screenshot_url.clone())
    }
}

// ---------------------------------------------------------------------------
// Conversational AI-mode search
// ---------------------------------------------------------------------------

/// Response to a conversational AI-mode query. Results live in
/// `answer_box.results` when the engine produced an answer panel, else in
/// `organic_results`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiModeResponse {
    #[serde(default)]
    pub answer_box: Option<AnswerBox>,
    #[serde(default)]
    pub organic_results: Vec<Citation>,
    #[serde(default)]
    pub search_metadata: Option<SearchMetadata>,
}

/// The AI-mode answer panel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerBox {
    #[serde(default)]
    pub results: Vec<Citation>,
}

impl AiModeResponse {
    /// Normalized ranked view: the answer panel's results when present,
    /// otherwise the plain result list.
    #[must_use]
    pub fn entries(&self) -> Vec<RankedEntry> {
        let results = match &self.answer_box {
            Some(b) if !b.results.is_empty() => &b.results,
            _ => &self.organic_results,
        };
        results.iter().map(Citation::to_entry).collect()
    }

    #[must_use]
    pub fn screenshot_url(&self) -> Option<String> {
        self.search_metadata
            .as_ref()
            .and_then(|m| m.screenshot_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organic_entries_use_link_field() {
        let raw = serde_json::json!({
            "organic_results": [
                { "link": "https://a.example/one", "title": "One", "snippet": "first" },
                { "title": "no url at all" }
            ]
        });
        let parsed: OrganicResponse = serde_json::from_value(raw).unwrap();
        let entries = parsed.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://a.example/one");
        assert_eq!(entries[1].url, "");
    }

    #[test]
    fn citation_prefers_link_over_url_and_snippet_over_text() {
        let citation = Citation {
            link: Some("https://via-link".to_string()),
            url: Some("https://via-url".to_string()),
            snippet: Some("snippet".to_string()),
            text: Some("text".to_string()),
            ..Citation::default()
        };
        let entry = citation.to_entry();
        assert_eq!(entry.url, "https://via-link");
        assert_eq!(entry.snippet.as_deref(), Some("snippet"));
    }

    #[test]
    fn citation_falls_back_to_url_and_text() {
        let citation = Citation {
            url: Some("https://via-url".to_string()),
            text: Some("text".to_string()),
            ..Citation::default()
        };
        let entry = citation.to_entry();
        assert_eq!(entry.url, "https://via-url");
        assert_eq!(entry.snippet.as_deref(), Some("text"));
    }

    #[test]
    fn overview_references_win_over_sources() {
        let overview = AiOverview {
            references: vec![Citation {
                link: Some("https://ref".to_string()),
                ..Citation::default()
            }],
            sources: vec![Citation {
                link: Some("https://src".to_string()),
                ..Citation::default()
            }],
            text_blocks: Vec::new(),
        };
        let entries = overview.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://ref");
    }

    #[test]
    fn overview_sources_used_when_no_references() {
        let raw = serde_json::json!({
            "ai_overview": {
                "sources": [ { "url": "https://src", "text": "cited text" } ]
            }
        });
        let parsed: AiOverviewResponse = serde_json::from_value(raw).unwrap();
        let entries = parsed.ai_overview.unwrap().entries();
        assert_eq!(entries[0].url, "https://src");
        assert_eq!(entries[0].snippet.as_deref(), Some("cited text"));
    }

    #[test]
    fn missing_overview_parses_as_none() {
        let parsed: AiOverviewResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.ai_overview.is_none());
    }

    #[test]
    fn overview_text_joins_blocks() {
        let raw = serde_json::json!({
            "text_blocks": [ { "snippet": "first." }, {}, { "snippet": "second." } ]
        });
        let overview: AiOverview = serde_json::from_value(raw).unwrap();
        assert_eq!(overview.text().as_deref(), Some("first. second."));
    }

    #[test]
    fn ai_mode_prefers_answer_box_results() {
        let raw = serde_json::json!({
            "answer_box": { "results": [ { "link": "https://boxed" } ] },
            "organic_results": [ { "link": "https://plain" } ]
        });
        let parsed: AiModeResponse = serde_json::from_value(raw).unwrap();
        let entries = parsed.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://boxed");
    }

    #[test]
    fn ai_mode_falls_back_to_organic_results() {
        let raw = serde_json::json!({
            "organic_results": [ { "url": "https://plain" } ]
        });
        let parsed: AiModeResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.entries()[0].url, "https://plain");
    }

    #[test]
    fn empty_ai_mode_response_has_no_entries() {
        let parsed: AiModeResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.entries().is_empty());
    }

    #[test]
    fn screenshot_alias_accepted() {
        let raw = serde_json::json!({
            "search_metadata": { "screenshot": "https://shots/1.png" }
        });
        let parsed: OrganicResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            parsed.screenshot_url().as_deref(),
            Some("https://shots/1.png")
        );
    }
}
