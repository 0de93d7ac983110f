//! HTTP client for the qualitative-assessment engine.
//!
//! Speaks the engine's `generateContent` REST shape: a prompt goes in as
//! `contents[].parts[].text`, the reply comes back as candidate parts whose
//! concatenated text is expected — but not trusted — to contain a JSON
//! payload. Grounding source URIs, when present, are collected alongside.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::extract::parse_reply;
use crate::types::{Analysis, AssessmentRequest};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const MODEL: &str = "gemini-2.5-flash";

/// Longest snippet forwarded to the engine; anything longer is truncated to
/// keep the prompt inside the engine's context budget.
const MAX_SNIPPET_CHARS: usize = 500;

/// Client for the qualitative-assessment engine.
pub struct AssessmentClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default, rename = "groundingMetadata")]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroundingMetadata {
    #[serde(default, rename = "groundingChunks")]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl AssessmentClient {
    /// Creates a new client pointed at the production engine.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the client cannot be constructed,
    /// or [`AnalysisError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("aivis/0.1 (search-visibility)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AnalysisError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Requests a qualitative assessment for one captured snippet.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Http`] on network failure or timeout.
    /// - [`AnalysisError::UnexpectedStatus`] on a non-2xx response.
    /// - [`AnalysisError::EmptyReply`] if the engine produced no text.
    /// - [`AnalysisError::NoPayload`] if the reply contains no structured
    ///   payload.
    pub async fn assess(&self, request: &AssessmentRequest) -> Result<Analysis, AnalysisError> {
        let prompt = build_prompt(request);

        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{MODEL}:generateContent"))
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self.client.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let envelope: GenerateResponse = response.json().await?;

        let candidate = envelope
            .candidates
            .into_iter()
            .next()
            .ok_or(AnalysisError::EmptyReply)?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyReply);
        }

        let mut analysis = parse_reply(&text)?;

        // Grounding sources supplement whatever the payload itself listed.
        if let Some(metadata) = candidate.grounding_metadata {
            for chunk in metadata.grounding_chunks {
                if let Some(uri) = chunk.web.and_then(|w| w.uri) {
                    if !analysis.sources.contains(&uri) {
                        analysis.sources.push(uri);
                    }
                }
            }
        }

        Ok(analysis)
    }
}

fn build_prompt(request: &AssessmentRequest) -> String {
    let snippet: String = request.text.chars().take(MAX_SNIPPET_CHARS).collect();
    format!(
        "Context: I am tracking the keyword \"{keyword}\" for the domain \"{domain}\".\n\
         An AI-generated search surface says: \"{snippet}\"\n\
         \n\
         Task:\n\
         1. Determine sentiment towards {domain} (Positive/Neutral/Negative/Not Mentioned).\n\
         2. If not mentioned, identify ONE missing topic the domain needs to cover to get cited.\n\
         3. Provide a 1-sentence actionable strategy.\n\
         \n\
         Return strictly JSON: {{ \"sentiment\": \"...\", \"gap\": \"...\", \"strategy\": \"...\" }}",
        keyword = request.keyword,
        domain = request.domain,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_context_and_truncates_snippet() {
        let request = AssessmentRequest {
            keyword: "best crm software".to_string(),
            domain: "hypefresh.co".to_string(),
            text: "x".repeat(2000),
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("best crm software"));
        assert!(prompt.contains("hypefresh.co"));
        assert!(prompt.len() < 1200, "snippet must be truncated");
    }
}
