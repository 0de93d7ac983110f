//! HTTP client for the external search-data provider.
//!
//! One `/search` endpoint serves all three surfaces, selected by the
//! `engine` query parameter. Every request carries the API key and a
//! client-level timeout sized well below the scan pipeline's overall budget,
//! so a hung provider call can never stall a batch past its deadline.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::SerpError;
use crate::types::{AiModeResponse, AiOverviewResponse, OrganicResponse, Surface};

const DEFAULT_BASE_URL: &str = "https://serpapi.com/";

/// How many ranked results to request for the list-shaped surfaces.
const RESULT_COUNT: &str = "10";

/// Client for the search-data provider.
///
/// Use [`SerpClient::new`] for production or [`SerpClient::with_base_url`] to
/// point at a mock server in tests.
pub struct SerpClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

/// Per-surface outcomes of one keyword's three concurrent queries.
///
/// Each surface fails independently (bulkhead isolation): a timeout or bad
/// status on one query leaves the other two intact.
#[derive(Debug)]
pub struct FetchedSurfaces {
    pub organic: Result<OrganicResponse, SerpError>,
    pub ai_overview: Result<AiOverviewResponse, SerpError>,
    pub ai_mode: Result<AiModeResponse, SerpError>,
}

impl FetchedSurfaces {
    /// True when every surface failed — the caller escalates this to a scan
    /// failure; any single success still yields a usable snapshot.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.organic.is_err() && self.ai_overview.is_err() && self.ai_mode.is_err()
    }
}

impl SerpClient {
    /// Creates a new client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, SerpError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SerpError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`SerpError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SerpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("aivis/0.1 (search-visibility)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joining "search" lands on the root path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SerpError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Issues all three surface queries for one keyword concurrently and
    /// returns their independent outcomes.
    ///
    /// This is the scan pipeline's only entry point into the provider: the
    /// three queries must overlap to fit the per-keyword time budget, and no
    /// query's failure may abort its siblings.
    pub async fn fetch_all(&self, keyword: &str, location: &str) -> FetchedSurfaces {
        let (organic, ai_overview, ai_mode) = tokio::join!(
            self.fetch_organic(keyword, location),
            self.fetch_ai_overview(keyword, location),
            self.fetch_ai_mode(keyword, location),
        );

        for (surface, err) in [
            (Surface::Organic, organic.as_ref().err()),
            (Surface::AiOverview, ai_overview.as_ref().err()),
            (Surface::AiMode, ai_mode.as_ref().err()),
        ] {
            if let Some(e) = err {
                tracing::warn!(keyword, %surface, error = %e, "surface fetch failed");
            }
        }

        FetchedSurfaces {
            organic,
            ai_overview,
            ai_mode,
        }
    }

    /// Fetches the organic web-search ranking for a keyword.
    ///
    /// # Errors
    ///
    /// - [`SerpError::Http`] on network failure or timeout.
    /// - [`SerpError::UnexpectedStatus`] on a non-2xx response.
    /// - [`SerpError::Deserialize`] if the body does not match the expected
    ///   shape.
    pub async fn fetch_organic(
        &self,
        keyword: &str,
        location: &str,
    ) -> Result<OrganicResponse, SerpError> {
        let url = self.build_url(&[
            ("engine", "google"),
            ("q", keyword),
            ("location", location),
            ("num", RESULT_COUNT),
        ]);
        let body = self.request_json(&url).await?;

        serde_json::from_value(body).map_err(|e| SerpError::Deserialize {
            context: format!("organic(q={keyword})"),
            source: e,
        })
    }

    /// Fetches the AI-overview-augmented results for a keyword.
    ///
    /// An absent overview panel is a normal outcome, not an error — the
    /// response parses to `ai_overview: None`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_organic`].
    pub async fn fetch_ai_overview(
        &self,
        keyword: &str,
        location: &str,
    ) -> Result<AiOverviewResponse, SerpError> {
        let url = self.build_url(&[
            ("engine", "google"),
            ("google_domain", "google.com"),
            ("q", keyword),
            ("location", location),
            ("num", RESULT_COUNT),
        ]);
        let body = self.request_json(&url).await?;

        serde_json::from_value(body).map_err(|e| SerpError::Deserialize {
            context: format!("ai_overview(q={keyword})"),
            source: e,
        })
    }

    /// Fetches the conversational AI-mode results for a keyword.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_organic`].
    pub async fn fetch_ai_mode(
        &self,
        keyword: &str,
        location: &str,
    ) -> Result<AiModeResponse, SerpError> {
        let url = self.build_url(&[
            ("engine", "google_gemini"),
            ("q", keyword),
            ("location", location),
        ]);
        let body = self.request_json(&url).await?;

        serde_json::from_value(body).map_err(|e| SerpError::Deserialize {
            context: format!("ai_mode(q={keyword})"),
            source: e,
        })
    }

    fn build_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self
            .base_url
            .join("search")
            .unwrap_or_else(|_| self.base_url.clone());
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, SerpError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SerpError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.path().to_owned(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
