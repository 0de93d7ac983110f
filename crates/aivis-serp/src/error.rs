use thiserror::Error;

/// Errors returned by the search-data provider client.
#[derive(Debug, Error)]
pub enum SerpError {
    /// Network or TLS failure from the underlying HTTP client, including
    /// per-request timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provided base URL is not parseable.
    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl SerpError {
    /// True when the failure was the request running past its deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, SerpError::Http(e) if e.is_timeout())
    }
}
