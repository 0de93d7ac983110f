use thiserror::Error;

/// Errors returned by the qualitative-assessment engine client and enricher.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from assessment engine")]
    UnexpectedStatus { status: u16 },

    /// The engine's response envelope could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provided base URL is not parseable.
    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// The engine returned no candidates or an empty reply.
    #[error("assessment engine returned an empty reply")]
    EmptyReply,

    /// The reply contained no parseable structured payload.
    #[error("no structured payload found in engine reply")]
    NoPayload,

    /// The targeted snapshot update failed.
    #[error("failed to persist analysis: {0}")]
    Persist(#[from] aivis_db::DbError),
}
