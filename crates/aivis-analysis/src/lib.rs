//! Qualitative analysis of AI-surface citations.
//!
//! Sends captured snippet text plus keyword/domain context to an external
//! assessment engine, defensively extracts the structured payload the engine
//! embeds in free text, and patches the resulting sentiment / content-gap /
//! strategy fields onto the already-persisted snapshot.

pub mod client;
pub mod enricher;
pub mod error;
pub mod extract;
pub mod types;

pub use client::AssessmentClient;
pub use enricher::{eligible_text, Enricher, EnrichmentStatus, EnrichmentTracker};
pub use error::AnalysisError;
pub use extract::parse_reply;
pub use types::{Analysis, AssessmentRequest};
