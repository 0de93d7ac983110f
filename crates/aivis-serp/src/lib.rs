//! Client for the external search-data provider.
//!
//! Three query kinds per keyword — organic web search, AI-overview-augmented
//! search, and conversational AI-mode search — each returning a ranked list
//! that [`types`] normalizes into a uniform entry view for rank extraction.

pub mod client;
pub mod error;
pub mod types;

pub use client::{FetchedSurfaces, SerpClient};
pub use error::SerpError;
pub use types::{
    AiModeResponse, AiOverview, AiOverviewResponse, Citation, OrganicResponse, RankedEntry,
    Surface,
};
