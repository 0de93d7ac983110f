//! The scan orchestration pipeline.
//!
//! Given a batch of keywords and a tracked domain, this crate fetches three
//! independent search surfaces per keyword, extracts a uniform citation
//! signal from each, and reconciles them into one snapshot per keyword under
//! bounded concurrency. Partial failure of any one surface degrades that
//! surface only; partial failure of any one keyword degrades that keyword
//! only.

pub mod error;
pub mod executor;
pub mod rank;
pub mod scheduler;
pub mod types;

pub use error::ScanError;
pub use executor::{ScanExecutor, SurfaceProvider};
pub use rank::{find_rank, RankMatch};
pub use scheduler::{BatchScheduler, KeywordScanner};
pub use types::{AiModeStatus, BatchProgress, KeywordSnapshot, KeywordSpec, ScanStatus};
