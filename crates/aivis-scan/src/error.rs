use thiserror::Error;

/// Errors produced by the scan pipeline.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A required input was missing or empty. Raised before any network call.
    #[error("invalid scan input: {0}")]
    Validation(String),

    /// Every surface fetch failed for this keyword. Distinct from
    /// [`ScanError::Validation`] so callers can substitute a placeholder
    /// failed snapshot for transient provider trouble.
    #[error("all surface fetches failed for keyword \"{keyword}\"")]
    AllSourcesFailed { keyword: String },
}
