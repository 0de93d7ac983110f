use serde::Serialize;

/// A parsed qualitative assessment: sentiment on the stored `[-1, 1]` scale,
/// one content gap, one strategy suggestion, optional supporting sources.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub sentiment_score: f64,
    pub gap: Option<String>,
    pub strategy: Option<String>,
    pub sources: Vec<String>,
}

/// Context handed to the assessment engine alongside the captured text.
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub keyword: String,
    pub domain: String,
    pub text: String,
}
