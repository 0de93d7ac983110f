//! `analyze` subcommand: re-run enrichment for a stored snapshot.

use std::sync::Arc;

use clap::Args;

use aivis_analysis::{AssessmentClient, AssessmentRequest, Enricher};

#[derive(Debug, Args)]
pub(crate) struct AnalyzeArgs {
    #[arg(long)]
    pub snapshot_id: i64,
    /// Override the text to assess; defaults to the stored snippet.
    #[arg(long)]
    pub text: Option<String>,
}

pub(crate) async fn run(config: &aivis_core::AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let key = config
        .assessment_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("AIVIS_ASSESSMENT_API_KEY is required for analysis"))?;

    let pool = crate::connect(config).await?;

    let snapshot = aivis_db::get_snapshot(&pool, args.snapshot_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("snapshot {} does not exist", args.snapshot_id))?;

    let text = args
        .text
        .or_else(|| snapshot.ai_overview_snippet.clone())
        .or_else(|| snapshot.ai_mode_snippet.clone())
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("snapshot has no captured text to analyze"))?;

    let keyword = aivis_db::get_keyword(&pool, snapshot.keyword_id)
        .await?
        .map(|k| k.term)
        .unwrap_or_default();

    let client = Arc::new(AssessmentClient::new(key, config.assessment_timeout_secs)?);
    let enricher = Enricher::new(pool, client);

    let analysis = enricher
        .enrich(
            snapshot.id,
            &AssessmentRequest {
                keyword,
                domain: snapshot.domain.clone(),
                text,
            },
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
