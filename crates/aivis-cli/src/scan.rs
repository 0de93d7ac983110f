//! `scan` subcommand: one keyword, one domain.

use clap::Args;

use aivis_scan::KeywordSpec;

#[derive(Debug, Args)]
pub(crate) struct ScanArgs {
    #[arg(long)]
    pub keyword: String,
    #[arg(long)]
    pub domain: String,
    #[arg(long, default_value = "United States")]
    pub location: String,
    /// Persist the snapshot under this stored keyword id.
    #[arg(long)]
    pub keyword_id: Option<i64>,
}

pub(crate) async fn run(config: &aivis_core::AppConfig, args: ScanArgs) -> anyhow::Result<()> {
    let executor = crate::build_executor(config)?;

    let spec = KeywordSpec {
        id: args.keyword_id.unwrap_or(0),
        term: args.keyword.clone(),
        location: args.location.clone(),
    };

    let snapshot = executor.scan_one(&spec, &args.domain).await?;

    if let Some(keyword_id) = args.keyword_id {
        let pool = crate::connect(config).await?;
        let row = aivis_db::insert_snapshot(
            &pool,
            &new_snapshot_from_measurement(keyword_id, &snapshot),
        )
        .await?;
        println!("persisted snapshot {}", row.id);
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Maps a computed measurement onto the snapshot insert payload.
pub(crate) fn new_snapshot_from_measurement(
    keyword_id: i64,
    snapshot: &aivis_scan::KeywordSnapshot,
) -> aivis_db::NewSnapshot {
    aivis_db::NewSnapshot {
        keyword_id,
        domain: snapshot.domain.clone(),
        organic_rank: snapshot.organic.position,
        organic_url: snapshot.organic.url.clone(),
        organic_title: snapshot.organic.title.clone(),
        ai_overview_cited: snapshot.ai_overview.cited,
        ai_overview_position: snapshot.ai_overview.position,
        ai_overview_snippet: snapshot
            .ai_overview
            .snippet
            .clone()
            .or_else(|| snapshot.ai_overview_text.clone()),
        ai_mode_cited: snapshot.ai_mode.cited,
        ai_mode_position: snapshot.ai_mode.position,
        ai_mode_snippet: snapshot.ai_mode.snippet.clone(),
        ai_mode_status: snapshot.ai_mode_status.as_str().to_string(),
        screenshot_url: snapshot.screenshot_url.clone(),
        ai_mode_screenshot_url: snapshot.ai_mode_screenshot_url.clone(),
        status: snapshot.status.as_str().to_string(),
        scan_duration_ms: snapshot.scan_duration_ms,
    }
}
