//! `batch` subcommand: scan every active keyword of a project.

use clap::Args;

use aivis_scan::{BatchProgress, BatchScheduler, KeywordSpec, ScanStatus};

#[derive(Debug, Args)]
pub(crate) struct BatchArgs {
    /// Project domain, e.g. "hypefresh.co".
    #[arg(long)]
    pub domain: String,
    /// Concurrency window size; defaults to the configured value.
    #[arg(long)]
    pub window: Option<usize>,
    /// Compute only; skip persisting snapshots.
    #[arg(long)]
    pub dry_run: bool,
}

pub(crate) async fn run(config: &aivis_core::AppConfig, args: BatchArgs) -> anyhow::Result<()> {
    let pool = crate::connect(config).await?;
    let executor = crate::build_executor(config)?;

    let project = aivis_db::get_project_by_domain(&pool, &args.domain)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no project tracks domain '{}'", args.domain))?;

    let keywords = aivis_db::list_keywords(&pool, project.id, true).await?;
    if keywords.is_empty() {
        println!("no active keywords for {}", args.domain);
        return Ok(());
    }

    let specs: Vec<KeywordSpec> = keywords
        .into_iter()
        .map(|row| KeywordSpec {
            id: row.id,
            term: row.term,
            location: row.location,
        })
        .collect();

    let scheduler = BatchScheduler::new(
        args.window.unwrap_or(config.scan_window_size),
        std::time::Duration::from_millis(config.scan_inter_window_delay_ms),
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<BatchProgress>();
    let progress_task = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            println!("scanned {}/{}", progress.completed, progress.total);
        }
    });

    let results = scheduler
        .run(&executor, &specs, &project.domain, Some(&tx))
        .await;
    drop(tx);
    progress_task.await.ok();

    let mut failed = 0_usize;
    for snapshot in &results {
        if snapshot.status == ScanStatus::Failed {
            failed += 1;
        }

        if !args.dry_run {
            if let Err(e) = aivis_db::insert_snapshot(
                &pool,
                &crate::scan::new_snapshot_from_measurement(snapshot.keyword_id, snapshot),
            )
            .await
            {
                tracing::error!(keyword_id = snapshot.keyword_id, error = %e, "snapshot persistence failed");
            }
        }

        let rank = snapshot
            .organic
            .position
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        println!(
            "{:<32} organic:{:<3} overview:{:<5} mode:{}",
            snapshot.term,
            rank,
            snapshot.ai_overview.cited,
            snapshot.ai_mode_status
        );
    }

    if failed > 0 {
        println!("{failed}/{} keywords failed", results.len());
    }

    Ok(())
}
