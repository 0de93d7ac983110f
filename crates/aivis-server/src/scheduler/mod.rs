//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers two
//! recurring jobs: one enqueues stale active keywords (the same selection
//! the HTTP cron trigger makes), the other drains the scan queue through
//! the batch pipeline. The queue cadence is the only retry mechanism for
//! failed keywords — the pipeline itself never retries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use aivis_analysis::Enricher;
use aivis_scan::{BatchScheduler, KeywordSpec, ScanExecutor};
use aivis_serp::SerpClient;

use crate::api::to_new_snapshot;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<aivis_core::AppConfig>,
    executor: Option<Arc<ScanExecutor<SerpClient>>>,
    enricher: Option<Arc<Enricher>>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_stale_enqueue_job(&scheduler, pool.clone(), Arc::clone(&config)).await?;

    if let Some(executor) = executor {
        register_queue_drain_job(&scheduler, pool, config, executor, enricher).await?;
    } else {
        tracing::warn!("search provider not configured; queue-drain job disabled");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the hourly stale-keyword enqueue (at minute 7).
///
/// Selects up to the configured limit of active keywords whose latest
/// snapshot predates the staleness cutoff and adds them to the scan queue.
async fn register_stale_enqueue_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<aivis_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 7 * * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            run_stale_enqueue(&pool, &config).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn run_stale_enqueue(pool: &PgPool, config: &aivis_core::AppConfig) {
    let cutoff = Utc::now() - Duration::hours(config.cron_stale_after_hours);

    let stale = match aivis_db::list_stale_active_keywords(pool, cutoff, config.cron_scan_limit)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to select stale keywords");
            return;
        }
    };

    if stale.is_empty() {
        tracing::debug!("scheduler: no stale keywords to enqueue");
        return;
    }

    let keyword_ids: Vec<i64> = stale.iter().map(|k| k.id).collect();
    match aivis_db::enqueue_keywords(pool, &keyword_ids).await {
        Ok(queued) => tracing::info!(queued, "scheduler: enqueued stale keywords"),
        Err(e) => tracing::error!(error = %e, "scheduler: failed to enqueue stale keywords"),
    }
}

/// Register the queue drain, every 10 minutes.
async fn register_queue_drain_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<aivis_core::AppConfig>,
    executor: Arc<ScanExecutor<SerpClient>>,
    enricher: Option<Arc<Enricher>>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 */10 * * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);
        let executor = Arc::clone(&executor);
        let enricher = enricher.clone();

        Box::pin(async move {
            run_queue_drain(&pool, &config, &executor, enricher.as_ref()).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Drain one batch of pending queue items through the scan pipeline.
///
/// Items whose keyword vanished or went inactive are marked failed; the
/// rest are scanned per project (each project ranks against its own domain),
/// persisted, and marked done or failed per the scan outcome.
async fn run_queue_drain(
    pool: &PgPool,
    config: &aivis_core::AppConfig,
    executor: &ScanExecutor<SerpClient>,
    enricher: Option<&Arc<Enricher>>,
) {
    let items = match aivis_db::take_pending_queue(pool, config.cron_scan_limit).await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to claim queue items");
            return;
        }
    };

    if items.is_empty() {
        return;
    }

    tracing::info!(count = items.len(), "scheduler: draining scan queue");

    let projects = match aivis_db::list_projects(pool).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load projects");
            return;
        }
    };
    let domains: HashMap<i64, String> = projects
        .into_iter()
        .map(|p| (p.id, p.domain))
        .collect();

    // queue item id by keyword id, for outcome bookkeeping.
    let mut queue_ids: HashMap<i64, i64> = HashMap::new();
    // keyword specs grouped by project.
    let mut per_project: HashMap<i64, Vec<KeywordSpec>> = HashMap::new();

    for item in &items {
        queue_ids.insert(item.keyword_id, item.id);

        let keyword = match aivis_db::get_keyword(pool, item.keyword_id).await {
            Ok(Some(row)) if row.is_active => row,
            Ok(_) => {
                tracing::warn!(
                    keyword_id = item.keyword_id,
                    "scheduler: queued keyword missing or inactive; marking failed"
                );
                mark_item(pool, item.id, "failed").await;
                continue;
            }
            Err(e) => {
                tracing::error!(keyword_id = item.keyword_id, error = %e, "scheduler: keyword lookup failed");
                mark_item(pool, item.id, "failed").await;
                continue;
            }
        };

        per_project.entry(keyword.project_id).or_default().push(KeywordSpec {
            id: keyword.id,
            term: keyword.term,
            location: keyword.location,
        });
    }

    let batch = BatchScheduler::new(
        config.scan_window_size,
        std::time::Duration::from_millis(config.scan_inter_window_delay_ms),
    );

    for (project_id, specs) in per_project {
        let Some(domain) = domains.get(&project_id) else {
            tracing::warn!(project_id, "scheduler: project missing for queued keywords");
            for spec in &specs {
                if let Some(&queue_id) = queue_ids.get(&spec.id) {
                    mark_item(pool, queue_id, "failed").await;
                }
            }
            continue;
        };

        let results = batch.run(executor, &specs, domain, None).await;

        for snapshot in results {
            let scanned = snapshot.status == aivis_scan::ScanStatus::Scanned;

            let persisted = match aivis_db::insert_snapshot(
                pool,
                &to_new_snapshot(snapshot.keyword_id, &snapshot),
            )
            .await
            {
                Ok(row) => {
                    if let Some(enricher) = enricher {
                        let _ = enricher.spawn(row.id, &snapshot);
                    }
                    true
                }
                Err(e) => {
                    tracing::error!(keyword_id = snapshot.keyword_id, error = %e, "scheduler: snapshot persistence failed");
                    false
                }
            };

            if let Some(&queue_id) = queue_ids.get(&snapshot.keyword_id) {
                let outcome = if scanned && persisted { "done" } else { "failed" };
                mark_item(pool, queue_id, outcome).await;
            }
        }
    }
}

async fn mark_item(pool: &PgPool, queue_id: i64, status: &str) {
    if let Err(e) = aivis_db::mark_queue_item(pool, queue_id, status).await {
        tracing::error!(queue_id, error = %e, "scheduler: failed to update queue item");
    }
}
