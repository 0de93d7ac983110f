//! Offline unit tests for aivis-db pool configuration and row types.
//! These tests do not require a live database connection.

use aivis_core::{AppConfig, Environment};
use aivis_db::{NewSnapshot, PoolConfig, SnapshotRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        projects_path: PathBuf::from("./config/projects.yaml"),
        serp_api_key: None,
        assessment_api_key: None,
        cron_secret: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        serp_timeout_secs: 7,
        assessment_timeout_secs: 20,
        scan_window_size: 3,
        scan_inter_window_delay_ms: 250,
        snapshot_cache_ttl_hours: 24,
        cron_scan_limit: 10,
        cron_stale_after_hours: 24,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`SnapshotRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn snapshot_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = SnapshotRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        keyword_id: 7_i64,
        domain: "hypefresh.co".to_string(),
        organic_rank: Some(5),
        organic_url: Some("https://hypefresh.co/crm".to_string()),
        organic_title: Some("Best CRM".to_string()),
        ai_overview_cited: false,
        ai_overview_position: None,
        ai_overview_snippet: None,
        ai_mode_cited: false,
        ai_mode_position: None,
        ai_mode_snippet: None,
        ai_mode_status: "not_found".to_string(),
        screenshot_url: None,
        ai_mode_screenshot_url: None,
        sentiment_score: None,
        content_gaps: None,
        strategy_suggestions: None,
        analysis_sources: None,
        status: "scanned".to_string(),
        scan_duration_ms: 1200_i32,
        created_at: Utc::now(),
    };

    assert_eq!(row.organic_rank, Some(5));
    assert!(!row.ai_overview_cited && row.ai_overview_position.is_none());
    assert!(!row.ai_mode_cited && row.ai_mode_position.is_none());
    assert!(row.sentiment_score.is_none());
    assert_eq!(row.status, "scanned");
}

/// The insert payload defaults to the uncited shape: every rank field absent,
/// both citation flags false.
#[test]
fn new_snapshot_default_is_uncited() {
    let snapshot = NewSnapshot {
        keyword_id: 3,
        domain: "hypefresh.co".to_string(),
        status: "failed".to_string(),
        ..NewSnapshot::default()
    };

    assert!(snapshot.organic_rank.is_none());
    assert!(!snapshot.ai_overview_cited);
    assert!(snapshot.ai_overview_position.is_none());
    assert!(!snapshot.ai_mode_cited);
    assert!(snapshot.ai_mode_position.is_none());
    assert_eq!(snapshot.scan_duration_ms, 0);
}
