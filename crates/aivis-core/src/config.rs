use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("AIVIS_ENV", "development"))?;

    let bind_addr = parse_addr("AIVIS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("AIVIS_LOG_LEVEL", "info");
    let projects_path = PathBuf::from(or_default("AIVIS_PROJECTS_PATH", "./config/projects.yaml"));

    let serp_api_key = lookup("AIVIS_SERP_API_KEY").ok();
    let assessment_api_key = lookup("AIVIS_ASSESSMENT_API_KEY").ok();
    let cron_secret = lookup("AIVIS_CRON_SECRET").ok();

    let db_max_connections = parse_u32("AIVIS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AIVIS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AIVIS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let serp_timeout_secs = parse_u64("AIVIS_SERP_TIMEOUT_SECS", "7")?;
    let assessment_timeout_secs = parse_u64("AIVIS_ASSESSMENT_TIMEOUT_SECS", "20")?;

    let scan_window_size = parse_usize("AIVIS_SCAN_WINDOW_SIZE", "3")?;
    if scan_window_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_SCAN_WINDOW_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let scan_inter_window_delay_ms = parse_u64("AIVIS_SCAN_INTER_WINDOW_DELAY_MS", "250")?;
    let snapshot_cache_ttl_hours = parse_i64("AIVIS_SNAPSHOT_CACHE_TTL_HOURS", "24")?;
    let cron_scan_limit = parse_i64("AIVIS_CRON_SCAN_LIMIT", "10")?;
    let cron_stale_after_hours = parse_i64("AIVIS_CRON_STALE_AFTER_HOURS", "24")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        projects_path,
        serp_api_key,
        assessment_api_key,
        cron_secret,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        serp_timeout_secs,
        assessment_timeout_secs,
        scan_window_size,
        scan_inter_window_delay_ms,
        snapshot_cache_ttl_hours,
        cron_scan_limit,
        cron_stale_after_hours,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw.to_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
