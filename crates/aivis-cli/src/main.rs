mod analyze;
mod batch;
mod keywords;
mod projects;
mod scan;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "aivis-cli")]
#[command(about = "AIVIS command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sync projects and keywords from the seed file into the database.
    Projects {
        #[command(subcommand)]
        command: projects::ProjectsCommand,
    },
    /// Manage tracked keywords.
    Keywords {
        #[command(subcommand)]
        command: keywords::KeywordsCommand,
    },
    /// Scan a single keyword against a domain.
    Scan(scan::ScanArgs),
    /// Scan every active keyword of a project.
    Batch(batch::BatchArgs),
    /// Re-run qualitative analysis for a stored snapshot.
    Analyze(analyze::AnalyzeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = aivis_core::load_app_config_from_env()?;

    match cli.command {
        Commands::Projects { command } => projects::run(&config, command).await,
        Commands::Keywords { command } => keywords::run(&config, command).await,
        Commands::Scan(args) => scan::run(&config, args).await,
        Commands::Batch(args) => batch::run(&config, args).await,
        Commands::Analyze(args) => analyze::run(&config, args).await,
    }
}

/// Connect a pool from the loaded config and run migrations.
pub(crate) async fn connect(config: &aivis_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool =
        aivis_db::connect_pool(&config.database_url, aivis_db::PoolConfig::from_app_config(config))
            .await?;
    aivis_db::run_migrations(&pool).await?;
    Ok(pool)
}

/// Build the scan executor, failing with a usable message when the provider
/// key is absent.
pub(crate) fn build_executor(
    config: &aivis_core::AppConfig,
) -> anyhow::Result<aivis_scan::ScanExecutor<aivis_serp::SerpClient>> {
    let key = config
        .serp_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("AIVIS_SERP_API_KEY is required for scanning"))?;
    Ok(aivis_scan::ScanExecutor::new(aivis_serp::SerpClient::new(
        key,
        config.serp_timeout_secs,
    )?))
}
