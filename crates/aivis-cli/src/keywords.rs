//! `keywords` subcommands.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub(crate) enum KeywordsCommand {
    /// List a project's keywords.
    List {
        /// Project domain, e.g. "hypefresh.co".
        #[arg(long)]
        domain: String,
        /// Include soft-deleted keywords.
        #[arg(long)]
        all: bool,
    },
    /// Add (or revive) a keyword for a project.
    Add {
        #[arg(long)]
        domain: String,
        #[arg(long)]
        term: String,
        #[arg(long)]
        location: Option<String>,
    },
    /// Soft-delete a keyword; its snapshot history is retained.
    Rm {
        #[arg(long)]
        id: i64,
    },
}

pub(crate) async fn run(
    config: &aivis_core::AppConfig,
    command: KeywordsCommand,
) -> anyhow::Result<()> {
    let pool = crate::connect(config).await?;

    match command {
        KeywordsCommand::List { domain, all } => {
            let project = require_project(&pool, &domain).await?;
            let keywords = aivis_db::list_keywords(&pool, project.id, !all).await?;
            for keyword in keywords {
                let marker = if keyword.is_active { " " } else { "x" };
                println!("{:>4} {marker} {}", keyword.id, keyword.term);
            }
            Ok(())
        }
        KeywordsCommand::Add {
            domain,
            term,
            location,
        } => {
            let term = term.trim();
            anyhow::ensure!(!term.is_empty(), "keyword term must be non-empty");

            let project = require_project(&pool, &domain).await?;
            let location = location.unwrap_or_else(|| project.target_location.clone());
            let keyword = aivis_db::insert_keyword(&pool, project.id, term, &location).await?;
            println!("added keyword {} ({})", keyword.id, keyword.term);
            Ok(())
        }
        KeywordsCommand::Rm { id } => {
            aivis_db::deactivate_keyword(&pool, id).await?;
            println!("deactivated keyword {id}");
            Ok(())
        }
    }
}

async fn require_project(
    pool: &sqlx::PgPool,
    domain: &str,
) -> anyhow::Result<aivis_db::ProjectRow> {
    aivis_db::get_project_by_domain(pool, domain)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no project tracks domain '{domain}'; run `projects sync`"))
}
