//! `projects` subcommands: seed-file sync and listing.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub(crate) enum ProjectsCommand {
    /// Upsert every project and keyword from the seed file.
    Sync,
    /// List stored projects.
    List,
}

pub(crate) async fn run(
    config: &aivis_core::AppConfig,
    command: ProjectsCommand,
) -> anyhow::Result<()> {
    let pool = crate::connect(config).await?;

    match command {
        ProjectsCommand::Sync => sync(config, &pool).await,
        ProjectsCommand::List => list(&pool).await,
    }
}

async fn sync(config: &aivis_core::AppConfig, pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let seed = aivis_core::load_projects(&config.projects_path)?;

    let mut project_count = 0_usize;
    let mut keyword_count = 0_usize;

    for entry in &seed.projects {
        let project = aivis_db::get_or_create_project(
            pool,
            &entry.name,
            &entry.domain,
            &entry.target_location,
        )
        .await?;
        project_count += 1;

        for term in &entry.keywords {
            aivis_db::insert_keyword(pool, project.id, term.trim(), &entry.target_location).await?;
            keyword_count += 1;
        }

        tracing::info!(domain = %entry.domain, keywords = entry.keywords.len(), "project synced");
    }

    println!("synced {project_count} projects, {keyword_count} keywords");
    Ok(())
}

async fn list(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let projects = aivis_db::list_projects(pool).await?;
    for project in projects {
        println!(
            "{:>4}  {:<24} {:<28} {}",
            project.id, project.name, project.domain, project.target_location
        );
    }
    Ok(())
}
