use crate::config::Settings;
use crate::github::GitHubConfig;
use crate::import::Importer;
use crate::utils::names;
use crate::{db, Result};

/// Import a repository from the command line
pub async fn import(settings: Settings, url: &str, branch: Option<String>) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let importer = Importer::new(settings, GitHubConfig::from_env(), pool)?;
    let outcome = importer.import(url, branch, "cli").await?;

    println!("\x1b[32m\u{2713}\x1b[0m Imported {}", outcome.reference.slug());
    println!("  Container: {}", outcome.container_name);
    println!("  Password:  {}", outcome.password);
    println!(
        "  Files:     {} imported, {} skipped, {}",
        outcome.file_count,
        outcome.skipped_count,
        names::human_size(outcome.total_size_bytes)
    );

    Ok(())
}

/// Show repository metadata without importing
pub async fn info(settings: Settings, url: &str) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;

    let importer = Importer::new(settings, GitHubConfig::from_env(), pool)?;
    let info = importer.repo_info(url).await?;

    println!("{}", info.reference.slug());
    if let Some(description) = &info.metadata.description {
        println!("  {description}");
    }
    println!("  Branch:   {}", info.reference.branch);
    println!("  Default:  {}", info.metadata.default_branch);
    println!("  Stars:    {}", info.metadata.star_count);
    println!("  Forks:    {}", info.metadata.fork_count);
    if let Some(language) = &info.metadata.language {
        println!("  Language: {language}");
    }
    println!("  Size:     {}", names::human_size(info.metadata.size_bytes()));
    if info.is_too_big {
        println!("  \x1b[33mToo large to import\x1b[0m");
    }

    Ok(())
}
