use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use showscout::{
    config::Config,
    db::{create_pool, WatchedShowStore},
    services::import::parse_watched_list,
};

#[derive(Parser)]
#[command(
    name = "import_watched_shows",
    about = "Replace the watched list with the contents of a text file"
)]
struct Cli {
    /// Text file with category headers followed by "- title" lines
    file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("showscout=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing::info!(file = %cli.file.display(), "Reading watched shows");
    let content = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let shows = parse_watched_list(&content);

    let mut per_category: BTreeMap<String, usize> = BTreeMap::new();
    for show in &shows {
        let category = show.category.clone().unwrap_or_default();
        *per_category.entry(category).or_default() += 1;
    }
    for (category, count) in &per_category {
        tracing::info!(category = %category, count, "Parsed category");
    }

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to open database")?;
    let store = WatchedShowStore::new(pool);

    let imported = store.replace_all(shows).await?;
    tracing::info!(imported, "Import completed");

    Ok(())
}
