use std::io::{stdout, IsTerminal};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pn_core::{ArticleQuery, Settings, SourceFilter};
use pn_scrappers::logging::init_logging;
use pn_scrappers::{handle_command, RunOutcome, ScraperArgs, ScraperCommands, ScraperManager, SourceSelection};
use pn_storage::{create_storage, StorageKind};
use pn_translation::{create_translator, TranslationCache};
use pn_web::AppState;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if !current_number.is_empty() {
                let num = current_number
                    .parse::<u64>()
                    .map_err(|_| "Invalid number in duration".to_string())?;
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too long".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // a trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| "Duration is too long".to_string())?;
            has_unit = true;
        }

        if !has_unit || total_seconds == 0 {
            return Err("Duration must be a positive number, e.g. 30m or 1h15m".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "pn", author, version, about = "Swedish property news scraper", long_about = None)]
struct Cli {
    /// Storage backend: json or memory
    #[arg(long, env = "PN_STORAGE")]
    storage: Option<String>,
    /// Directory for the json backend
    #[arg(long, env = "PN_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Settings file (JSON)
    #[arg(long, env = "PN_CONFIG")]
    config: Option<PathBuf>,
    /// Translation service: google or none
    #[arg(long, env = "PN_TRANSLATOR", default_value = "google")]
    translator: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check sources for new articles
    Scrape {
        /// Source key or short name. All sources when omitted.
        source: Option<String>,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// List available scrapers
    List,
    /// Show stored articles
    Articles {
        #[arg(long)]
        source: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        search: Option<String>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
    /// Delete all stored articles and scrape records
    Clear,
}

async fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())
        .await
        .context("Failed to load settings")?;
    if let Some(storage) = &cli.storage {
        settings.storage.backend = storage.clone();
    }
    if let Some(data_dir) = &cli.data_dir {
        settings.storage.data_dir = data_dir.clone();
    }
    settings.validate()?;
    Ok(settings)
}

async fn build_manager(cli: &Cli, settings: &Settings) -> anyhow::Result<Arc<ScraperManager>> {
    let kind: StorageKind = settings.storage.backend.parse()?;
    let storage = create_storage(kind, &settings.storage.data_dir, settings.ui.max_articles).await?;

    let translator = create_translator(&cli.translator, &settings.translation)?;
    info!("🌐 Translation service initialized (using {})", translator.name());
    let translations = Arc::new(TranslationCache::new(translator, &settings.translation));

    let manager = ScraperManager::new(storage, translations, settings.scraping.clone());
    let names: Vec<_> = manager.registry().iter().map(|s| s.source().name()).collect();
    info!("🦗 Scrapers initialized: {}", names.join(", "));
    Ok(Arc::new(manager))
}

/// Runs every source, rendering progress lines as the run advances.
async fn scrape_all(manager: &ScraperManager) -> anyhow::Result<()> {
    let stream = manager.subscribe();
    let mut out = stdout();
    let styled = out.is_terminal();

    let (outcome, rendered) = tokio::join!(
        manager.scrape(SourceSelection::All),
        pn_progress::follow(stream, &mut out, styled)
    );
    match outcome {
        RunOutcome::Busy => anyhow::bail!("Scraping already in progress"),
        _ => {
            rendered?;
            Ok(())
        }
    }
}

async fn scrape_once(manager: &ScraperManager, source: Option<&str>) -> anyhow::Result<()> {
    match source {
        Some(source) => {
            let args = ScraperArgs {
                command: ScraperCommands::Scrape {
                    source: Some(source.to_string()),
                },
            };
            handle_command(args, manager).await?;
            Ok(())
        }
        None => scrape_all(manager).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = load_settings(&cli).await?;
    let manager = build_manager(&cli, &settings).await?;

    match &cli.command {
        Commands::Scrape { source, interval } => {
            let source = source.as_deref().filter(|s| !s.is_empty() && *s != "all");
            info!("🦗 Scraping articles from {}", source.unwrap_or("all sources"));
            match interval {
                Some(interval) => {
                    info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                    loop {
                        info!("Starting scrape cycle");
                        if let Err(e) = scrape_once(&manager, source).await {
                            error!("Error during scrape: {}", e);
                        }
                        info!("Waiting {}s before next scrape", interval.0.as_secs());
                        tokio::time::sleep(interval.0).await;
                    }
                }
                None => scrape_once(&manager, source).await?,
            }
        }
        Commands::List => {
            let args = ScraperArgs {
                command: ScraperCommands::List,
            };
            handle_command(args, &manager).await?;
        }
        Commands::Articles { source, page, search } => {
            let source: SourceFilter = source.as_deref().unwrap_or("all").parse()?;
            let query = ArticleQuery {
                source,
                page: *page,
                page_size: settings.ui.articles_per_page,
                search: search.clone(),
            };
            let result = manager.storage().query_articles(&query).await?;
            for article in &result.articles {
                println!("{} [{}] {}", article.date, article.source, article.title);
                println!("    {}", article.url);
            }
            println!(
                "Page {}/{} ({} articles)",
                result.page, result.total_pages, result.total
            );
        }
        Commands::Serve { addr } => {
            pn_web::serve(*addr, AppState::new(manager.clone(), settings.clone())).await?;
        }
        Commands::Clear => {
            manager.storage().clear().await?;
            println!("Cleared all stored articles");
        }
    }

    Ok(())
}
