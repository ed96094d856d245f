use clap::{Args, Subcommand};
use crossterm::style::Stylize;
use pn_core::Result;

use crate::manager::{RunOutcome, ScraperManager};
use crate::scrapers::ScraperRegistry;

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// Scrape one source, or every source when none is given
    Scrape {
        /// Source key or short name (e.g. di, npn)
        source: Option<String>,
    },
    /// List available scrapers
    List,
}

pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager) -> Result<()> {
    match args.command {
        ScraperCommands::Scrape { source: Some(source) } => {
            let articles = manager.scrape_source(&source).await?;
            println!("Found {} new articles", articles.len());
            for article in articles {
                println!("🆕 {} - {}", article.title, article.url);
            }
        }
        ScraperCommands::Scrape { source: None } => match manager.scrape_all().await {
            RunOutcome::Completed(progress) => {
                println!("{}", progress.message);
                for source in &progress.sources_completed {
                    println!("  - {}", source);
                }
            }
            RunOutcome::Busy | RunOutcome::Started => println!("Scraping already in progress"),
        },
        ScraperCommands::List => {
            for line in list_lines(manager.registry()) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// One line per adapter: key, display name, aliases, translation flag.
pub fn list_lines(registry: &ScraperRegistry) -> Vec<String> {
    let mut lines = vec!["Available scrapers:".to_string()];
    for scraper in registry.iter() {
        let source = scraper.source();
        let aliases = scraper.cli_names().join(", ");
        let translated = if source.requires_translation() { " (translated)" } else { "" };
        lines.push(format!(
            "  {:<20} {}{} [{}]",
            source.key(),
            source.name().bold(),
            translated,
            aliases
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_lines() {
        let lines = list_lines(&ScraperRegistry::default());
        assert_eq!(lines.len(), 7);
        assert!(lines[1].trim_start().starts_with("fastighetsvarlden"));
        assert!(lines[4].contains("dagensindustri"));
        assert!(lines[4].contains("(translated)"));
        assert!(!lines[6].contains("(translated)"));
    }
}
