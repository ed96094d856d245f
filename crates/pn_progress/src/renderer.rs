use std::io::Write;

use crossterm::style::Stylize;
use pn_core::{ScrapeProgress, ScrapeStatus};

use crate::errors::ProgressError;
use crate::hub::ProgressStream;

/// One status line for a snapshot, e.g. `[2/6] scraping  Checking Cision for new articles... (3 new)`.
pub fn render_line(snapshot: &ScrapeProgress, styled: bool) -> String {
    let counter = if snapshot.total_sources > 0 {
        format!("[{}/{}]", snapshot.current_source_index, snapshot.total_sources)
    } else {
        "[-/-]".to_string()
    };
    let status = format!("{:<9}", snapshot.status.to_string());
    let tally = format!("({} new)", snapshot.articles_scraped);

    if !styled {
        return format!("{} {} {} {}", counter, status, snapshot.message, tally);
    }

    let status = match snapshot.status {
        ScrapeStatus::Idle => status.grey(),
        ScrapeStatus::Scraping => status.cyan(),
        ScrapeStatus::Completed => status.green().bold(),
        ScrapeStatus::Error => status.red().bold(),
        ScrapeStatus::Stopped => status.yellow().bold(),
    };
    format!("{} {} {} {}", counter.dark_grey(), status, snapshot.message, tally.dark_grey())
}

/// Writes a line per snapshot until the run reaches a terminal state, which is returned.
pub async fn follow<W: Write>(
    mut stream: ProgressStream,
    writer: &mut W,
    styled: bool,
) -> Result<ScrapeProgress, ProgressError> {
    while let Some(snapshot) = stream.next().await {
        writeln!(writer, "{}", render_line(&snapshot, styled))?;
        writer.flush()?;
        if snapshot.status.is_terminal() {
            if !snapshot.sources_completed.is_empty() {
                writeln!(writer, "  sources: {}", snapshot.sources_completed.join(", "))?;
            }
            return Ok(snapshot);
        }
    }
    Err(ProgressError::Closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::ProgressHub;

    fn scraping(index: usize, message: &str, total: usize) -> ScrapeProgress {
        ScrapeProgress {
            status: ScrapeStatus::Scraping,
            current_source: Some("DI".to_string()),
            sources_completed: Vec::new(),
            total_sources: 6,
            current_source_index: index,
            message: message.to_string(),
            articles_scraped: total,
        }
    }

    #[test]
    fn test_render_plain() {
        let line = render_line(&scraping(4, "Checking DI for new articles...", 3), false);
        assert_eq!(line, "[4/6] scraping  Checking DI for new articles... (3 new)");
    }

    #[test]
    fn test_render_idle() {
        let line = render_line(&ScrapeProgress::default(), false);
        assert!(line.starts_with("[-/-] idle"));
    }

    #[test]
    fn test_render_styled_keeps_text() {
        let line = render_line(&scraping(1, "Checking DI for new articles...", 0), true);
        assert!(line.contains("Checking DI for new articles..."));
        assert!(line.contains("scraping"));
    }

    #[tokio::test]
    async fn test_follow_stops_at_terminal_status() {
        let hub = ProgressHub::new();
        let stream = hub.subscribe();

        hub.publish(scraping(1, "Checking DI for new articles...", 0));
        hub.publish(ScrapeProgress {
            status: ScrapeStatus::Completed,
            sources_completed: vec!["DI".to_string()],
            message: "Check completed! Found 2 new articles".to_string(),
            articles_scraped: 2,
            ..scraping(1, "", 2)
        });
        hub.publish(scraping(1, "never rendered", 0));

        let mut out = Vec::new();
        let last = follow(stream, &mut out, false).await.unwrap();
        assert_eq!(last.status, ScrapeStatus::Completed);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Check completed! Found 2 new articles"));
        assert!(text.contains("sources: DI"));
        assert!(!text.contains("never rendered"));
    }

    #[tokio::test]
    async fn test_follow_reports_closed_hub() {
        let hub = ProgressHub::new();
        let stream = hub.subscribe();
        drop(hub);
        let mut out = Vec::new();
        assert!(matches!(follow(stream, &mut out, false).await, Err(ProgressError::Closed)));
    }
}
