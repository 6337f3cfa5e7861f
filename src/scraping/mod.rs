// Scraping module - news headline sources

pub mod finviz;

use tracing::warn;

/// A single news headline
#[derive(Debug, Clone)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub link: String,
}

/// Fetch recent headlines for a ticker, degrading to an empty list when
/// the source is unreachable. News is garnish on top of the valuation
/// data; a scrape failure must never fail the caller.
pub async fn fetch_news(ticker: &str) -> Vec<NewsItem> {
    let scraper = match finviz::FinvizScraper::new() {
        Ok(s) => s,
        Err(e) => {
            warn!("Could not build Finviz scraper: {}", e);
            return Vec::new();
        }
    };

    match scraper.fetch_headlines(ticker).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Finviz fetch error for {}: {}", ticker, e);
            Vec::new()
        }
    }
}

/// Join headlines into the "title: source" text block fed to the
/// summarizer prompt.
pub fn news_text(items: &[NewsItem]) -> String {
    items
        .iter()
        .map(|n| format!("{} ({})", n.title, n.source))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_text_joins_titles() {
        let items = vec![
            NewsItem {
                title: "First".to_string(),
                source: "Finviz".to_string(),
                link: String::new(),
            },
            NewsItem {
                title: "Second".to_string(),
                source: "Finviz".to_string(),
                link: String::new(),
            },
        ];

        assert_eq!(news_text(&items), "First (Finviz)\nSecond (Finviz)");
    }

    #[test]
    fn test_news_text_empty() {
        assert_eq!(news_text(&[]), "");
    }
}
