// Scraper for finviz.com headline data
//
// Finviz quote pages carry a plain HTML news table (id="news-table"),
// so a straight GET plus an HTML parse is enough; no browser automation
// required.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::info;

use super::NewsItem;

const FINVIZ_BASE_URL: &str = "https://finviz.com";

/// How many headlines to keep per ticker
const MAX_HEADLINES: usize = 5;

/// Finviz headline scraper.
pub struct FinvizScraper {
    http: Client,
    base_url: String,
}

impl FinvizScraper {
    pub fn new() -> Result<Self> {
        Self::with_base_url(FINVIZ_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        // Finviz rejects requests without a browser-like user agent
        let http = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Fetch recent news headlines for a ticker.
    pub async fn fetch_headlines(&self, ticker: &str) -> Result<Vec<NewsItem>> {
        let url = format!("{}/quote.ashx?t={}", self.base_url, ticker);
        info!("Fetching news headlines for {} from Finviz", ticker);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Finviz")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Finviz returned error status: {}",
                response.status()
            ));
        }

        let html = response
            .text()
            .await
            .context("Failed to read Finviz response body")?;

        Ok(parse_headlines(&html))
    }
}

/// Extract headlines from a Finviz quote page.
///
/// Split out of the fetch path so it can be exercised against fixture
/// HTML without a network.
pub fn parse_headlines(html: &str) -> Vec<NewsItem> {
    let document = Html::parse_document(html);

    // Selectors are static strings; a parse failure is a programming error
    let table_selector = Selector::parse("#news-table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let Some(table) = document.select(&table_selector).next() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for row in table.select(&row_selector).take(MAX_HEADLINES) {
        let Some(link) = row.select(&link_selector).next() else {
            continue;
        };

        let title = link.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        items.push(NewsItem {
            title,
            source: "Finviz".to_string(),
            link: link.value().attr("href").unwrap_or_default().to_string(),
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <table id="news-table">
            <tr><td>Oct-10-25</td><td><a href="https://example.com/a">Apple beats earnings estimates</a></td></tr>
            <tr><td>Oct-09-25</td><td><a href="https://example.com/b">iPhone demand stays strong</a></td></tr>
            <tr><td>Oct-08-25</td><td><a href="https://example.com/c">Analysts raise price targets</a></td></tr>
            <tr><td>Oct-07-25</td><td><a href="https://example.com/d">Services revenue grows</a></td></tr>
            <tr><td>Oct-06-25</td><td><a href="https://example.com/e">Buyback program expanded</a></td></tr>
            <tr><td>Oct-05-25</td><td><a href="https://example.com/f">Sixth headline never returned</a></td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_headlines_extracts_title_and_link() {
        let items = parse_headlines(FIXTURE);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].title, "Apple beats earnings estimates");
        assert_eq!(items[0].link, "https://example.com/a");
        assert_eq!(items[0].source, "Finviz");
    }

    #[test]
    fn test_parse_headlines_caps_at_five() {
        let items = parse_headlines(FIXTURE);
        assert!(items.iter().all(|i| i.title != "Sixth headline never returned"));
    }

    #[test]
    fn test_parse_headlines_missing_table_yields_empty() {
        let items = parse_headlines("<html><body><p>no news here</p></body></html>");
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_headlines_skips_rows_without_links() {
        let html = r#"
            <table id="news-table">
                <tr><td>no link in this row</td></tr>
                <tr><td><a href="/x">Real headline</a></td></tr>
            </table>
        "#;
        let items = parse_headlines(html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Real headline");
    }
}
