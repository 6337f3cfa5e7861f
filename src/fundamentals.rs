//! Company fundamentals via the Alpha Vantage API
//!
//! Pulls the OVERVIEW endpoint for valuation ratios and the
//! INCOME_STATEMENT endpoint for the latest annual EBITDA/revenue/net
//! income. Alpha Vantage omits fields freely on the free tier, so every
//! field is optional and absence is tolerated.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config;

const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

/// Alpha Vantage OVERVIEW response (subset)
#[derive(Debug, Deserialize)]
struct OverviewResponse {
    #[serde(rename = "Symbol")]
    symbol: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "EPS")]
    eps: Option<String>,
    #[serde(rename = "DividendYield")]
    dividend_yield: Option<String>,
    #[serde(rename = "Beta")]
    beta: Option<String>,
    #[serde(rename = "52WeekHigh")]
    week_52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    week_52_low: Option<String>,
}

/// Alpha Vantage INCOME_STATEMENT response (subset)
#[derive(Debug, Deserialize)]
struct IncomeStatementResponse {
    #[serde(rename = "annualReports")]
    annual_reports: Option<Vec<AnnualReport>>,
}

#[derive(Debug, Deserialize)]
struct AnnualReport {
    #[serde(rename = "ebitda")]
    ebitda: Option<String>,
    #[serde(rename = "totalRevenue")]
    total_revenue: Option<String>,
    #[serde(rename = "netIncome")]
    net_income: Option<String>,
}

/// Company fundamentals snapshot.
///
/// Figures are kept as the strings Alpha Vantage returns; they feed prose
/// and prompts, not arithmetic.
#[derive(Debug, Clone, Default)]
pub struct Fundamentals {
    pub ticker: String,
    pub company: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<String>,
    pub pe_ratio: Option<String>,
    pub eps: Option<String>,
    pub dividend_yield: Option<String>,
    pub beta: Option<String>,
    pub week_52_high: Option<String>,
    pub week_52_low: Option<String>,
    pub ebitda: Option<String>,
    pub revenue: Option<String>,
    pub net_income: Option<String>,
}

impl Fundamentals {
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.sector.is_none() && self.pe_ratio.is_none()
    }

    /// Render as "key: value" lines for prompts and digests.
    pub fn to_lines(&self) -> String {
        let mut lines = Vec::new();
        let mut push = |label: &str, value: &Option<String>| {
            if let Some(v) = value {
                if !v.is_empty() {
                    lines.push(format!("{}: {}", label, v));
                }
            }
        };

        push("Company", &self.company);
        push("Sector", &self.sector);
        push("Industry", &self.industry);
        push("Market Cap ($)", &self.market_cap);
        push("P/E Ratio", &self.pe_ratio);
        push("EPS", &self.eps);
        push("Dividend Yield", &self.dividend_yield);
        push("Beta", &self.beta);
        push("52w High", &self.week_52_high);
        push("52w Low", &self.week_52_low);
        push("EBITDA ($)", &self.ebitda);
        push("Revenue ($)", &self.revenue);
        push("Net Income ($)", &self.net_income);

        lines.join("\n")
    }
}

/// Alpha Vantage fundamentals client.
pub struct AlphaVantageClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// Build a client with the API key from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = config::alpha_vantage_key()?;
        Self::with_base_url(ALPHA_VANTAGE_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; FindigestBot/1.0)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch company overview plus latest annual income figures.
    ///
    /// A symbol Alpha Vantage does not know yields an empty-ish
    /// `Fundamentals` rather than an error; the income statement is
    /// best-effort on top of the overview.
    pub async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        info!("Fetching fundamentals for {} from Alpha Vantage", ticker);

        let overview_url = format!(
            "{}/query?function=OVERVIEW&symbol={}&apikey={}",
            self.base_url, ticker, self.api_key
        );

        let overview: OverviewResponse = self
            .http
            .get(&overview_url)
            .send()
            .await
            .context("Failed to send OVERVIEW request to Alpha Vantage")?
            .error_for_status()
            .map_err(|e| anyhow!("Alpha Vantage OVERVIEW returned error status: {}", e))?
            .json()
            .await
            .context("Failed to parse Alpha Vantage OVERVIEW response")?;

        let mut fundamentals = Fundamentals {
            ticker: ticker.to_string(),
            ..Default::default()
        };

        if overview.symbol.is_some() {
            fundamentals.company = overview.name;
            fundamentals.sector = overview.sector;
            fundamentals.industry = overview.industry;
            fundamentals.market_cap = overview.market_cap;
            fundamentals.pe_ratio = overview.pe_ratio;
            fundamentals.eps = overview.eps;
            fundamentals.dividend_yield = overview.dividend_yield;
            fundamentals.beta = overview.beta;
            fundamentals.week_52_high = overview.week_52_high;
            fundamentals.week_52_low = overview.week_52_low;
        } else {
            warn!("Alpha Vantage has no overview data for {}", ticker);
        }

        let income_url = format!(
            "{}/query?function=INCOME_STATEMENT&symbol={}&apikey={}",
            self.base_url, ticker, self.api_key
        );

        // Income statement is an enrichment; a failure here must not lose
        // the overview we already have
        match self.fetch_income_statement(&income_url).await {
            Ok(Some(report)) => {
                fundamentals.ebitda = report.ebitda;
                fundamentals.revenue = report.total_revenue;
                fundamentals.net_income = report.net_income;
            }
            Ok(None) => {}
            Err(e) => warn!("Alpha Vantage income statement error for {}: {}", ticker, e),
        }

        Ok(fundamentals)
    }

    async fn fetch_income_statement(&self, url: &str) -> Result<Option<AnnualReport>> {
        let income: IncomeStatementResponse = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to send INCOME_STATEMENT request to Alpha Vantage")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse Alpha Vantage INCOME_STATEMENT response")?;

        Ok(income
            .annual_reports
            .and_then(|reports| reports.into_iter().next()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fundamentals_to_lines_skips_absent_fields() {
        let fundamentals = Fundamentals {
            ticker: "AAPL".to_string(),
            company: Some("Apple Inc".to_string()),
            pe_ratio: Some("29.1".to_string()),
            eps: Some("".to_string()),
            ..Default::default()
        };

        let lines = fundamentals.to_lines();
        assert!(lines.contains("Company: Apple Inc"));
        assert!(lines.contains("P/E Ratio: 29.1"));
        assert!(!lines.contains("EPS"));
        assert!(!lines.contains("Sector"));
    }

    #[test]
    fn test_fundamentals_is_empty() {
        let empty = Fundamentals {
            ticker: "ZZZZ".to_string(),
            ..Default::default()
        };
        assert!(empty.is_empty());

        let populated = Fundamentals {
            ticker: "AAPL".to_string(),
            company: Some("Apple Inc".to_string()),
            ..Default::default()
        };
        assert!(!populated.is_empty());
    }
}
