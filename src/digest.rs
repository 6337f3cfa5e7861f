//! Daily digest generation and sentiment alerting
//!
//! Builds the plain-text daily summary email from a valuation run, writes
//! the CSV report that rides along as an attachment, and hosts the
//! long-running scheduler that fires the digest at a fixed local time.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveTime};
use tracing::{error, info};

use crate::config;
use crate::fundamentals::{AlphaVantageClient, Fundamentals};
use crate::mailer::Mailer;
use crate::pricing::PriceSource;
use crate::scraping;
use crate::store::HoldingsStore;
use crate::summarizer::{analyze_sentiment, Sentiment, SummaryClient};
use crate::utils::format_currency;
use crate::valuation::{calculate_portfolio_value, ValuationRow};

pub const DIGEST_SUBJECT: &str = "Findigest Daily Summary";

/// A rendered digest: the email body plus the CSV report on disk.
#[derive(Debug)]
pub struct DailyDigest {
    pub body: String,
    pub report_path: PathBuf,
}

/// A ticker flagged by the sentiment monitor.
#[derive(Debug)]
pub struct BearishFinding {
    pub ticker: String,
    pub sentiment: Sentiment,
    pub summary: String,
}

/// Run a valuation and render the daily summary.
///
/// The CSV report is written next to the store so the mailer can attach
/// it. Holdings whose price lookup failed appear in neither the body nor
/// the CSV.
pub async fn generate_daily_summary(
    store: &dyn HoldingsStore,
    source: &dyn PriceSource,
) -> Result<DailyDigest> {
    generate_daily_summary_at(store, source, config::report_path()?).await
}

/// `generate_daily_summary` with an explicit CSV report location.
pub async fn generate_daily_summary_at(
    store: &dyn HoldingsStore,
    source: &dyn PriceSource,
    report_path: PathBuf,
) -> Result<DailyDigest> {
    let (rows, summary) = calculate_portfolio_value(store, source).await?;

    let table = if rows.is_empty() {
        "(no priced holdings)".to_string()
    } else {
        render_rows_plain(&rows)
    };

    let sentiment = analyze_sentiment(&table);

    let body = format!(
        "Findigest Daily Summary\n\n\
         Portfolio Value: {}\n\
         Net P/L: {}\n\n\
         Holdings Summary:\n{}\n\n\
         Sentiment: {}\n",
        format_currency(summary.total_value),
        format_currency(summary.net_pnl),
        table,
        sentiment
    );

    write_csv_report(&rows, &report_path)?;

    Ok(DailyDigest { body, report_path })
}

/// Plain-text holdings table for email bodies (no ANSI styling).
fn render_rows_plain(rows: &[ValuationRow]) -> String {
    use tabled::{builder::Builder, settings::Style};

    let mut builder = Builder::default();
    builder.push_record(["Ticker", "Shares", "Buy Price", "Price", "Value", "P/L"]);
    for row in rows {
        builder.push_record([
            row.ticker.clone(),
            row.shares.to_string(),
            row.buy_price.to_string(),
            row.current_price.to_string(),
            row.value.to_string(),
            row.pnl.to_string(),
        ]);
    }

    builder.build().with(Style::ascii()).to_string()
}

/// Write the valuation rows as the CSV report.
fn write_csv_report(rows: &[ValuationRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV report at {:?}", path))?;

    writer.write_record(["ticker", "shares", "buy_price", "current_price", "value", "pnl"])?;
    for row in rows {
        writer.write_record([
            row.ticker.clone(),
            row.shares.to_string(),
            row.buy_price.to_string(),
            row.current_price.to_string(),
            row.value.to_string(),
            row.pnl.to_string(),
        ])?;
    }

    writer.flush().context("Failed to flush CSV report")?;
    info!("Wrote CSV report to {:?}", path);
    Ok(())
}

/// Check every priced holding for bearish sentiment.
///
/// For each ticker: fundamentals + headlines feed an AI summary, the
/// summary is scored, and anything at or below `threshold` is collected.
/// Per-ticker fetch problems degrade (empty fundamentals, empty news,
/// placeholder summary) rather than aborting the sweep.
pub async fn monitor_sentiment(
    store: &dyn HoldingsStore,
    source: &dyn PriceSource,
    fundamentals_client: &AlphaVantageClient,
    summary_client: &SummaryClient,
    threshold: i8,
) -> Result<Vec<BearishFinding>> {
    let (rows, _) = calculate_portfolio_value(store, source).await?;

    let mut findings = Vec::new();
    for row in &rows {
        let fundamentals = match fundamentals_client.fetch_fundamentals(&row.ticker).await {
            Ok(f) => f,
            Err(e) => {
                error!("Fundamentals error for {}: {}", row.ticker, e);
                Fundamentals {
                    ticker: row.ticker.clone(),
                    ..Default::default()
                }
            }
        };

        let news = scraping::fetch_news(&row.ticker).await;
        let news_text = scraping::news_text(&news);

        let summary = summary_client
            .summarize_or_fallback(&row.ticker, &fundamentals, &news_text)
            .await;
        let sentiment = analyze_sentiment(&summary);

        if sentiment.score() <= threshold {
            findings.push(BearishFinding {
                ticker: row.ticker.clone(),
                sentiment,
                summary,
            });
        }
    }

    Ok(findings)
}

/// Render the bearish-alert email body.
pub fn render_bearish_alert(findings: &[BearishFinding]) -> String {
    let mut message = String::from("Bearish Sentiment Detected\n\n");
    for finding in findings {
        let excerpt: String = finding.summary.chars().take(400).collect();
        message.push_str(&format!(
            "{} - {}\n{}...\n\n",
            finding.ticker,
            finding.sentiment.as_str().to_uppercase(),
            excerpt
        ));
    }
    message
}

/// Seconds until the next local occurrence of `at`.
pub fn seconds_until_next(at: NaiveTime) -> i64 {
    let now = Local::now();
    let today_target = now.date_naive().and_time(at);
    let target = if today_target > now.naive_local() {
        today_target
    } else {
        today_target + ChronoDuration::days(1)
    };
    (target - now.naive_local()).num_seconds().max(1)
}

/// Run the digest on a daily schedule at `at` local time. Never returns;
/// send failures are logged and the loop keeps going.
pub async fn run_schedule(
    store: &dyn HoldingsStore,
    source: &dyn PriceSource,
    mailer: &Mailer,
    at: NaiveTime,
) -> Result<()> {
    info!("Scheduling daily digest at {} local time", at.format("%H:%M"));

    loop {
        let wait = seconds_until_next(at);
        info!("Next digest in {}s", wait);
        tokio::time::sleep(std::time::Duration::from_secs(wait as u64)).await;

        match generate_daily_summary(store, source).await {
            Ok(digest) => {
                if let Err(e) = mailer
                    .send(DIGEST_SUBJECT, &digest.body, Some(&digest.report_path))
                    .await
                {
                    error!("Digest send failed: {}", e);
                } else {
                    info!("Daily digest sent");
                }
            }
            Err(e) => error!("Digest generation failed: {}", e),
        }
    }
}
