use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use findigest::cli::{formatters, Cli, Commands, DigestCommands};
use findigest::config;
use findigest::digest;
use findigest::error::PortfolioError;
use findigest::fundamentals::AlphaVantageClient;
use findigest::mailer::Mailer;
use findigest::pricing::{self, OfflineSource, PriceSource};
use findigest::scraping;
use findigest::store::{self, HoldingsStore, JsonFileStore};
use findigest::summarizer::{analyze_sentiment, SummaryClient};
use findigest::valuation::calculate_portfolio_value;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    config::load_dotenv();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Add {
            ticker,
            shares,
            buy_price,
        } => handle_add(&ticker, &shares, &buy_price, cli.json),

        Commands::Remove { ticker } => handle_remove(&ticker, cli.json),

        Commands::List => handle_list(cli.json),

        Commands::Show => handle_show(cli.json).await,

        Commands::News { ticker } => handle_news(&ticker).await,

        Commands::Summary { ticker } => handle_summary(&ticker).await,

        Commands::Digest { action } => match action {
            DigestCommands::Preview => handle_digest_preview().await,
            DigestCommands::Send => handle_digest_send().await,
            DigestCommands::Schedule => handle_digest_schedule().await,
            DigestCommands::Monitor { threshold } => handle_digest_monitor(threshold).await,
        },
    }
}

/// Parse a decimal CLI argument with the flag name in the error
fn parse_decimal(name: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|_| PortfolioError::ValidationError(format!("{} must be a number, got '{}'", name, raw)).into())
}

fn handle_add(ticker: &str, shares: &str, buy_price: &str, json: bool) -> Result<()> {
    let shares = parse_decimal("shares", shares)?;
    let buy_price = parse_decimal("buy-price", buy_price)?;

    let store = JsonFileStore::open_default()?;
    let holdings = store::add_holding(&store, ticker, shares, buy_price)?;

    if json {
        println!("{}", formatters::format_holdings_json(&holdings));
    } else {
        use colored::Colorize;
        println!("{} Added {} to portfolio\n", "✓".green().bold(), ticker.trim().to_uppercase());
        println!("{}", formatters::format_holdings_table(&holdings));
    }
    Ok(())
}

fn handle_remove(ticker: &str, json: bool) -> Result<()> {
    let store = JsonFileStore::open_default()?;
    let holdings = store::remove_holding(&store, ticker)?;

    if json {
        println!("{}", formatters::format_holdings_json(&holdings));
    } else {
        use colored::Colorize;
        println!("{} Removed {} from portfolio\n", "✓".green().bold(), ticker.trim().to_uppercase());
        println!("{}", formatters::format_holdings_table(&holdings));
    }
    Ok(())
}

fn handle_list(json: bool) -> Result<()> {
    let store = JsonFileStore::open_default()?;
    let holdings = store.load()?;

    if json {
        println!("{}", formatters::format_holdings_json(&holdings));
    } else {
        println!("{}", formatters::format_holdings_table(&holdings));
    }
    Ok(())
}

/// Allow disabling live price fetching via env var (offline runs, tests)
fn skip_price_fetch() -> bool {
    std::env::var("FINDIGEST_SKIP_PRICE_FETCH")
        .map(|v| v != "0")
        .unwrap_or(false)
}

async fn handle_show(json: bool) -> Result<()> {
    info!("Generating portfolio valuation");

    let store = JsonFileStore::open_default()?;

    let (rows, summary) = if skip_price_fetch() {
        calculate_portfolio_value(&store, &OfflineSource).await?
    } else {
        calculate_portfolio_value(&store, pricing::global_source()).await?
    };

    if json {
        println!("{}", formatters::format_valuation_json(&rows, &summary));
    } else {
        println!("{}", formatters::format_valuation_table(&rows, &summary));
    }
    Ok(())
}

async fn handle_news(ticker: &str) -> Result<()> {
    let ticker = store::normalize_ticker(ticker);
    let items = scraping::fetch_news(&ticker).await;
    println!("{}", formatters::format_news(&ticker, &items));
    Ok(())
}

async fn handle_summary(ticker: &str) -> Result<()> {
    let ticker = store::normalize_ticker(ticker);

    let fundamentals_client = AlphaVantageClient::from_env()?;
    let summary_client = SummaryClient::from_env()?;

    let fundamentals = fundamentals_client.fetch_fundamentals(&ticker).await?;
    let news = scraping::fetch_news(&ticker).await;
    let news_text = scraping::news_text(&news);

    let summary = summary_client
        .summarize_or_fallback(&ticker, &fundamentals, &news_text)
        .await;
    let sentiment = analyze_sentiment(&summary);

    println!(
        "{}",
        formatters::format_summary(&ticker, &fundamentals, &summary, sentiment.as_str())
    );
    Ok(())
}

async fn handle_digest_preview() -> Result<()> {
    let store = JsonFileStore::open_default()?;
    let source = price_source_for_digest();

    let digest = digest::generate_daily_summary(&store, source.as_ref()).await?;
    println!("{}", digest.body);
    println!("CSV report: {:?}", digest.report_path);
    Ok(())
}

async fn handle_digest_send() -> Result<()> {
    let store = JsonFileStore::open_default()?;
    let source = price_source_for_digest();

    let smtp = config::SmtpConfig::from_env()?;
    let mailer = Mailer::from_config(&smtp)?;

    let digest = digest::generate_daily_summary(&store, source.as_ref()).await?;
    mailer
        .send(digest::DIGEST_SUBJECT, &digest.body, Some(&digest.report_path))
        .await?;

    use colored::Colorize;
    println!("{} Daily digest sent to {}", "✓".green().bold(), smtp.recipient);
    Ok(())
}

async fn handle_digest_schedule() -> Result<()> {
    let store = JsonFileStore::open_default()?;
    let source = price_source_for_digest();

    let smtp = config::SmtpConfig::from_env()?;
    let mailer = Mailer::from_config(&smtp)?;
    let at = config::digest_time()?;

    println!("Scheduled daily digest for {} at {} (Ctrl-C to stop)", smtp.recipient, at.format("%H:%M"));
    digest::run_schedule(&store, source.as_ref(), &mailer, at).await
}

async fn handle_digest_monitor(threshold: i8) -> Result<()> {
    let store = JsonFileStore::open_default()?;
    let source = price_source_for_digest();

    let fundamentals_client = AlphaVantageClient::from_env()?;
    let summary_client = SummaryClient::from_env()?;

    let findings = digest::monitor_sentiment(
        &store,
        source.as_ref(),
        &fundamentals_client,
        &summary_client,
        threshold,
    )
    .await?;

    if findings.is_empty() {
        println!("No bearish sentiment detected.");
        return Ok(());
    }

    let message = digest::render_bearish_alert(&findings);

    let smtp = config::SmtpConfig::from_env()?;
    let mailer = Mailer::from_config(&smtp)?;
    mailer.send("Findigest Sentiment Alert", &message, None).await?;

    use colored::Colorize;
    println!(
        "{} Bearish sentiment alert sent for {} ticker(s)",
        "⚠".yellow().bold(),
        findings.len()
    );
    Ok(())
}

fn price_source_for_digest() -> Box<dyn PriceSource> {
    if skip_price_fetch() {
        Box::new(OfflineSource)
    } else {
        Box::new(pricing::PriceFetcher::new())
    }
}
