use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "findigest")]
#[command(version, about = "Personal stock portfolio tracker with daily email digests")]
#[command(
    long_about = "Track a personal stock portfolio in a flat JSON file, value it with live prices, research tickers with fundamentals, news, and AI summaries, and email a daily digest."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add shares of a ticker (re-adding merges by weighted average cost)
    Add {
        /// Ticker symbol (normalized to uppercase)
        ticker: String,

        /// Number of shares bought (fractional allowed)
        shares: String,

        /// Price paid per share
        buy_price: String,
    },

    /// Remove a ticker from the portfolio entirely
    Remove {
        /// Ticker symbol
        ticker: String,
    },

    /// List stored holdings without fetching prices
    List,

    /// Value the portfolio with live prices and show P&L
    Show,

    /// Show recent news headlines for a ticker
    News {
        /// Ticker symbol
        ticker: String,
    },

    /// Research a ticker: fundamentals, news, AI summary, sentiment
    Summary {
        /// Ticker symbol
        ticker: String,
    },

    /// Daily digest generation and delivery
    Digest {
        #[command(subcommand)]
        action: DigestCommands,
    },
}

#[derive(Subcommand)]
pub enum DigestCommands {
    /// Print the digest body without sending anything
    Preview,

    /// Generate the digest and email it now
    Send,

    /// Run in the foreground, emailing the digest daily at DIGEST_TIME
    Schedule,

    /// Scan holdings for bearish sentiment and email an alert if found
    Monitor {
        /// Alert when a ticker's sentiment score is at or below this
        /// (positive = 1, neutral = 0, negative = -1)
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        threshold: i8,
    },
}
