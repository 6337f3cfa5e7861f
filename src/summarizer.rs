//! AI equity summaries and keyword sentiment scoring
//!
//! The summary comes from an OpenAI-compatible chat-completions endpoint;
//! the sentiment label is a deliberately simple keyword scan over the
//! summary text. Positive keywords win ties with negative ones, matching
//! the check order of the classifier.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config;
use crate::fundamentals::Fundamentals;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const SUMMARY_MODEL: &str = "gpt-4o-mini";

/// Cap on the news text included in the prompt
const NEWS_PROMPT_LIMIT: usize = 2000;

/// Fallback text shown when the summary request fails
pub const SUMMARY_UNAVAILABLE: &str =
    "AI summary unavailable - check your OpenAI API key or network connection.";

/// Sentiment label derived from summary prose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Numeric score used by the bearish-alert threshold: +1 / 0 / -1
    pub fn score(&self) -> i8 {
        match self {
            Sentiment::Positive => 1,
            Sentiment::Neutral => 0,
            Sentiment::Negative => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const POSITIVE_KEYWORDS: &[&str] = &[
    "growth", "strong", "beat", "bullish", "improved", "upside", "profit", "resilient", "momentum",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "decline", "weak", "bearish", "loss", "downgrade", "headwind", "slowdown", "risk",
];

/// Rule-based sentiment from summary prose.
///
/// Pure function over the text, no I/O. Any positive keyword marks the
/// text positive before negative keywords are consulted.
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let text = text.to_lowercase();

    if POSITIVE_KEYWORDS.iter().any(|word| text.contains(word)) {
        Sentiment::Positive
    } else if NEGATIVE_KEYWORDS.iter().any(|word| text.contains(word)) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for the chat-completions summary endpoint.
pub struct SummaryClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SummaryClient {
    pub fn from_env() -> Result<Self> {
        let api_key = config::openai_api_key()?;
        Self::with_base_url(OPENAI_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Generate a three-paragraph equity summary of a ticker from its
    /// fundamentals and recent news.
    pub async fn summarize_ticker(
        &self,
        ticker: &str,
        fundamentals: &Fundamentals,
        news_text: &str,
    ) -> Result<String> {
        info!("Generating AI summary for {}", ticker);

        let prompt = build_prompt(ticker, fundamentals, news_text);

        let body = json!({
            "model": SUMMARY_MODEL,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": 500,
            "temperature": 0.6,
        });

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to the summary endpoint")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "summary endpoint returned error status: {}",
                response.status()
            ));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("summary endpoint returned no choices"))?;

        Ok(normalize_paragraphs(&content))
    }

    /// Like `summarize_ticker` but never fails: a request error degrades
    /// to a fixed placeholder so UIs and digests always have text.
    pub async fn summarize_or_fallback(
        &self,
        ticker: &str,
        fundamentals: &Fundamentals,
        news_text: &str,
    ) -> String {
        match self.summarize_ticker(ticker, fundamentals, news_text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summarization error for {}: {}", ticker, e);
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}

fn build_prompt(ticker: &str, fundamentals: &Fundamentals, news_text: &str) -> String {
    let fundamentals_text = if fundamentals.is_empty() {
        "Fundamental data not available.".to_string()
    } else {
        fundamentals.to_lines()
    };

    let news_section = if news_text.is_empty() {
        "No recent news available."
    } else {
        truncate_chars(news_text, NEWS_PROMPT_LIMIT)
    };

    format!(
        "You are a professional equity research analyst.\n\n\
         Write a concise, structured 3-paragraph summary of the stock {ticker} \
         based on its fundamentals and recent market/news context.\n\n\
         FUNDAMENTALS\n{fundamentals_text}\n\n\
         RECENT NEWS & MARKET EVENTS\n{news_section}\n\n\
         Write three clearly separated paragraphs (no bullet points):\n\
         1. Overview: what the company does, its sector, valuation ratios, \
         market position, and key financial highlights.\n\
         2. Recent Developments: at least two meaningful updates from the \
         recent news or analyst commentary.\n\
         3. Risks & Outlook: a brief risk analysis and investor outlook based \
         on financial or macro trends.\n\n\
         Use a neutral, professional tone. Keep the response under 250 words. \
         Do NOT include section headers or markdown symbols; just clean \
         paragraphs separated by a blank line."
    )
}

/// Truncate on a char boundary; slicing bytes would panic on multibyte text.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse the model's paragraph spacing to single blank lines.
fn normalize_paragraphs(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_positive_keywords() {
        assert_eq!(
            analyze_sentiment("Strong quarterly growth with improved margins"),
            Sentiment::Positive
        );
        assert_eq!(analyze_sentiment("MOMENTUM continues"), Sentiment::Positive);
    }

    #[test]
    fn test_sentiment_negative_keywords() {
        assert_eq!(
            analyze_sentiment("Revenue decline amid sector headwinds"),
            Sentiment::Negative
        );
        assert_eq!(analyze_sentiment("analyst downgrade"), Sentiment::Negative);
    }

    #[test]
    fn test_sentiment_neutral_fallback() {
        assert_eq!(
            analyze_sentiment("The company reported results in line with estimates"),
            Sentiment::Neutral
        );
        assert_eq!(analyze_sentiment(""), Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_positive_wins_mixed_text() {
        // Classifier checks positive keywords first
        assert_eq!(
            analyze_sentiment("strong growth despite downgrade risk"),
            Sentiment::Positive
        );
    }

    #[test]
    fn test_sentiment_scores() {
        assert_eq!(Sentiment::Positive.score(), 1);
        assert_eq!(Sentiment::Neutral.score(), 0);
        assert_eq!(Sentiment::Negative.score(), -1);
    }

    #[test]
    fn test_normalize_paragraphs() {
        let raw = "First paragraph.\n\n\n  Second paragraph.  \n\nThird.";
        assert_eq!(
            normalize_paragraphs(raw),
            "First paragraph.\n\nSecond paragraph.\n\nThird."
        );
    }

    #[test]
    fn test_truncate_chars_multibyte_safe() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 3), "ééé");
        assert_eq!(truncate_chars(text, 10), "ééééé");
    }

    #[test]
    fn test_prompt_handles_missing_inputs() {
        let fundamentals = Fundamentals {
            ticker: "ZZZZ".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt("ZZZZ", &fundamentals, "");
        assert!(prompt.contains("Fundamental data not available."));
        assert!(prompt.contains("No recent news available."));
    }
}
