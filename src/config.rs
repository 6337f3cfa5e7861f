//! Runtime configuration loaded from the environment
//!
//! Settings come from process env vars, with a `.env` file loaded once at
//! startup. API keys and SMTP credentials are optional at load time; the
//! commands that need them fail with a `ConfigError` when they are missing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveTime;

use crate::error::PortfolioError;

/// Load `.env` into the process environment if present. Safe to call more
/// than once; a missing file is not an error.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {:?}", path);
    }
}

/// Get the application data directory (~/.findigest), creating it if needed.
///
/// `FINDIGEST_HOME` overrides the default, which keeps tests and multiple
/// portfolios isolated.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var("FINDIGEST_HOME") {
        Ok(custom) => PathBuf::from(custom),
        Err(_) => {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            PathBuf::from(home).join(".findigest")
        }
    };

    std::fs::create_dir_all(&dir).context("Failed to create findigest data directory")?;
    Ok(dir)
}

/// Default path of the portfolio file (~/.findigest/portfolio.json)
pub fn default_store_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("portfolio.json"))
}

/// Path where the digest CSV report is written (~/.findigest/portfolio_report.csv)
pub fn report_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("portfolio_report.csv"))
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PortfolioError::ConfigError(format!("{} is not set", name)).into())
}

/// Alpha Vantage API key for fundamentals lookups
pub fn alpha_vantage_key() -> Result<String> {
    required_var("ALPHA_VANTAGE_KEY")
}

/// OpenAI API key for AI summaries
pub fn openai_api_key() -> Result<String> {
    required_var("OPENAI_API_KEY")
}

/// SMTP settings for digest delivery
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
}

impl SmtpConfig {
    /// Build SMTP config from the environment.
    ///
    /// `EMAIL_SENDER` doubles as the SMTP username unless `SMTP_USERNAME`
    /// is set explicitly. The recipient defaults to the sender so a solo
    /// user only has to configure one address.
    pub fn from_env() -> Result<Self> {
        let sender = required_var("EMAIL_SENDER")?;
        let password = required_var("EMAIL_PASSWORD")?;
        let host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port = match std::env::var("SMTP_PORT") {
            Ok(p) => p
                .parse::<u16>()
                .map_err(|e| PortfolioError::ConfigError(format!("invalid SMTP_PORT: {}", e)))?,
            Err(_) => 587,
        };
        let username = std::env::var("SMTP_USERNAME").unwrap_or_else(|_| sender.clone());
        let recipient = std::env::var("ALERT_EMAIL").unwrap_or_else(|_| sender.clone());

        Ok(Self {
            host,
            port,
            username,
            password,
            sender,
            recipient,
        })
    }
}

/// Local time of day at which the scheduled digest fires (default 09:00)
pub fn digest_time() -> Result<NaiveTime> {
    let raw = std::env::var("DIGEST_TIME").unwrap_or_else(|_| "09:00".to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .map_err(|e| PortfolioError::ConfigError(format!("invalid DIGEST_TIME '{}': {}", raw, e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_honors_override() {
        let tmp = tempfile::tempdir().unwrap();
        let custom = tmp.path().join("portfolio-home");
        std::env::set_var("FINDIGEST_HOME", &custom);

        let dir = data_dir().unwrap();
        assert_eq!(dir, custom);
        assert!(dir.exists());

        std::env::remove_var("FINDIGEST_HOME");
    }

    #[test]
    fn test_digest_time_parsing() {
        std::env::set_var("DIGEST_TIME", "07:30");
        let time = digest_time().unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());

        std::env::set_var("DIGEST_TIME", "not-a-time");
        assert!(digest_time().is_err());

        std::env::remove_var("DIGEST_TIME");
        assert_eq!(
            digest_time().unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_smtp_config_requires_credentials() {
        std::env::remove_var("EMAIL_SENDER");
        std::env::remove_var("EMAIL_PASSWORD");
        let result = SmtpConfig::from_env();
        assert!(result.is_err());
    }
}
