//! Error handling for findigest
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for portfolio operations
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("persistence error: {0}")]
    PersistenceError(String),

    #[error("pricing error: {0}")]
    PricingError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("mail error: {0}")]
    MailError(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for portfolio operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = PortfolioError::ValidationError("ticker symbol cannot be empty".to_string());
        assert_eq!(
            err.to_string(),
            "validation error: ticker symbol cannot be empty"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("original error")).context("failed to save portfolio");
        match result {
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("failed to save portfolio"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("original error") || msg.contains("original error"));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_portfolio_error_variants() {
        let persist_err = PortfolioError::PersistenceError("test".to_string());
        assert!(persist_err.to_string().starts_with("persistence error"));

        let pricing_err = PortfolioError::PricingError("test".to_string());
        assert!(pricing_err.to_string().starts_with("pricing error"));

        let config_err = PortfolioError::ConfigError("test".to_string());
        assert!(config_err.to_string().starts_with("config error"));
    }
}
