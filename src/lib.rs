//! Findigest - personal stock portfolio tracker
//!
//! This library provides a flat-file holdings store, a live-price
//! valuation engine, ticker research (fundamentals, news, AI summaries,
//! sentiment), and a daily email digest built on top of them.

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod fundamentals;
pub mod mailer;
pub mod pricing;
pub mod scraping;
pub mod store;
pub mod summarizer;
pub mod utils;
pub mod valuation;
