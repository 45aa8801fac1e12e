//! Language-model deep analysis of hot-lead websites.

pub mod client;
pub mod error;
pub mod prompt;
mod types;

pub use client::AnalysisClient;
pub use error::AnalysisError;
pub use prompt::{page_text, parse_analysis};
