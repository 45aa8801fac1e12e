//! Run orchestration for LeadScout.
//!
//! Resolves industries, discovers businesses, then collects signals, scores
//! and optionally deep-analyses each lead with bounded concurrency. Network
//! collaborators sit behind the traits in [`traits`] so runs can be driven by
//! fakes in tests.

mod adapters;
mod error;
mod industries;
mod runner;
pub mod traits;

pub use adapters::CatalogIndustries;
pub use error::PipelineError;
pub use industries::{industries_for, resolve_pairs, SearchPair};
pub use runner::{BatchResult, Pipeline, PipelineOptions, RunSummary};
pub use traits::{BusinessDiscovery, CapabilityError, DeepAnalyzer, IndustrySource, SignalCollector};
