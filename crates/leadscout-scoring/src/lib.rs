//! Lead scoring for LeadScout.
//!
//! Turns a lead's audit signals into a 0-100 deficiency score and buckets the
//! score into a sales tier. Everything here is pure: no I/O and no clock.

pub mod classifier;
pub mod scorer;

pub use classifier::{
    classify, rank_hot_leads, report_order, sort_for_report, HOT_THRESHOLD, WARM_THRESHOLD,
};
pub use scorer::{score_and_classify, score_lead};
