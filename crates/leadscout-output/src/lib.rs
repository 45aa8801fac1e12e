//! Batch artifacts for LeadScout: the CSV batch, the sales report, Slack
//! alerts and the scheduled-run workflow.

mod artifact;
pub mod batch;
mod error;
pub mod report;
pub mod slack;
pub mod workflow;

pub use artifact::timestamp;
pub use batch::{latest_batch, read_batch, BatchSink, BatchStats};
pub use error::OutputError;
pub use report::{call_script, render_report, write_report};
pub use slack::{hot_lead_message, SlackNotifier};
pub use workflow::{render_workflow, write_workflow};
