//! The `run` command: discovery through artifacts for one batch.

use std::sync::Arc;

use chrono::Utc;
use leadscout_analysis::AnalysisClient;
use leadscout_audit::SiteAuditor;
use leadscout_core::AppConfig;
use leadscout_output::{write_report, BatchSink, SlackNotifier};
use leadscout_pipeline::{resolve_pairs, CatalogIndustries, Pipeline, PipelineOptions, RunSummary};
use leadscout_places::PlacesClient;
use uuid::Uuid;

use crate::RunArgs;

const SLACK_TIMEOUT_SECS: u64 = 10;

/// Resolve once, run the pipeline, then persist the batch, the report and
/// the Slack alert.
///
/// Ctrl-C stops the run early; completed leads are still written.
///
/// # Errors
///
/// Returns an error if a required key is missing, a client cannot be built,
/// the run fails before processing leads, or the batch cannot be written.
pub(crate) async fn run_leads(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let mode = args.industry_mode();

    if args.dry_run {
        let pairs = resolve_pairs(&mode, &args.geo, &CatalogIndustries, config.max_industries)
            .await?;
        println!("dry-run: would search {} (locality, industry) pairs:", pairs.len());
        for pair in &pairs {
            println!("  {} | {}", pair.locality, pair.industry);
        }
        return Ok(());
    }

    let places = PlacesClient::new(
        config.require_places_key()?,
        config.discovery_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Places client: {e}"))?
    .with_retry(config.max_retries, config.retry_backoff_ms);
    let auditor = SiteAuditor::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build site auditor: {e}"))?;

    let mut pipeline = Pipeline::new(
        Arc::new(places),
        Arc::new(auditor),
        Arc::new(CatalogIndustries),
        PipelineOptions::from_config(config),
    );
    match (&config.anthropic_api_key, args.no_analysis) {
        (Some(key), false) => {
            let analyzer = AnalysisClient::new(
                key,
                &config.analysis_model,
                config.analysis_timeout_secs,
                &config.user_agent,
            )
            .map_err(|e| anyhow::anyhow!("failed to build analysis client: {e}"))?
            .with_retry(config.max_retries, config.retry_backoff_ms);
            pipeline = pipeline.with_analyzer(Arc::new(analyzer));
        }
        (None, false) => tracing::info!("ANTHROPIC_API_KEY not set, deep analysis disabled"),
        (_, true) => tracing::info!("deep analysis disabled by --no-analysis"),
    }

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    tracing::info!(%run_id, localities = ?args.geo, "run started");

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let result = match pipeline.run_until(&args.geo, &mode, shutdown).await {
        Ok(result) => result,
        Err(e) => {
            println!("0 leads processed, {e}");
            return Err(e.into());
        }
    };

    let sink = BatchSink::new(&config.output_dir);
    let batch_path = sink.write(&result.records, run_id, started_at)?;
    let report_path = write_report(&config.output_dir, &result.records, &args.geo, started_at)?;

    if !args.no_slack {
        if let Some(url) = &config.slack_webhook_url {
            match SlackNotifier::new(url, SLACK_TIMEOUT_SECS) {
                Ok(notifier) => {
                    notifier.notify_hot_leads(&result.records, &args.geo).await;
                }
                Err(e) => tracing::warn!(error = %e, "slack notifier unavailable"),
            }
        }
    }

    print_summary(&result.summary);
    println!("batch:  {}", batch_path.display());
    println!("report: {}", report_path.display());
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} leads processed across {} localities and {} industries{}",
        summary.leads_processed,
        summary.localities,
        summary.industries,
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    println!(
        "hot: {}  warm: {}  cold: {}  average score: {:.1}",
        summary.hot, summary.warm, summary.cold, summary.average_score
    );
    println!(
        "partial failures: {}  deep analyses: {}",
        summary.partial_failures, summary.deep_analyses
    );
}
