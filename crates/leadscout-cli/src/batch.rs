//! Commands over stored artifacts: `summary`, `report` and `workflow`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use leadscout_core::{load_automation, AppConfig};
use leadscout_output::{latest_batch, read_batch, write_report, write_workflow, BatchStats};

fn resolve_batch(config: &AppConfig, file: Option<&Path>) -> anyhow::Result<PathBuf> {
    match file {
        Some(path) => Ok(path.to_path_buf()),
        None => latest_batch(&config.output_dir)?.ok_or_else(|| {
            anyhow::anyhow!(
                "no leads_*.csv batch found in {}",
                config.output_dir.display()
            )
        }),
    }
}

pub(crate) fn run_summary(config: &AppConfig, file: Option<&Path>) -> anyhow::Result<()> {
    let path = resolve_batch(config, file)?;
    let records = read_batch(&path)?;
    let stats = BatchStats::from_records(&records);

    println!("batch: {}", path.display());
    println!("{} leads ({} without a website)", stats.total, stats.without_website);
    println!(
        "hot: {}  warm: {}  cold: {}  average score: {:.1}",
        stats.hot, stats.warm, stats.cold, stats.average_score
    );
    println!("deep analyses: {}", stats.deep_analyses);
    Ok(())
}

pub(crate) fn run_report(config: &AppConfig, file: Option<&Path>) -> anyhow::Result<()> {
    let path = resolve_batch(config, file)?;
    let records = read_batch(&path)?;

    let mut localities: Vec<String> = Vec::new();
    for record in &records {
        let locality = &record.scored().lead.locality;
        if !localities.contains(locality) {
            localities.push(locality.clone());
        }
    }

    let report = write_report(&config.output_dir, &records, &localities, Utc::now())?;
    println!("report: {}", report.display());
    Ok(())
}

pub(crate) fn run_workflow(
    config: &AppConfig,
    output: &Path,
    automation_path: Option<&Path>,
) -> anyhow::Result<()> {
    let source = automation_path.unwrap_or(&config.automation_path);
    let automation = load_automation(source)?.automation;
    if !automation.enabled {
        tracing::warn!(path = %source.display(), "automation is disabled in config");
    }
    write_workflow(output, &automation)?;
    println!(
        "workflow: {} ({} locations, cron \"{}\")",
        output.display(),
        automation.locations.len(),
        automation.schedule.cron()
    );
    Ok(())
}
