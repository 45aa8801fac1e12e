//! GitHub Actions workflow generated from the automation config.

use std::collections::BTreeMap;
use std::path::Path;

use leadscout_core::{AutomationConfig, IndustrySelection};
use serde::Serialize;

use crate::error::OutputError;

const SECRETS: &[&str] = &[
    "GOOGLE_PLACES_API_KEY",
    "PSI_API_KEY",
    "ANTHROPIC_API_KEY",
    "DATAFORSEO_LOGIN",
    "DATAFORSEO_PASSWORD",
    "SLACK_WEBHOOK_URL",
];

#[derive(Serialize)]
struct Workflow {
    name: &'static str,
    on: Triggers,
    jobs: Jobs,
}

#[derive(Serialize)]
struct Triggers {
    schedule: Vec<CronTrigger>,
    workflow_dispatch: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct CronTrigger {
    cron: String,
}

#[derive(Serialize)]
struct Jobs {
    #[serde(rename = "find-leads")]
    find_leads: Job,
}

#[derive(Serialize)]
struct Job {
    #[serde(rename = "runs-on")]
    runs_on: &'static str,
    steps: Vec<Step>,
}

#[derive(Serialize, Default)]
struct Step {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    with: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<String>,
}

impl Step {
    fn uses(name: &str, action: &str) -> Self {
        Self {
            name: name.to_string(),
            uses: Some(action.to_string()),
            ..Self::default()
        }
    }

    fn run(name: &str, command: String) -> Self {
        Self {
            name: name.to_string(),
            run: Some(command),
            ..Self::default()
        }
    }
}

/// Shell-quote a value for a `run:` line.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn run_command(config: &AutomationConfig, location: &str) -> String {
    let mut command = format!("./target/release/leadscout run --geo {}", quoted(location));
    match config.mode {
        IndustrySelection::AutoDiscover => {}
        IndustrySelection::Manual => {
            if let Some(list) = &config.industries {
                command.push_str(&format!(" --industries {}", quoted(list)));
            }
        }
        IndustrySelection::Hybrid => {
            if let Some(list) = &config.add_industries {
                command.push_str(&format!(" --add-industries {}", quoted(list)));
            }
        }
    }
    if !config.slack_enabled {
        command.push_str(" --no-slack");
    }
    command
}

/// Render the weekly workflow: one run step per configured location.
///
/// # Errors
///
/// Returns [`OutputError::Yaml`] if serialization fails.
pub fn render_workflow(config: &AutomationConfig) -> Result<String, OutputError> {
    let secrets: BTreeMap<String, String> = SECRETS
        .iter()
        .map(|name| ((*name).to_string(), format!("${{{{ secrets.{name} }}}}")))
        .collect();

    let mut steps = vec![
        Step::uses("Checkout code", "actions/checkout@v4"),
        Step::uses("Set up Rust", "dtolnay/rust-toolchain@stable"),
        Step::run(
            "Build",
            "cargo build --release -p leadscout-cli".to_string(),
        ),
    ];
    for location in &config.locations {
        steps.push(Step {
            env: Some(secrets.clone()),
            ..Step::run(&format!("Find leads in {location}"), run_command(config, location))
        });
    }
    steps.push(Step {
        with: Some(BTreeMap::from([
            ("name".to_string(), "lead-reports".to_string()),
            ("path".to_string(), "out/".to_string()),
        ])),
        ..Step::uses("Upload results", "actions/upload-artifact@v4")
    });

    let workflow = Workflow {
        name: "Weekly SEO Lead Finder",
        on: Triggers {
            schedule: vec![CronTrigger {
                cron: config.schedule.cron(),
            }],
            workflow_dispatch: BTreeMap::new(),
        },
        jobs: Jobs {
            find_leads: Job {
                runs_on: "ubuntu-latest",
                steps,
            },
        },
    };
    Ok(serde_yaml::to_string(&workflow)?)
}

/// Render and write the workflow to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`OutputError`] if rendering or writing fails.
pub fn write_workflow(path: &Path, config: &AutomationConfig) -> Result<(), OutputError> {
    let yaml = render_workflow(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
    }
    std::fs::write(path, yaml).map_err(|e| OutputError::io(path, e))?;
    tracing::info!(path = %path.display(), "workflow written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use leadscout_core::{Schedule, Weekday};
    use serde_yaml::Value;

    use super::*;

    fn config() -> AutomationConfig {
        AutomationConfig {
            enabled: true,
            schedule: Schedule {
                day: Weekday::Wednesday,
                hour: 14,
                minute: 30,
            },
            locations: vec!["Houston, TX".to_string(), "Denver, CO".to_string()],
            mode: IndustrySelection::Hybrid,
            industries: None,
            add_industries: Some("car washes, yoga studios".to_string()),
            slack_enabled: true,
        }
    }

    #[test]
    fn workflow_has_cron_and_a_step_per_location() {
        let yaml = render_workflow(&config()).unwrap();
        let doc: Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(doc["on"]["schedule"][0]["cron"].as_str(), Some("30 14 * * 3"));
        let steps = doc["jobs"]["find-leads"]["steps"].as_sequence().unwrap();
        let runs: Vec<&str> = steps.iter().filter_map(|s| s["run"].as_str()).collect();
        assert_eq!(
            runs,
            vec![
                "cargo build --release -p leadscout-cli",
                r#"./target/release/leadscout run --geo "Houston, TX" --add-industries "car washes, yoga studios""#,
                r#"./target/release/leadscout run --geo "Denver, CO" --add-industries "car washes, yoga studios""#,
            ]
        );
        assert_eq!(
            steps[3]["env"]["PSI_API_KEY"].as_str(),
            Some("${{ secrets.PSI_API_KEY }}")
        );
        assert_eq!(steps.last().unwrap()["with"]["path"].as_str(), Some("out/"));
    }

    #[test]
    fn slack_disabled_adds_flag() {
        let mut cfg = config();
        cfg.slack_enabled = false;
        cfg.mode = IndustrySelection::AutoDiscover;
        let yaml = render_workflow(&cfg).unwrap();
        assert!(yaml.contains(r#"--geo "Houston, TX" --no-slack"#));
        assert!(!yaml.contains("--add-industries"));
    }

    #[test]
    fn workflow_file_is_written_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".github/workflows/weekly.yml");
        write_workflow(&path, &config()).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("Weekly SEO Lead Finder"));
    }
}
