mod batch;
mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use leadscout_core::{split_industries, IndustryMode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadscout")]
#[command(about = "Find local businesses whose websites need SEO work")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover, audit and score leads for one or more localities
    Run(RunArgs),
    /// Print tier counts for a stored batch
    Summary {
        /// Batch CSV to read; defaults to the newest in the output directory
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Write a sales report for a stored batch
    Report {
        /// Batch CSV to read; defaults to the newest in the output directory
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Generate the scheduled-run GitHub Actions workflow from config.yaml
    Workflow {
        /// Destination of the workflow file
        #[arg(long, default_value = ".github/workflows/weekly.yml")]
        output: PathBuf,
        /// Automation file; defaults to `LEADSCOUT_AUTOMATION_PATH`
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Locality to search, e.g. "Houston, TX"; repeatable
    #[arg(long = "geo", required = true)]
    geo: Vec<String>,
    /// Comma-separated industries to search instead of discovering them
    #[arg(long, conflicts_with = "add_industries")]
    industries: Option<String>,
    /// Comma-separated industries searched in addition to discovered ones
    #[arg(long)]
    add_industries: Option<String>,
    /// Resolve and print the search plan without calling any API
    #[arg(long)]
    dry_run: bool,
    /// Skip deep analysis of hot leads
    #[arg(long)]
    no_analysis: bool,
    /// Skip the Slack alert
    #[arg(long)]
    no_slack: bool,
}

impl RunArgs {
    fn industry_mode(&self) -> IndustryMode {
        match (&self.industries, &self.add_industries) {
            (Some(list), _) => IndustryMode::Manual(split_industries(list)),
            (None, Some(extra)) => IndustryMode::Hybrid(split_industries(extra)),
            (None, None) => IndustryMode::Auto,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = leadscout_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Run(args)) => run::run_leads(&config, &args).await?,
        Some(Commands::Summary { file }) => batch::run_summary(&config, file.as_deref())?,
        Some(Commands::Report { file }) => batch::run_report(&config, file.as_deref())?,
        Some(Commands::Workflow { output, config: path }) => {
            batch::run_workflow(&config, &output, path.as_deref())?;
        }
        None => println!("leadscout: no command given, try `leadscout --help`"),
    }

    Ok(())
}
