use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::domain::analysis::AggregationMode;
use crate::domain::app_config::AppConfig;
use crate::domain::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::ConfigService;
use crate::infrastructure::storage::list_candidate_inputs;

#[derive(Parser)]
#[command(
    name = "review-voc",
    version,
    about = "Tag product reviews with an LLM and report tag frequencies per value dimension"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derive a tag system, tag every review and write the annotated table
    Analyze(RunArgs),
    /// Count tags per value dimension of an already tagged table
    Report(RunArgs),
    /// Manage the API key stored in the OS keyring
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Input table (.csv, .xlsx)
    pub file: PathBuf,
    /// Config file (default: ./review-voc.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Aggregation mode: strict or legacy
    #[arg(short, long)]
    pub mode: Option<AggregationMode>,
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store the API key
    Set { key: String },
    /// Remove the stored API key
    Delete,
}

impl RunArgs {
    fn load_config(&self, service: &ConfigService) -> Result<AppConfig> {
        let mut config = service.load(self.config.as_deref())?;
        if let Some(dir) = &self.output {
            config.output.dir = dir.clone();
        }
        if let Some(mode) = self.mode {
            config.analysis.mode = mode;
        }
        Ok(config)
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let service = ConfigService::new();

    match cli.command {
        Commands::Analyze(args) => {
            let context = bootstrap::setup(args.load_config(&service)?)?;
            let summary = context.review_analysis.run(&args.file).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::Report(args) => {
            let context = bootstrap::setup(args.load_config(&service)?)?;
            let (path, report) = context.quant_report.run(&args.file)?;
            println!("{}", report.markdown);
            println!("Report written to {}", path.display());
            Ok(())
        }
        Commands::Key { action } => match action {
            KeyAction::Set { key } => {
                service.save_api_key(&key)?;
                println!("API key stored");
                Ok(())
            }
            KeyAction::Delete => {
                service.delete_api_key()?;
                println!("API key removed");
                Ok(())
            }
        },
    }
}

/// Input file of the command, if it has one.
pub fn input_of(cli: &Cli) -> Option<&Path> {
    match &cli.command {
        Commands::Analyze(args) | Commands::Report(args) => Some(args.file.as_path()),
        Commands::Key { .. } => None,
    }
}

/// Diagnostic for a fatal error: the error itself and the table files that
/// sit next to the input.
pub fn failure_report(error: &crate::domain::error::AppError, input: Option<&Path>) -> String {
    let mut lines = vec![format!("Error: {}", error)];

    if let Some(input) = input {
        let dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let candidates = list_candidate_inputs(dir);

        lines.push(String::new());
        if candidates.is_empty() {
            lines.push(format!("No .csv/.xlsx files found in {}", dir.display()));
        } else {
            lines.push(format!("Table files in {}:", dir.display()));
            lines.extend(candidates.iter().map(|p| format!("  {}", p.display())));
        }
    }

    lines.join("\n")
}
