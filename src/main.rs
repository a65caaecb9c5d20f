use alarm_merge::{
    build_info, init_logging, ColumnLayout, MergeConfig, MergeEngine, MergeReport, OutputOrder,
};
use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, long_version = build_info::LONG_VERSION, about, long_about = None)]
struct Args {
    /// Spreadsheet (.xlsx, .xlsm, .xlsb, .xls, .ods) or .csv file with the new alarms
    source: PathBuf,

    /// YAML alarm file to update (created when missing)
    destination: PathBuf,

    /// Merge configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read columns by header title instead of position
    #[arg(long)]
    named: bool,

    /// Output order: append or sort
    #[arg(long)]
    order: Option<OutputOrder>,

    /// Worksheet to read (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Resolve and report without writing the destination
    #[arg(long)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> anyhow::Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::from_file(path)
            .with_context(|| format!("failed to load configuration '{}'", path.display()))?,
        None => MergeConfig::default(),
    };

    if args.named && !config.layout.is_named() {
        config.layout = ColumnLayout::default_named();
    }
    if let Some(order) = args.order {
        config.order = order;
    }
    if let Some(sheet) = &args.sheet {
        config.sheet = Some(sheet.clone());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn report(outcome: &MergeReport, destination: &Path) {
    match outcome {
        MergeReport::NothingToMerge { existing } => {
            info!(
                "Nothing to merge; '{}' left unchanged ({} alarms)",
                destination.display(),
                existing
            );
        }
        MergeReport::Merged(summary) => {
            if summary.destination_reset {
                warn!(
                    "Previous content of '{}' was not an alarm list and has been replaced",
                    destination.display()
                );
            }
            info!(
                "{} existing + {} new = {} alarms ({} reassigned){}",
                summary.existing,
                summary.added,
                summary.total,
                summary.reassignments.len(),
                if summary.written { "" } else { " [dry run, nothing written]" }
            );
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("alarm-merge v{} starting", alarm_merge::VERSION);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = MergeEngine::new(config)
        .map(|engine| engine.dry_run(args.dry_run))
        .and_then(|engine| engine.run(&args.source, &args.destination));

    match result {
        Ok(outcome) => {
            report(&outcome, &args.destination);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(
                "Merge declined, '{}' was not modified: {}",
                args.destination.display(),
                e
            );
            ExitCode::FAILURE
        }
    }
}
