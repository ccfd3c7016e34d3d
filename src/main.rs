use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nsforward::{BatchOptions, CleanupCommand, Detector, Pipeline, Verdict, load_config, run_batch};

/// Generate forward-namespace polyfill classes from an upstream PHP
/// framework release.
#[derive(Parser)]
#[command(name = "nsforward", version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).  `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform every mapped class and write the polyfill tree.
    Generate(GenerateArgs),
    /// Validate the mapping document, and optionally preview which
    /// deprecation notices each source file would lose.
    Check(CheckArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Mapping document (TOML).
    #[arg(long)]
    config: PathBuf,

    /// Root of the extracted upstream release.
    #[arg(long)]
    source: PathBuf,

    /// Directory the polyfills are written to.
    #[arg(long)]
    output: PathBuf,

    /// Only match the fixed rename phrases, not the mapped class names.
    #[arg(long)]
    phrases_only: bool,

    /// Do not clear the output directory before writing.
    #[arg(long)]
    keep_output: bool,

    /// Write a JSON report of the run to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Command to run over the output directory afterwards; the directory
    /// is appended as its last argument.  Must come last.
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "COMMAND")]
    cleanup: Vec<String>,
}

#[derive(Args)]
struct CheckArgs {
    /// Mapping document (TOML).
    #[arg(long)]
    config: PathBuf,

    /// Root of the extracted upstream release; enables the notice preview.
    #[arg(long)]
    source: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate(args) => generate(args),
        Command::Check(args) => check(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if args.phrases_only {
        config.detector.config_aware = false;
    }

    let pipeline = Pipeline::new(&config.table, Detector::new(config.detector.clone()));
    let options = BatchOptions {
        source_root: args.source,
        output_root: args.output,
        clear_output: !args.keep_output,
        cleanup: CleanupCommand::from_argv(&args.cleanup),
    };

    let report = run_batch(&config.table, &pipeline, &options)?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
    }
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let table = &config.table;
    tracing::info!(
        "{} class(es), {} namespace rename(s), {} class rename(s)",
        table.len(),
        table.namespaces.len(),
        table.class_names.len()
    );
    for (old, new) in table.namespaces.iter() {
        tracing::info!("namespace {} -> {}", old, new);
    }

    let Some(source_root) = &args.source else {
        return Ok(());
    };
    let pipeline = Pipeline::new(table, Detector::new(config.detector.clone()));
    for entry in table.iter() {
        preview_entry(&pipeline, source_root, entry);
    }
    Ok(())
}

fn preview_entry(pipeline: &Pipeline<'_>, source_root: &Path, entry: &nsforward::MappingEntry) {
    let path = source_root.join(&entry.source_path);
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!("{}: cannot read {}: {}", entry.source_identity, path.display(), err);
            return;
        }
    };
    match pipeline.survey(&source, entry) {
        Ok(sites) => {
            let removed = sites.iter().filter(|s| s.verdict == Verdict::Remove).count();
            tracing::info!(
                "{} -> {}: {} notice(s) removed, {} kept",
                entry.source_identity,
                entry.target_identity(),
                removed,
                sites.len() - removed
            );
            for site in &sites {
                tracing::debug!("  {:?} @{}: {}", site.verdict, site.offset, site.text);
            }
        }
        Err(err) => tracing::warn!("{}: {}", entry.source_identity, err),
    }
}
