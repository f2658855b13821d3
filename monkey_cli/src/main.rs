use monkey_core::campaign::Campaign;
use monkey_core::config::MonkeyConfig;
use monkey_core::oracle::CompilerOracle;

use anyhow::Context;
use clap::Parser;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Throws random text at a compiler until something sticks.", long_about = None)]
struct Cli {
    /// TOML configuration file; the flags below override its values.
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,
    /// Maximum number of bytes in one candidate.
    #[clap(short = 'n', long)]
    max_size: Option<usize>,
    /// Number of parallel workers.
    #[clap(short, long)]
    jobs: Option<usize>,
    /// Candidate file name inside the working directory.
    #[clap(short = 'i', long)]
    source_file: Option<String>,
    /// Oracle artifact file name inside the working directory.
    #[clap(short = 'o', long)]
    output_file: Option<String>,
    /// Directory holding per-worker candidate and artifact files.
    /// Removed and recreated on every run.
    #[clap(long)]
    work_dir: Option<PathBuf>,
    /// Oracle command with {source} and {output} placeholders.
    #[clap(long)]
    compile_command: Option<String>,
    /// Show per-rejection progress and compiler diagnostics.
    #[clap(short, long, conflicts_with = "silent")]
    verbose: bool,
    /// Only report warnings and the final outcome.
    #[clap(short, long, conflicts_with = "verbose")]
    silent: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let mut config = match &cli.config_file {
        Some(config_path) => MonkeyConfig::load_from_file(config_path)?,
        None => {
            let default_config_path = PathBuf::from("monkey.toml");
            if default_config_path.exists() {
                MonkeyConfig::load_from_file(&default_config_path)?
            } else {
                MonkeyConfig::default()
            }
        }
    };

    if let Some(max_size) = cli.max_size {
        config.campaign.max_candidate_size = max_size;
    }
    if let Some(jobs) = cli.jobs {
        config.campaign.jobs = jobs;
    }
    if let Some(source_file) = cli.source_file {
        config.oracle.source_file_name = source_file;
    }
    if let Some(output_file) = cli.output_file {
        config.oracle.output_file_name = output_file;
    }
    if let Some(work_dir) = cli.work_dir {
        config.oracle.work_dir = work_dir;
    }
    if let Some(command) = cli.compile_command {
        config.oracle.command = command.split_whitespace().map(str::to_string).collect();
    }
    if cli.verbose {
        config.report.verbose = true;
        config.report.silent = false;
    }
    if cli.silent {
        config.report.silent = true;
        config.report.verbose = false;
    }

    TermLogger::init(
        log_level(&config),
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    config.validate().context("configuration rejected")?;
    prepare_work_dir(&config.oracle.work_dir)?;

    let oracle = CompilerOracle::new(config.oracle.command.clone(), config.report.verbose);
    let campaign = Campaign::new(config, oracle);
    let report = campaign.run()?;

    match report.winner {
        Some(discovery) => {
            println!(
                "Success after {} attempts! See {} for the accepted input.",
                discovery.attempts,
                discovery.source_path.display()
            );
            println!("  WARNING: you probably don't want to run the produced artifact!");
        }
        None => {
            println!("Stopped before any candidate was accepted.");
        }
    }

    Ok(())
}

fn log_level(config: &MonkeyConfig) -> LevelFilter {
    if config.report.silent {
        LevelFilter::Warn
    } else if config.report.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// The campaign assumes an existing, empty working directory; recreate it
/// from scratch on every run. Artifacts of the previous run are lost.
fn prepare_work_dir(work_dir: &Path) -> Result<(), anyhow::Error> {
    match fs::remove_dir_all(work_dir) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to clear working directory {}", work_dir.display())
            });
        }
    }
    fs::create_dir_all(work_dir)
        .with_context(|| format!("failed to create working directory {}", work_dir.display()))
}
