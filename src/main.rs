// amar binary: argument handling, exit codes and the report pipeline

mod bootstrap;

use amar::config::usage_text;
use amar::{
    aggregate, build_report, find_attendance_files, load_roster, render_json, render_text, Args,
    AttendanceError, Config, OutputFormat,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{info, warn};

/// Exit status when the target directory does not exist
const EXIT_MISSING_DIRECTORY: u8 = 3;

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(directory) = args.single_path() else {
        println!("{}", usage_text());
        return ExitCode::SUCCESS;
    };

    bootstrap::setup_logging(args.verbose);

    let config = match Config::from_args(&args, directory, io::stdout().is_terminal()) {
        Ok(config) => config,
        Err(err @ AttendanceError::DirectoryNotFound(_)) => {
            println!("{err}");
            return ExitCode::from(EXIT_MISSING_DIRECTORY);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    info!("amar v{} reading {}", amar::VERSION, config.directory.display());

    let enrolled = load_roster(&config.roster)
        .with_context(|| format!("Failed to load roster {}", config.roster.display()))?;

    let files = find_attendance_files(&config.directory)?;
    if files.is_empty() {
        warn!(
            "No files starting with '{}' in {}",
            amar::ATTENDANCE_PREFIX,
            config.directory.display()
        );
    }

    let aggregation = aggregate(&files, enrolled).context("Failed to read attendance exports")?;
    for warning in &aggregation.warnings {
        warn!("{warning}");
    }
    if aggregation.skipped_rows > 0 {
        info!("{} rows did not match an export layout", aggregation.skipped_rows);
    }

    let report = build_report(&aggregation.record, config.sort);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.format {
        OutputFormat::Text => render_text(&report, &mut out, config.color)?,
        OutputFormat::Json => render_json(&report, &mut out)?,
    }
    out.flush()?;

    Ok(())
}
