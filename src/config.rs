// CLI arguments and the resolved run configuration

use crate::discovery::ATTENDANCE_PREFIX;
use crate::error::{AttendanceError, Result};
use crate::report::SortKey;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Roster file looked up inside the target directory.
pub const ROSTER_FILE_NAME: &str = "classlist.csv";

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "AMAR_LOG";

// ============================================================================
// ARGS (CLI)
// ============================================================================

/// Reconcile a class roster against meeting attendance exports
#[derive(Parser, Debug, Clone)]
#[command(name = "amar", version, about = "Analyze My Attendance Records")]
pub struct Args {
    /// Directory containing the attendance exports (exactly one)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Roster CSV to use instead of <PATH>/classlist.csv
    #[arg(long, value_name = "FILE")]
    pub roster: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Row ordering within each table
    #[arg(long, value_enum, default_value_t = SortKey::Ratio)]
    pub sort: SortKey,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Log parser details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The target directory, if exactly one was given.
    pub fn single_path(&self) -> Option<&Path> {
        match self.paths.as_slice() {
            [path] => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// ============================================================================
// CONFIG
// ============================================================================

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    pub roster: PathBuf,
    pub format: OutputFormat,
    pub sort: SortKey,
    pub color: bool,
    pub verbose: bool,
}

impl Config {
    /// Resolve `args` for the given target directory.
    ///
    /// `stdout_is_tty` feeds the colour decision; colour is also turned off by
    /// `--no-color` or a set `NO_COLOR` variable.
    pub fn from_args(args: &Args, directory: &Path, stdout_is_tty: bool) -> Result<Config> {
        if !directory.is_dir() {
            return Err(AttendanceError::DirectoryNotFound(directory.to_path_buf()));
        }

        let roster = args
            .roster
            .clone()
            .unwrap_or_else(|| directory.join(ROSTER_FILE_NAME));

        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());

        Ok(Config {
            directory: directory.to_path_buf(),
            roster,
            format: args.format,
            sort: args.sort,
            color: color_enabled(args.no_color, no_color_env, stdout_is_tty),
            verbose: args.verbose,
        })
    }
}

/// Colour only on a terminal and only when nothing opted out.
pub fn color_enabled(no_color_flag: bool, no_color_env: bool, stdout_is_tty: bool) -> bool {
    stdout_is_tty && !no_color_flag && !no_color_env
}

/// Text printed when the tool is invoked without exactly one path.
pub fn usage_text() -> String {
    format!(
        "Analyze My Attendance Records (amar)\n\
         Version {}\n\
         \n\
         Usage:\n\
         amar <path>\n\
         \n\
         <path> must be a path to a directory containing MS Teams attendance reports \
         with names starting with '{}'\n\
         Run `amar --help` for options.",
        crate::VERSION,
        ATTENDANCE_PREFIX
    )
}

// ============================================================================
// TESTS
// ============================================================================
