// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{parse_duration, CliOverrides};
use crate::types::Verbosity;

const AUTO_MODE_HELP: &str = "\
Examples:
  # auto mode
  # Uses the current working directory as root if it is not set.
  # Loads $root/.gitignore as ignore file if it exists.
  # Uses $root/war_run.sh, then $root/run.sh, as run command if run is empty.
  war --auto";

/// Command-line arguments for `war`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "war",
    version,
    about = "Watch a directory tree and re-run commands when files change.",
    long_about = None,
    after_help = AUTO_MODE_HELP,
    args_conflicts_with_subcommands = true
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file (TOML), as a positional argument.
    #[arg(value_name = "CONFIG", conflicts_with = "config")]
    pub config_arg: Option<PathBuf>,

    /// Config file (TOML).
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Watch root. Overrides `root` from the config file.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Command to run; repeatable or comma-separated. Appended after the
    /// config file's `run` list.
    #[arg(short = 'r', long = "run", value_name = "CMD", value_delimiter = ',')]
    pub run: Vec<String>,

    /// Auto mode: pick up `.gitignore` and `war_run.sh`/`run.sh` from the root.
    #[arg(long)]
    pub auto: bool,

    /// Log level (0: silent, 1: log file changes, 9: log all).
    #[arg(short = 'l', long, value_name = "N", default_value_t = Verbosity::CHANGES)]
    pub log_level: Verbosity,

    /// Ignore pattern (gitignore syntax); repeatable or comma-separated.
    #[arg(short = 'i', long = "ignore", value_name = "PAT", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Debounce delay before a run, e.g. `500ms`, `1s`.
    #[arg(short = 'd', long, value_name = "DUR", value_parser = parse_duration)]
    pub delay: Option<Duration>,

    /// Cancel the in-flight run when a file changes.
    #[arg(long, value_name = "BOOL")]
    pub cancel_last: Option<bool>,

    /// How long to wait after SIGTERM before sending SIGKILL. `0` kills
    /// immediately.
    #[arg(long, value_name = "DUR", value_parser = parse_duration)]
    pub term_timeout: Option<Duration>,

    /// Resolve and print the configuration, but don't watch or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate an example config, to STDOUT or to PATH.
    Example {
        /// Destination file; must not exist yet.
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

impl CliArgs {
    /// The config path from either `-c/--config` or the positional argument.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| self.config_arg.clone())
    }

    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config_path(),
            root: self.root.clone(),
            run: self.run.clone(),
            auto: self.auto,
            verbosity: self.log_level,
            ignore: self.ignore.clone(),
            delay: self.delay,
            cancel_last: self.cancel_last,
            term_timeout: self.term_timeout,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
