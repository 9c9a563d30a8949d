// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, error, info};

use crate::cli::{CliArgs, Command};
use crate::config::{resolve_policy, ResolvedPolicy};
use crate::engine::Engine;
use crate::exec::ProcessSupervisor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::NotifyBackend;

/// The bundled example configuration, printed by `war example`.
pub const EXAMPLE_CONFIG: &str = include_str!("../demos/example.war.toml");

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution
/// - the OS notifier and process supervisor
/// - the engine (watch tree + scheduler)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    if let Some(Command::Example { path }) = &args.command {
        return write_example(path.as_deref());
    }

    let cwd = std::env::current_dir()?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let policy = resolve_policy(&args.overrides(), &cwd, fs.as_ref(), |name| {
        std::env::var(name).ok()
    })?;

    if args.dry_run {
        print_dry_run(&policy);
        return Ok(());
    }

    let policy = Arc::new(policy);
    let (notifier, events) = NotifyBackend::new()?;
    let runner = ProcessSupervisor::new(Arc::clone(&policy));
    let mut engine = Engine::start(Arc::clone(&policy), runner, notifier, events, fs)?;

    // Ctrl-C or a broken notifier: either way, stop gracefully.
    let fatal = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            match res {
                Ok(()) => info!("received interrupt"),
                Err(e) => error!(error = %e, "failed to listen for Ctrl+C"),
            }
            None
        }
        err = engine.fatal_error() => Some(err),
    };

    engine.stop().await?;

    match fatal {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn write_example(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    };
    if path.exists() {
        bail!("file already exists: {}", path.display());
    }
    std::fs::write(path, EXAMPLE_CONFIG)?;
    info!(path = %path.display(), "generated example config");
    Ok(())
}

/// Simple dry-run output: print the resolved policy.
fn print_dry_run(policy: &ResolvedPolicy) {
    println!("war dry-run");
    println!("  root = {}", policy.root.display());
    if let Some(dir) = &policy.cfg_dir {
        println!("  cfg_dir = {}", dir.display());
    }
    println!("  delay = {:?}", policy.delay);
    println!("  cancel_last = {}", policy.cancel_last);
    println!("  term_timeout = {:?}", policy.term_timeout);
    println!("  log_level = {}", policy.verbosity);
    println!();

    println!("run ({}):", policy.run.len());
    for (i, cmd) in policy.run.iter().enumerate() {
        println!("  {}. {cmd}", i + 1);
    }

    if !policy.include_exts.is_empty() {
        let mut exts: Vec<_> = policy.include_exts.iter().collect();
        exts.sort();
        println!("include_exts: {exts:?}");
    }
    if !policy.ignore_rules.is_empty() {
        println!("ignore ({}):", policy.ignore_rules.len());
        for rule in &policy.ignore_rules {
            println!("  - {rule}");
        }
    }
    if !policy.env.is_empty() {
        println!("env:");
        for (k, v) in &policy.env {
            println!("  {k}={v}");
        }
    }

    debug!("dry-run complete (no execution)");
}
