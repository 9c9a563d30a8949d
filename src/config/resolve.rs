// src/config/resolve.rs

//! Turns CLI overrides plus an optional config file into a [`ResolvedPolicy`].

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::loader::parse_str;
use crate::config::model::ConfigFile;
use crate::config::policy::{
    ResolvedPolicy, DEFAULT_CANCEL_LAST, DEFAULT_DELAY, DEFAULT_TERM_TIMEOUT,
};
use crate::errors::{Result, WarError};
use crate::fs::FileSystem;
use crate::types::Verbosity;
use crate::watch::GitIgnore;

/// Conventional run scripts picked up by auto mode, in priority order.
pub const AUTO_RUN_SCRIPTS: [&str; 2] = ["war_run.sh", "run.sh"];

/// Values given on the command line. `None` means "not given", so the config
/// file (and then the engine default) applies.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub run: Vec<String>,
    pub auto: bool,
    pub verbosity: Verbosity,
    pub ignore: Vec<String>,
    pub delay: Option<Duration>,
    pub cancel_last: Option<bool>,
    pub term_timeout: Option<Duration>,
}

/// Resolve the final policy.
///
/// `cwd` anchors every relative path; `env` looks up environment variables
/// (for `env:` roots).
pub fn resolve_policy<E>(
    overrides: &CliOverrides,
    cwd: &Path,
    fs: &dyn FileSystem,
    env: E,
) -> Result<ResolvedPolicy>
where
    E: Fn(&str) -> Option<String>,
{
    let (cfg, cfg_dir) = match &overrides.config {
        Some(path) => {
            let abs = absolutize(cwd, path);
            let contents = fs.read_to_string(&abs).map_err(|e| {
                WarError::ConfigError(format!("read config file {}: {e}", path.display()))
            })?;
            let cfg = ConfigFile::try_from(parse_str(&contents)?)?;
            let dir = abs.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
            (cfg, Some(dir))
        }
        None => (ConfigFile::default(), None),
    };

    let root = match &overrides.root {
        Some(root) => absolutize(cwd, root),
        None => resolve_root(&cfg.root, cwd, cfg_dir.as_deref(), &env),
    };
    info!(root = %root.display(), "resolved watch root");

    let mut run = cfg.run.clone();
    run.extend(overrides.run.iter().map(|cmd| cli_run_entry(cmd, &root, fs)));

    let mut ignore_lines: Vec<String> = Vec::new();
    if let Some(file) = &cfg.ignore_file {
        let path = absolutize(cwd, Path::new(file));
        let contents = fs.read_to_string(&path).map_err(|e| {
            WarError::ConfigError(format!("read ignore file {}: {e}", path.display()))
        })?;
        ignore_lines.extend(contents.lines().map(str::to_string));
    }
    ignore_lines.extend(cfg.ignore_rules.iter().cloned());

    if overrides.auto {
        apply_auto_mode(&root, fs, &mut ignore_lines, &mut run)?;
    }

    if !overrides.ignore.is_empty() {
        info!(patterns = ?overrides.ignore, "add ignore");
        ignore_lines.extend(overrides.ignore.iter().cloned());
    }

    if run.is_empty() {
        return Err(WarError::ConfigError(
            "run is empty, use -r to specify the run command".to_string(),
        ));
    }

    let ignore = GitIgnore::from_lines(&ignore_lines)?;
    let ignore_rules = ignore.patterns().map(str::to_string).collect();

    Ok(ResolvedPolicy {
        root,
        cfg_dir,
        run,
        ignore: Arc::new(ignore),
        ignore_rules,
        include_exts: cfg.include_exts.iter().cloned().collect::<HashSet<_>>(),
        env: cfg.env.clone(),
        delay: overrides.delay.or(cfg.delay).unwrap_or(DEFAULT_DELAY),
        cancel_last: overrides
            .cancel_last
            .or(cfg.cancel_last)
            .unwrap_or(DEFAULT_CANCEL_LAST),
        term_timeout: overrides
            .term_timeout
            .or(cfg.term_timeout)
            .unwrap_or(DEFAULT_TERM_TIMEOUT),
        verbosity: overrides.verbosity,
    })
}

/// Apply the root conventions of the config file's `root` key.
///
/// - empty: the working directory
/// - absolute: as-is
/// - `wd:REL`: relative to the working directory
/// - `cfg:REL`: relative to the config file's directory
/// - `env:NAME`: the value of an environment variable
/// - anything else: relative to the working directory
pub fn resolve_root<E>(raw: &str, cwd: &Path, cfg_dir: Option<&Path>, env: &E) -> PathBuf
where
    E: Fn(&str) -> Option<String>,
{
    if raw.is_empty() {
        return cwd.to_path_buf();
    }
    if let Some(rel) = raw.strip_prefix("wd:") {
        return absolutize(cwd, Path::new(rel));
    }
    if let Some(rel) = raw.strip_prefix("cfg:") {
        return absolutize(cfg_dir.unwrap_or(cwd), Path::new(rel));
    }
    if let Some(name) = raw.strip_prefix("env:") {
        return match env(name).filter(|v| !v.is_empty()) {
            Some(value) => absolutize(cwd, Path::new(&value)),
            None => cwd.to_path_buf(),
        };
    }
    absolutize(cwd, Path::new(raw))
}

/// A CLI run value naming an existing file under the root becomes that
/// file's absolute path; anything else is a shell command line.
fn cli_run_entry(cmd: &str, root: &Path, fs: &dyn FileSystem) -> String {
    let as_path = Path::new(cmd);
    if as_path.is_absolute() {
        return cmd.to_string();
    }
    let candidate = root.join(as_path);
    if fs.is_file(&candidate) {
        candidate.to_string_lossy().into_owned()
    } else {
        cmd.to_string()
    }
}

fn apply_auto_mode(
    root: &Path,
    fs: &dyn FileSystem,
    ignore_lines: &mut Vec<String>,
    run: &mut Vec<String>,
) -> Result<()> {
    let gitignore = root.join(".gitignore");
    if fs.is_file(&gitignore) {
        let contents = fs.read_to_string(&gitignore)?;
        ignore_lines.extend(contents.lines().map(str::to_string));
        info!(path = %gitignore.display(), "[auto] load ignore file");
    }

    if run.is_empty() {
        for script in AUTO_RUN_SCRIPTS {
            let path = root.join(script);
            if fs.exists(&path) {
                info!(script, "[auto] detect run script");
                run.push(path.to_string_lossy().into_owned());
                break;
            }
        }
    }
    Ok(())
}

/// Join `path` onto `base` unless it is already absolute, then drop `.` and
/// fold `..` components lexically.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
