// src/config/policy.rs

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::types::Verbosity;
use crate::watch::{GitIgnore, IgnoreMatcher};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_CANCEL_LAST: bool = true;
pub const DEFAULT_TERM_TIMEOUT: Duration = Duration::from_secs(3);

/// Everything the engine needs, fully resolved: paths are absolute, CLI
/// overrides are applied and the ignore rules are compiled.
#[derive(Debug, Clone)]
pub struct ResolvedPolicy {
    /// Absolute watch root. Commands run here.
    pub root: PathBuf,
    /// Absolute directory of the config file, when one was used.
    pub cfg_dir: Option<PathBuf>,
    /// Commands, run in order, fail-fast.
    pub run: Vec<String>,
    pub ignore: Arc<dyn IgnoreMatcher>,
    /// Rule lines `ignore` was compiled from, for display.
    pub ignore_rules: Vec<String>,
    /// Extension allow-list without leading dots. Empty means every file.
    pub include_exts: HashSet<String>,
    /// Extra environment for every command.
    pub env: BTreeMap<String, String>,
    pub delay: Duration,
    pub cancel_last: bool,
    /// Grace period between SIGTERM and SIGKILL. Zero kills right away.
    pub term_timeout: Duration,
    pub verbosity: Verbosity,
}

impl ResolvedPolicy {
    /// A policy with engine defaults and no ignore rules.
    pub fn new(root: impl Into<PathBuf>, run: Vec<String>) -> Self {
        Self {
            root: root.into(),
            cfg_dir: None,
            run,
            ignore: Arc::new(GitIgnore::empty()),
            ignore_rules: Vec::new(),
            include_exts: HashSet::new(),
            env: BTreeMap::new(),
            delay: DEFAULT_DELAY,
            cancel_last: DEFAULT_CANCEL_LAST,
            term_timeout: DEFAULT_TERM_TIMEOUT,
            verbosity: Verbosity::default(),
        }
    }
}
