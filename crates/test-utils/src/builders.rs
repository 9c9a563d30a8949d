#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use war::config::ResolvedPolicy;
use war::types::Verbosity;
use war::watch::GitIgnore;

/// Builder for `ResolvedPolicy` to simplify test setup.
///
/// Starts from the engine defaults with a single `true` command.
pub struct PolicyBuilder {
    policy: ResolvedPolicy,
    ignore_lines: Vec<String>,
    custom_run: bool,
}

impl PolicyBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            policy: ResolvedPolicy::new(root, vec!["true".to_string()]),
            ignore_lines: Vec::new(),
            custom_run: false,
        }
    }

    /// Append a command. The first call replaces the default `true`.
    pub fn command(mut self, cmd: &str) -> Self {
        if !self.custom_run {
            self.policy.run.clear();
            self.custom_run = true;
        }
        self.policy.run.push(cmd.to_string());
        self
    }

    pub fn ignore(mut self, line: &str) -> Self {
        self.ignore_lines.push(line.to_string());
        self
    }

    pub fn include_ext(mut self, ext: &str) -> Self {
        self.policy.include_exts.insert(ext.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.policy.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn cfg_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.policy.cfg_dir = Some(dir.into());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.policy.delay = delay;
        self
    }

    pub fn cancel_last(mut self, val: bool) -> Self {
        self.policy.cancel_last = val;
        self
    }

    pub fn term_timeout(mut self, timeout: Duration) -> Self {
        self.policy.term_timeout = timeout;
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.policy.verbosity = verbosity;
        self
    }

    pub fn build(mut self) -> ResolvedPolicy {
        let ignore =
            GitIgnore::from_lines(&self.ignore_lines).expect("Failed to compile ignore rules");
        self.policy.ignore_rules = ignore.patterns().map(str::to_string).collect();
        self.policy.ignore = Arc::new(ignore);
        self.policy
    }

    pub fn build_arc(self) -> Arc<ResolvedPolicy> {
        Arc::new(self.build())
    }
}
