// src/watch/ignore.rs

//! Gitignore-style ignore rules.
//!
//! Each rule line is compiled into one `globset` matcher. Paths handed to
//! [`IgnoreMatcher::matches`] are relative to the watch root and use forward
//! slashes; a trailing slash marks the directory form of a path (`"target/"`).

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use crate::errors::{Result, WarError};

/// Capability the path filter needs from an ignore-rule engine.
pub trait IgnoreMatcher: Send + Sync + fmt::Debug {
    fn matches(&self, rel_path: &str) -> bool;
}

#[derive(Debug, Clone)]
struct IgnoreRule {
    source: String,
    glob: GlobMatcher,
    negate: bool,
    dir_only: bool,
}

impl IgnoreRule {
    fn applies(&self, path: &str, is_dir: bool) -> bool {
        (is_dir || !self.dir_only) && self.glob.is_match(path)
    }
}

/// Compiled gitignore rule set.
///
/// The last matching rule wins, so a later `!pattern` can re-include
/// something an earlier rule excluded. As in git, nothing beneath an excluded
/// directory can be re-included.
#[derive(Debug, Clone, Default)]
pub struct GitIgnore {
    rules: Vec<IgnoreRule>,
}

impl GitIgnore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for line in lines {
            if let Some(rule) = compile_line(line.as_ref())? {
                rules.push(rule);
            }
        }
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Source text of every compiled rule, in order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.source.as_str())
    }

    /// Verdict of the rules for exactly this path, ignoring its parents.
    fn matched(&self, path: &str, is_dir: bool) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.applies(path, is_dir))
            .is_some_and(|rule| !rule.negate)
    }
}

impl IgnoreMatcher for GitIgnore {
    fn matches(&self, rel_path: &str) -> bool {
        if self.rules.is_empty() {
            return false;
        }

        let normalized = rel_path.replace('\\', "/");
        let is_dir = normalized.ends_with('/');
        let path = normalized.trim_matches('/');
        if path.is_empty() {
            return false;
        }

        // Parents first, outermost down: an excluded directory hides its
        // whole subtree.
        let excluded_parent = path
            .match_indices('/')
            .any(|(end, _)| self.matched(&path[..end], true));

        excluded_parent || self.matched(path, is_dir)
    }
}

fn compile_line(line: &str) -> Result<Option<IgnoreRule>> {
    let trimmed = trim_trailing_spaces(line.trim_start());
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut pattern = trimmed;
    let negate = pattern.starts_with('!');
    if negate {
        pattern = &pattern[1..];
    } else if pattern.starts_with("\\#") || pattern.starts_with("\\!") {
        pattern = &pattern[1..];
    }

    let dir_only = pattern.ends_with('/');
    let pattern = pattern.trim_end_matches('/');
    if pattern.is_empty() {
        return Ok(None);
    }

    let anchored = pattern.contains('/');
    let pattern = pattern.trim_start_matches('/');
    let glob = if anchored {
        escape_braces(pattern)
    } else {
        format!("**/{}", escape_braces(pattern))
    };

    let glob = GlobBuilder::new(&glob)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|e| WarError::ConfigError(format!("invalid ignore pattern '{trimmed}': {e}")))?
        .compile_matcher();

    Ok(Some(IgnoreRule {
        source: trimmed.to_string(),
        glob,
        negate,
        dir_only,
    }))
}

/// Trailing spaces are dropped unless escaped with a backslash.
fn trim_trailing_spaces(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        if end >= 2 && bytes[end - 2] == b'\\' {
            break;
        }
        end -= 1;
    }
    &line[..end]
}

/// Gitignore has no `{a,b}` alternation; make braces literal for globset.
fn escape_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut escaped = false;
    for c in pattern.chars() {
        if !escaped && (c == '{' || c == '}') {
            out.push('\\');
        }
        escaped = !escaped && c == '\\';
        out.push(c);
    }
    out
}
