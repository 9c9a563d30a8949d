// src/watch/filter.rs

//! Pure watch/skip decisions for directories and files.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::config::ResolvedPolicy;
use crate::fs::FileSystem;
use crate::watch::ignore::IgnoreMatcher;

/// Suffix editors use for backup copies (`main.rs~`).
const BACKUP_SUFFIX: &str = "~";

/// Decides whether a directory is descended into and whether a file is
/// tracked.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    ignore: Arc<dyn IgnoreMatcher>,
    include_exts: HashSet<String>,
    fs: Arc<dyn FileSystem>,
}

impl PathFilter {
    pub fn new(
        root: impl Into<PathBuf>,
        ignore: Arc<dyn IgnoreMatcher>,
        include_exts: HashSet<String>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            root: root.into(),
            ignore,
            include_exts,
            fs,
        }
    }

    pub fn from_policy(policy: &ResolvedPolicy, fs: Arc<dyn FileSystem>) -> Self {
        Self::new(
            policy.root.clone(),
            Arc::clone(&policy.ignore),
            policy.include_exts.clone(),
            fs,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories are rejected when any segment below the root is hidden
    /// (starts with `.`), or when the ignore rules match either the plain or
    /// the directory form (`dir/`) of the path.
    pub fn should_watch_dir(&self, path: &Path) -> bool {
        let Some(rel) = self.relative(path) else {
            return false;
        };

        if has_hidden_segment(&rel) {
            return false;
        }

        let rel = to_slash(&rel);
        !self.ignore.matches(&rel) && !self.ignore.matches(&format!("{rel}/"))
    }

    /// Files are rejected when they look like editor backups, when an
    /// extension allow-list is configured and does not contain their
    /// extension, or when the ignore rules match them.
    pub fn should_watch_file(&self, path: &Path) -> bool {
        if path.to_string_lossy().ends_with(BACKUP_SUFFIX) {
            return false;
        }

        if !self.include_exts.is_empty() {
            let ext = path.extension().and_then(|e| e.to_str());
            match ext {
                Some(ext) if self.include_exts.contains(ext) => {}
                _ => return false,
            }
        }

        let Some(rel) = self.relative(path) else {
            return false;
        };
        !self.ignore.matches(&to_slash(&rel))
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        let rel = relative_to(self.fs.as_ref(), &self.root, path);
        if rel.is_none() {
            warn!(
                path = %path.display(),
                root = %self.root.display(),
                "cannot relate path to watch root; not watching it"
            );
        }
        rel
    }
}

/// Path of `path` relative to `root`.
///
/// A direct prefix strip is tried first; if that fails (symlinked prefixes,
/// `/private/var` vs `/var` on macOS) both sides are canonicalized and tried
/// again.
pub fn relative_to(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_path_buf());
    }

    let (root_canon, path_canon) = (fs.canonicalize(root).ok()?, fs.canonicalize(path).ok()?);
    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(Path::to_path_buf)
}

fn has_hidden_segment(rel: &Path) -> bool {
    rel.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
