// src/watch/tree.rs

//! Live registry of watched directories and tracked files.
//!
//! Only directories are registered with the OS notifier; files are tracked so
//! that write/remove events on them can be recognised as relevant. The tree is
//! owned and mutated by the event-consumption path alone.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::fs::{FileSystem, NodeKind};
use crate::types::{EntryKind, Verbosity};
use crate::watch::event::{WatchEvent, WatchEventKind};
use crate::watch::filter::PathFilter;
use crate::watch::notifier::Notifier;

/// Why a change asked for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCause {
    /// A new file appeared (directly or inside a newly created directory).
    Created,
    /// A tracked file was written.
    Written,
    /// A tracked file was removed or renamed away.
    Removed,
    /// A tracked file vanished together with a removed ancestor directory.
    Orphaned,
}

/// "Something changed, a run is desired."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTrigger {
    pub path: PathBuf,
    pub cause: TriggerCause,
}

impl RunTrigger {
    fn new(path: &Path, cause: TriggerCause) -> Self {
        Self {
            path: path.to_path_buf(),
            cause,
        }
    }
}

pub struct WatchTree<N: Notifier> {
    notifier: N,
    fs: Arc<dyn FileSystem>,
    filter: PathFilter,
    entries: BTreeMap<PathBuf, EntryKind>,
    verbosity: Verbosity,
    initial_scan_done: bool,
}

impl<N: Notifier> std::fmt::Debug for WatchTree<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchTree")
            .field("root", &self.filter.root())
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<N: Notifier> WatchTree<N> {
    pub fn new(
        notifier: N,
        fs: Arc<dyn FileSystem>,
        filter: PathFilter,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            notifier,
            fs,
            filter,
            entries: BTreeMap::new(),
            verbosity,
            initial_scan_done: false,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn kind_of(&self, path: &Path) -> Option<EntryKind> {
        self.entries.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All tracked entries, sorted by path.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, EntryKind)> {
        self.entries.iter().map(|(p, k)| (p.as_path(), *k))
    }

    /// From now on, verbosity 1 starts reporting individual changes.
    pub fn finish_initial_scan(&mut self) {
        self.initial_scan_done = true;
    }

    fn logs_changes(&self) -> bool {
        self.verbosity.logs_change(self.initial_scan_done)
    }

    /// Register `dir` and, if `recursive`, everything below it that passes
    /// the filter. Rejected subdirectories are not descended into.
    pub fn add_directory(
        &mut self,
        dir: &Path,
        recursive: bool,
        notify_run: bool,
    ) -> Vec<RunTrigger> {
        let mut triggers = Vec::new();
        self.add_directory_into(dir, recursive, notify_run, &mut triggers);
        triggers
    }

    fn add_directory_into(
        &mut self,
        dir: &Path,
        recursive: bool,
        notify_run: bool,
        triggers: &mut Vec<RunTrigger>,
    ) {
        if self.entries.contains_key(dir) {
            error!(path = %dir.display(), "[BUG] directory added twice");
        }

        if let Err(err) = self.notifier.watch(dir) {
            error!(path = %dir.display(), error = %err, "failed to watch dir");
            return;
        }
        if self.logs_changes() {
            info!(path = %dir.display(), "watch dir");
        }
        self.entries.insert(dir.to_path_buf(), EntryKind::Directory);

        if !recursive {
            return;
        }

        let children = match self.fs.read_dir(dir) {
            Ok(children) => children,
            Err(err) => {
                error!(path = %dir.display(), error = %err, "failed to list dir");
                return;
            }
        };

        for child in children {
            let kind = match self.fs.node_kind(&child) {
                Ok(kind) => kind,
                Err(err) => {
                    debug!(path = %child.display(), error = %err, "entry vanished during scan");
                    continue;
                }
            };
            match kind {
                NodeKind::Directory => {
                    if self.filter.should_watch_dir(&child) {
                        self.add_directory_into(&child, true, notify_run, triggers);
                    }
                }
                other => {
                    if let Some(trigger) = self.maybe_add_file(&child, other, notify_run) {
                        triggers.push(trigger);
                    }
                }
            }
        }
    }

    /// Track `path` if it is a regular file that passes the filter. A file
    /// that is already tracked counts as written.
    pub fn maybe_add_file(
        &mut self,
        path: &Path,
        kind: NodeKind,
        notify_run: bool,
    ) -> Option<RunTrigger> {
        if kind == NodeKind::Symlink || !self.filter.should_watch_file(path) {
            return None;
        }

        let cause = if self.entries.contains_key(path) {
            if self.logs_changes() {
                info!(path = %path.display(), "write file");
            }
            TriggerCause::Written
        } else {
            if self.logs_changes() {
                info!(path = %path.display(), "watch file");
            }
            self.entries.insert(path.to_path_buf(), EntryKind::File);
            TriggerCause::Created
        };

        notify_run.then(|| RunTrigger::new(path, cause))
    }

    /// Apply one filesystem event, returning the run triggers it raised.
    pub fn on_event(&mut self, event: &WatchEvent) -> Vec<RunTrigger> {
        match event.kind {
            WatchEventKind::Create => self.on_create(&event.path),
            WatchEventKind::Write => self.on_write(&event.path).into_iter().collect(),
            WatchEventKind::Remove | WatchEventKind::Rename => self.on_remove(&event.path),
        }
    }

    fn on_create(&mut self, path: &Path) -> Vec<RunTrigger> {
        // Editors create and rename temp files faster than we can stat them.
        let kind = match self.fs.node_kind(path) {
            Ok(kind) => kind,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "created entry already gone");
                return Vec::new();
            }
        };

        match kind {
            NodeKind::Directory => {
                // Already registered, e.g. by the other half of a rename.
                if self.entries.contains_key(path) {
                    debug!(path = %path.display(), "created dir already watched");
                    return Vec::new();
                }
                if self.filter.should_watch_dir(path) {
                    self.add_directory(path, true, true)
                } else {
                    Vec::new()
                }
            }
            other => self.maybe_add_file(path, other, true).into_iter().collect(),
        }
    }

    fn on_write(&mut self, path: &Path) -> Option<RunTrigger> {
        if !self.entries.contains_key(path) {
            return None;
        }
        if self.logs_changes() {
            info!(path = %path.display(), "write file");
        }
        Some(RunTrigger::new(path, TriggerCause::Written))
    }

    fn on_remove(&mut self, path: &Path) -> Vec<RunTrigger> {
        let Some(kind) = self.entries.remove(path) else {
            return Vec::new();
        };

        match kind {
            EntryKind::File => {
                if self.logs_changes() {
                    info!(path = %path.display(), "remove file");
                }
                vec![RunTrigger::new(path, TriggerCause::Removed)]
            }
            EntryKind::Directory => {
                if self.logs_changes() {
                    info!(path = %path.display(), "remove dir");
                }
                self.release_watch(path);
                self.remove_descendants(path)
            }
        }
    }

    /// Drop every tracked entry strictly beneath `dir`. Descendants are
    /// contiguous in the sorted map, right after `dir` itself.
    fn remove_descendants(&mut self, dir: &Path) -> Vec<RunTrigger> {
        let orphans: Vec<PathBuf> = self
            .entries
            .range::<Path, _>((Bound::Excluded(dir), Bound::Unbounded))
            .take_while(|(p, _)| p.starts_with(dir))
            .map(|(p, _)| p.clone())
            .collect();

        let mut triggers = Vec::new();
        for orphan in orphans {
            match self.entries.remove(&orphan) {
                Some(EntryKind::File) => {
                    if self.logs_changes() {
                        info!(path = %orphan.display(), "unwatch orphan file");
                    }
                    triggers.push(RunTrigger::new(&orphan, TriggerCause::Orphaned));
                }
                Some(EntryKind::Directory) => {
                    if self.logs_changes() {
                        info!(path = %orphan.display(), "unwatch orphan dir");
                    }
                    self.release_watch(&orphan);
                }
                None => {}
            }
        }
        triggers
    }

    fn release_watch(&mut self, dir: &Path) {
        // A deleted directory usually lost its OS watch already.
        if let Err(err) = self.notifier.unwatch(dir) {
            debug!(path = %dir.display(), error = %err, "unwatch dir");
        }
    }
}
