// src/watch/event.rs

//! Translation of raw `notify` events into the handful of kinds the watch
//! tree cares about.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Create,
    Write,
    Remove,
    Rename,
}

/// A single-path filesystem event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Split a `notify` event into per-path [`WatchEvent`]s.
///
/// Renames surface twice: the old name as `Rename` (so it is dropped from the
/// tree) and the new name as `Create` (so it is re-evaluated like any new
/// entry). Metadata and access notifications are dropped.
pub fn translate(event: &Event) -> Vec<WatchEvent> {
    let each = |kind: WatchEventKind| {
        event
            .paths
            .iter()
            .map(|p| WatchEvent::new(kind, p.clone()))
            .collect::<Vec<_>>()
    };

    match event.kind {
        EventKind::Create(_) => each(WatchEventKind::Create),
        EventKind::Remove(_) => each(WatchEventKind::Remove),
        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Other) => each(WatchEventKind::Write),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => each(WatchEventKind::Rename),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => each(WatchEventKind::Create),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut out = Vec::with_capacity(2);
            if let Some(from) = event.paths.first() {
                out.push(WatchEvent::new(WatchEventKind::Rename, from.clone()));
            }
            if let Some(to) = event.paths.get(1) {
                out.push(WatchEvent::new(WatchEventKind::Create, to.clone()));
            }
            out
        }
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| WatchEvent::new(rename_side(p), p.clone()))
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_))
        | EventKind::Access(_)
        | EventKind::Any
        | EventKind::Other => Vec::new(),
    }
}

/// Backends that cannot tell which side of a rename a path is on: whatever
/// still exists is the new name.
fn rename_side(path: &Path) -> WatchEventKind {
    if path.symlink_metadata().is_ok() {
        WatchEventKind::Create
    } else {
        WatchEventKind::Rename
    }
}

/// How many rename trackers [`EventTranslator`] remembers.
const RECENT_TRACKERS: usize = 64;

/// Stateful front of [`translate`] for one event stream.
///
/// Backends that pair rename halves (inotify) report a rename as `From`,
/// `To` and then a combined `Both` event carrying the same tracker. The halves
/// already describe the whole rename, so a `Both` whose tracker was seen is
/// dropped.
#[derive(Debug, Default)]
pub struct EventTranslator {
    recent: VecDeque<usize>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &Event) -> Vec<WatchEvent> {
        if let (EventKind::Modify(ModifyKind::Name(mode)), Some(tracker)) =
            (event.kind, event.attrs.tracker())
        {
            match mode {
                RenameMode::From | RenameMode::To => self.remember(tracker),
                RenameMode::Both if self.recent.contains(&tracker) => return Vec::new(),
                _ => {}
            }
        }
        translate(event)
    }

    fn remember(&mut self, tracker: usize) {
        if self.recent.contains(&tracker) {
            return;
        }
        if self.recent.len() == RECENT_TRACKERS {
            self.recent.pop_front();
        }
        self.recent.push_back(tracker);
    }
}
