use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use war::errors::{Result, WarError};
use war::watch::{Notifier, NotifierEvents, NotifierMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Watch(PathBuf),
    Unwatch(PathBuf),
}

#[derive(Debug, Default)]
struct NotifierLog {
    watched: BTreeSet<PathBuf>,
    calls: Vec<NotifierCall>,
    failing: HashSet<PathBuf>,
}

/// A notifier that:
/// - records every watch/unwatch call
/// - keeps the set of currently watched directories
/// - refuses to watch paths registered with [`RecordingNotifier::fail_on`].
///
/// Clones share state, so a test can keep one handle while the watch tree
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<NotifierLog>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, NotifierLog> {
        self.log.lock().unwrap()
    }

    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        self.lock().failing.insert(path.into());
    }

    pub fn is_watched(&self, path: impl AsRef<Path>) -> bool {
        self.lock().watched.contains(path.as_ref())
    }

    /// Currently watched directories, sorted.
    pub fn watched(&self) -> Vec<PathBuf> {
        self.lock().watched.iter().cloned().collect()
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.lock().calls.clone()
    }
}

impl Notifier for RecordingNotifier {
    fn watch(&mut self, dir: &Path) -> Result<()> {
        let mut log = self.lock();
        log.calls.push(NotifierCall::Watch(dir.to_path_buf()));
        if log.failing.contains(dir) {
            return Err(WarError::Watch(format!("refusing to watch {}", dir.display())));
        }
        log.watched.insert(dir.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, dir: &Path) -> Result<()> {
        let mut log = self.lock();
        log.calls.push(NotifierCall::Unwatch(dir.to_path_buf()));
        if log.watched.remove(dir) {
            Ok(())
        } else {
            Err(WarError::Watch(format!("{} is not watched", dir.display())))
        }
    }
}

/// The sending side tests use to inject raw notifier messages.
pub fn notifier_channel() -> (mpsc::UnboundedSender<NotifierMessage>, NotifierEvents) {
    mpsc::unbounded_channel()
}
