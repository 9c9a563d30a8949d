// src/watch/notifier.rs

//! OS-level notifier seam.
//!
//! The watch tree only ever registers individual directories
//! (non-recursively); it maintains recursion itself so filtering decides what
//! is watched. [`NotifyBackend`] is the production implementation on top of
//! `notify`'s recommended watcher.

use std::path::Path;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::errors::Result;

/// Registration interface for directory watches.
pub trait Notifier: Send {
    fn watch(&mut self, dir: &Path) -> Result<()>;
    fn unwatch(&mut self, dir: &Path) -> Result<()>;
}

/// Message from the OS notifier's event stream.
#[derive(Debug)]
pub enum NotifierMessage {
    Event(Event),
    /// The stream itself failed, as opposed to one path's registration.
    Error(notify::Error),
}

pub type NotifierEvents = mpsc::UnboundedReceiver<NotifierMessage>;

/// Production notifier. Dropping it closes the OS watcher and ends the
/// event stream.
pub struct NotifyBackend {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend").finish()
    }
}

impl NotifyBackend {
    /// Create the OS watcher and the channel its callback feeds.
    pub fn new() -> Result<(Self, NotifierEvents)> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<NotifierMessage>();

        // Closure called synchronously by notify whenever an event arrives.
        let inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let msg = match res {
                    Ok(event) => NotifierMessage::Event(event),
                    Err(err) => NotifierMessage::Error(err),
                };
                // The receiver is gone once the event loop has stopped;
                // nothing left to deliver to.
                let _ = event_tx.send(msg);
            },
            Config::default(),
        )?;

        Ok((Self { inner }, event_rx))
    }
}

impl Notifier for NotifyBackend {
    fn watch(&mut self, dir: &Path) -> Result<()> {
        self.inner.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn unwatch(&mut self, dir: &Path) -> Result<()> {
        self.inner.unwatch(dir)?;
        Ok(())
    }
}
