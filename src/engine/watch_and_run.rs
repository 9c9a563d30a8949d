// src/engine/watch_and_run.rs

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ResolvedPolicy;
use crate::errors::{Result, WarError};
use crate::exec::SequenceRunner;
use crate::fs::FileSystem;
use crate::watch::{spawn_event_loop, Notifier, NotifierEvents, PathFilter, WatchTree};

use super::cancel::{run_channels, RunHandle};
use super::core::SchedulerCore;
use super::scheduler::Scheduler;

/// A running watch-and-run engine: the event-consumption path and the
/// scheduler path, started together and stopped together.
pub struct Engine {
    handle: RunHandle,
    stop_events: watch::Sender<bool>,
    shutdown: watch::Sender<bool>,
    event_task: JoinHandle<()>,
    scheduler_task: JoinHandle<()>,
    fatal_rx: Option<oneshot::Receiver<WarError>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Validate the root, scan it, and start both paths.
    ///
    /// The initial scan runs before this returns, so every directory that
    /// passes the filter is already watched. One run trigger is posted right
    /// away; the first trigger is always scheduled without debounce delay.
    pub fn start<R, N>(
        policy: Arc<ResolvedPolicy>,
        runner: R,
        notifier: N,
        events: NotifierEvents,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self>
    where
        R: SequenceRunner + 'static,
        N: Notifier + 'static,
    {
        let root = policy.root.clone();
        if !fs.exists(&root) {
            return Err(WarError::RootNotFound(root));
        }
        if !fs.is_dir(&root) {
            return Err(WarError::RootNotDirectory(root));
        }

        let filter = PathFilter::from_policy(&policy, Arc::clone(&fs));
        let mut tree = WatchTree::new(notifier, fs, filter, policy.verbosity);
        tree.add_directory(&root, true, false);
        if !tree.contains(&root) {
            return Err(WarError::Watch(format!(
                "could not watch root directory {}",
                root.display()
            )));
        }
        tree.finish_initial_scan();
        info!(root = %root.display(), entries = tree.len(), "watching");

        let (shutdown, shutdown_rx) = watch::channel(false);
        let (stop_events, stop_events_rx) = watch::channel(false);
        let (handle, inbox) = run_channels(shutdown_rx);

        // Fast first feedback.
        handle.notify_run();

        let scheduler = Scheduler::new(SchedulerCore::new(policy.delay), inbox, runner);
        let scheduler_task = tokio::spawn(scheduler.run());

        let (fatal_tx, fatal_rx) = oneshot::channel();
        let event_task = spawn_event_loop(
            tree,
            events,
            handle.clone(),
            policy.cancel_last,
            stop_events_rx,
            fatal_tx,
        );

        Ok(Self {
            handle,
            stop_events,
            shutdown,
            event_task,
            scheduler_task,
            fatal_rx: Some(fatal_rx),
        })
    }

    /// Handle for posting triggers and cancellations from outside.
    pub fn run_handle(&self) -> RunHandle {
        self.handle.clone()
    }

    /// Resolves with the notifier-internal error, if the OS event stream
    /// ever reports one. Never resolves otherwise.
    pub async fn fatal_error(&mut self) -> WarError {
        if let Some(rx) = self.fatal_rx.as_mut() {
            if let Ok(err) = rx.await {
                self.fatal_rx = None;
                return err;
            }
            self.fatal_rx = None;
        }
        std::future::pending().await
    }

    /// Stop the engine.
    ///
    /// Order matters: the event path is stopped first (closing the OS
    /// notifier, so no event is handled after this point), then a
    /// cancellation round-trip tears down any running sequence, and only
    /// then is the scheduler told to exit. Both tasks are awaited.
    pub async fn stop(self) -> Result<()> {
        let Engine {
            handle,
            stop_events,
            shutdown,
            event_task,
            scheduler_task,
            fatal_rx: _,
        } = self;

        info!("stopping");

        let _ = stop_events.send(true);
        event_task
            .await
            .map_err(|e| anyhow!("event loop task failed: {e}"))?;

        let cancelled = handle.cancel_run().await;
        debug!(?cancelled, "final cancellation round-trip");

        let _ = shutdown.send(true);
        if let Err(e) = scheduler_task.await {
            error!(error = %e, "scheduler task failed");
            return Err(anyhow!("scheduler task failed: {e}").into());
        }

        info!("stopped");
        Ok(())
    }
}
