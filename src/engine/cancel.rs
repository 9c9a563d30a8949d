// src/engine/cancel.rs

//! Run-trigger queue and the cancellation rendezvous.
//!
//! Two pieces connect the event-consumption path with the scheduler path:
//!
//! - a one-slot trigger queue: posting while a trigger is already pending is
//!   a no-op, so any burst collapses into "at least one run wanted";
//! - a one-slot cancellation handoff carrying [`CancelToken`]s. The requester
//!   blocks until the token's completion signal fires, or until the engine
//!   shuts down, in which case the wait is abandoned.
//!
//! A token is owned by exactly one party at a time: the handoff slot, the
//! supervisor (while escalating signals), then the scheduler, which is the
//! only one that resolves it.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

/// A request to abort whatever run is pending or executing.
#[derive(Debug)]
pub struct CancelToken {
    done: oneshot::Sender<()>,
}

impl CancelToken {
    /// A token plus the receiver that fires once it is resolved.
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (done, rx) = oneshot::channel();
        (Self { done }, rx)
    }

    /// Fire the completion signal. Consumes the token, so it can only happen
    /// once.
    pub fn resolve(self) {
        // The requester may have abandoned the wait during shutdown.
        let _ = self.done.send(());
    }
}

pub type CancelReceiver = mpsc::Receiver<CancelToken>;

/// How a [`RunHandle::cancel_run`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelResult {
    /// The scheduler resolved the token; any stale run is fully torn down.
    Completed,
    /// The engine is shutting down; the wait was given up.
    Abandoned,
}

/// Sending half used by the event-consumption path (and by shutdown).
#[derive(Debug, Clone)]
pub struct RunHandle {
    trigger_tx: mpsc::Sender<()>,
    cancel_tx: mpsc::Sender<CancelToken>,
    closed: watch::Receiver<bool>,
}

/// Receiving half owned by the scheduler path.
#[derive(Debug)]
pub struct SchedulerInbox {
    pub triggers: mpsc::Receiver<()>,
    pub cancels: CancelReceiver,
    pub shutdown: watch::Receiver<bool>,
}

impl SchedulerInbox {
    /// Discard a pending, not yet consumed trigger.
    pub fn drain_triggers(&mut self) -> usize {
        let mut drained = 0;
        while self.triggers.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

/// Build the trigger queue and cancellation handoff. `shutdown` is the flag
/// that, once `true`, stops the scheduler and releases blocked cancellers.
pub fn run_channels(shutdown: watch::Receiver<bool>) -> (RunHandle, SchedulerInbox) {
    let (trigger_tx, triggers) = mpsc::channel(1);
    let (cancel_tx, cancels) = mpsc::channel(1);

    let handle = RunHandle {
        trigger_tx,
        cancel_tx,
        closed: shutdown.clone(),
    };
    let inbox = SchedulerInbox {
        triggers,
        cancels,
        shutdown,
    };
    (handle, inbox)
}

impl RunHandle {
    /// Post a run trigger. Returns `false` once the scheduler is gone.
    pub fn notify_run(&self) -> bool {
        match self.trigger_tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }

    /// Synchronously cancel any pending or executing run.
    pub async fn cancel_run(&self) -> CancelResult {
        let mut closed = self.closed.clone();
        if *closed.borrow() {
            return CancelResult::Abandoned;
        }

        let (token, done) = CancelToken::new();

        let sent = tokio::select! {
            biased;
            _ = closed.wait_for(|c| *c) => false,
            res = self.cancel_tx.send(token) => res.is_ok(),
        };
        if !sent {
            debug!("cancel request abandoned before handoff");
            return CancelResult::Abandoned;
        }

        tokio::select! {
            biased;
            res = done => match res {
                Ok(()) => CancelResult::Completed,
                Err(_) => CancelResult::Abandoned,
            },
            _ = closed.wait_for(|c| *c) => {
                debug!("cancel request abandoned during shutdown");
                CancelResult::Abandoned
            }
        }
    }
}
