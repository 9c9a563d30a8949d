// src/exec/backend.rs

//! Pluggable sequence-runner abstraction.
//!
//! The scheduler talks to a `SequenceRunner` instead of spawning processes
//! itself. This makes it easy to swap in a fake runner in tests while keeping
//! the production implementation in [`super::supervisor`].

use std::future::Future;
use std::pin::Pin;

use crate::engine::{CancelReceiver, CancelToken};

/// Per-invocation context handed down by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    /// True until one full sequence has succeeded (`WAR_RUN0=1`).
    pub first_attempt: bool,
}

/// Result of one sequence invocation.
#[derive(Debug)]
pub enum SequenceOutcome {
    /// Every command exited successfully.
    Succeeded,
    /// A command failed to start or exited unsuccessfully; the rest were
    /// skipped.
    Failed,
    /// A cancellation token arrived mid-command. The command's process group
    /// has been signalled and the token is handed back so the scheduler can
    /// finish servicing it.
    Cancelled(CancelToken),
}

impl SequenceOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, SequenceOutcome::Succeeded)
    }
}

/// Trait abstracting how the command sequence is executed.
///
/// Production code uses [`super::ProcessSupervisor`]; tests can provide their
/// own implementation that doesn't spawn real processes.
pub trait SequenceRunner: Send {
    /// Run the whole sequence once.
    ///
    /// While a command is executing, the implementation must also listen on
    /// `cancels` and, if a token arrives, stop the command and return it in
    /// [`SequenceOutcome::Cancelled`].
    fn run_sequence<'a>(
        &'a mut self,
        request: RunRequest,
        cancels: &'a mut CancelReceiver,
    ) -> Pin<Box<dyn Future<Output = SequenceOutcome> + Send + 'a>>;
}
