// src/engine/mod.rs

//! Orchestration engine for war.
//!
//! This module ties together:
//! - the one-slot run-trigger queue and the cancellation handoff
//! - the debounce/scheduling state machine
//! - the scheduler loop, the only caller of the sequence runner
//! - the [`Engine`], which starts and stops both paths
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`scheduler`].

pub mod cancel;
pub mod core;
pub mod scheduler;
pub mod watch_and_run;

pub use cancel::{
    run_channels, CancelReceiver, CancelResult, CancelToken, RunHandle, SchedulerInbox,
};
pub use core::{SchedulerAction, SchedulerCore, SchedulerInput, SchedulerState};
pub use scheduler::Scheduler;
pub use watch_and_run::Engine;
