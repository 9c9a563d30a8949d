// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the configured commands,
//! using `tokio::process::Command`, and reporting the outcome of each
//! sequence back to the scheduler.
//!
//! - [`backend`] provides the `SequenceRunner` trait the scheduler drives,
//!   which tests can replace with a fake implementation.
//! - [`supervisor`] is the production runner: fail-fast sequencing, env
//!   injection and cancellation with signal escalation.
//! - [`process_group`] is the per-platform process-group/signal seam.

pub mod backend;
pub mod process_group;
pub mod supervisor;

pub use backend::{RunRequest, SequenceOutcome, SequenceRunner};
pub use process_group::Severity;
pub use supervisor::{ENV_CFG_DIR, ENV_RUN0, ProcessSupervisor};
