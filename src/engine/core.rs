// src/engine/core.rs

//! Pure core scheduler state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`SchedulerInput`]s and produces:
//! - an updated core state
//! - a list of [`SchedulerAction`]s describing what the IO shell should do
//!   next
//!
//! The async shell (`engine::scheduler::Scheduler`) is responsible for:
//! - reading triggers and cancellation tokens from channels
//! - arming the debounce timer
//! - invoking the sequence runner
//! - resolving cancellation tokens
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or processes.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    DebounceWindowOpen,
    Executing,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerInput {
    /// At least one run trigger arrived.
    Trigger,
    /// The debounce countdown elapsed.
    DebounceElapsed,
    /// The command sequence returned.
    SequenceFinished { succeeded: bool },
    /// A cancellation token is being serviced.
    Cancel,
    /// The engine is stopping.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerAction {
    /// (Re)arm the countdown; the deadline is measured from now.
    ArmDebounce(Duration),
    DisarmDebounce,
    /// Discard a trigger still sitting in the queue.
    DropPendingTriggers,
    /// Invoke the supervisor. `first_attempt` is true until a full sequence
    /// has succeeded once.
    RunSequence { first_attempt: bool },
    /// Fire the completion signal of the token being serviced.
    ResolveCancellation,
    Exit,
}

/// Pure scheduler state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug, Clone)]
pub struct SchedulerCore {
    state: SchedulerState,
    delay: Duration,
    /// Set once the first trigger has been scheduled with zero delay.
    first_trigger_seen: bool,
    /// Monotonic: false until the first fully successful sequence.
    first_success: bool,
}

impl SchedulerCore {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            delay,
            first_trigger_seen: false,
            first_success: false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn first_success(&self) -> bool {
        self.first_success
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SchedulerState::Stopped
    }

    /// Handle a single input, updating state and returning the actions for
    /// the IO shell, in order.
    pub fn step(&mut self, input: SchedulerInput) -> Vec<SchedulerAction> {
        use SchedulerAction::*;
        use SchedulerState::*;

        if self.state == Stopped {
            return Vec::new();
        }

        match input {
            SchedulerInput::Trigger => match self.state {
                Idle | DebounceWindowOpen => {
                    let delay = if self.first_trigger_seen {
                        self.delay
                    } else {
                        self.first_trigger_seen = true;
                        Duration::ZERO
                    };
                    self.state = DebounceWindowOpen;
                    vec![ArmDebounce(delay)]
                }
                // Triggers stay queued while a sequence runs and are read
                // once it has finished.
                Executing | Stopped => Vec::new(),
            },

            SchedulerInput::DebounceElapsed => match self.state {
                DebounceWindowOpen => {
                    self.state = Executing;
                    vec![RunSequence {
                        first_attempt: !self.first_success,
                    }]
                }
                _ => Vec::new(),
            },

            SchedulerInput::SequenceFinished { succeeded } => {
                if succeeded {
                    self.first_success = true;
                }
                if self.state == Executing {
                    self.state = Idle;
                }
                Vec::new()
            }

            SchedulerInput::Cancel => {
                // Reaching the core means any executing sequence has already
                // been torn down by the supervisor.
                self.state = Idle;
                vec![DropPendingTriggers, DisarmDebounce, ResolveCancellation]
            }

            SchedulerInput::Shutdown => {
                self.state = Stopped;
                vec![DisarmDebounce, Exit]
            }
        }
    }
}
