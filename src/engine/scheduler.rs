// src/engine/scheduler.rs

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};
use tracing::{debug, info};

use crate::exec::{RunRequest, SequenceOutcome, SequenceRunner};

use super::cancel::{CancelToken, SchedulerInbox};
use super::core::{SchedulerAction, SchedulerCore, SchedulerInput};

/// The scheduler path: owns the debounce countdown and is the only caller of
/// the sequence runner.
///
/// This is a pure IO shell around [`SchedulerCore`], which contains all the
/// scheduling semantics. While a sequence is executing, the loop is inside
/// the runner call; cancellation tokens then reach the runner through the
/// shared receiver and come back with the outcome.
pub struct Scheduler<R: SequenceRunner> {
    core: SchedulerCore,
    inbox: SchedulerInbox,
    runner: R,
    timer: Pin<Box<Sleep>>,
    timer_armed: bool,
}

impl<R: SequenceRunner> fmt::Debug for Scheduler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("core", &self.core)
            .field("timer_armed", &self.timer_armed)
            .finish_non_exhaustive()
    }
}

enum Wake {
    Shutdown,
    Cancel(CancelToken),
    Trigger,
    DebounceElapsed,
}

impl<R: SequenceRunner> Scheduler<R> {
    pub fn new(core: SchedulerCore, inbox: SchedulerInbox, runner: R) -> Self {
        Self {
            core,
            inbox,
            runner,
            timer: Box::pin(tokio::time::sleep(Duration::ZERO)),
            timer_armed: false,
        }
    }

    /// Main loop. Returns once shutdown has been requested.
    pub async fn run(mut self) {
        info!("scheduler started");

        while !self.core.is_stopped() {
            let wake = tokio::select! {
                biased;
                _ = self.inbox.shutdown.wait_for(|stop| *stop) => Wake::Shutdown,
                Some(token) = self.inbox.cancels.recv() => Wake::Cancel(token),
                Some(()) = self.inbox.triggers.recv() => Wake::Trigger,
                () = &mut self.timer, if self.timer_armed => Wake::DebounceElapsed,
                else => Wake::Shutdown,
            };

            match wake {
                Wake::Shutdown => self.drive(SchedulerInput::Shutdown, None).await,
                Wake::Cancel(token) => self.drive(SchedulerInput::Cancel, Some(token)).await,
                Wake::Trigger => self.drive(SchedulerInput::Trigger, None).await,
                Wake::DebounceElapsed => {
                    self.timer_armed = false;
                    self.drive(SchedulerInput::DebounceElapsed, None).await;
                }
            }
        }

        info!("scheduler stopped");
    }

    /// Feed `input` into the core and carry out the resulting actions,
    /// including any follow-up inputs produced by running a sequence.
    async fn drive(&mut self, input: SchedulerInput, mut token: Option<CancelToken>) {
        let mut inputs = VecDeque::from([input]);

        while let Some(input) = inputs.pop_front() {
            debug!(?input, state = ?self.core.state(), "scheduler input");

            for action in self.core.step(input) {
                match action {
                    SchedulerAction::ArmDebounce(delay) => {
                        self.timer.as_mut().reset(Instant::now() + delay);
                        self.timer_armed = true;
                    }
                    SchedulerAction::DisarmDebounce => {
                        self.timer_armed = false;
                    }
                    SchedulerAction::DropPendingTriggers => {
                        let dropped = self.inbox.drain_triggers();
                        if dropped > 0 {
                            debug!(dropped, "dropped pending trigger");
                        }
                    }
                    SchedulerAction::RunSequence { first_attempt } => {
                        let request = RunRequest { first_attempt };
                        let outcome = self
                            .runner
                            .run_sequence(request, &mut self.inbox.cancels)
                            .await;

                        inputs.push_back(SchedulerInput::SequenceFinished {
                            succeeded: outcome.succeeded(),
                        });
                        if let SequenceOutcome::Cancelled(forwarded) = outcome {
                            token = Some(forwarded);
                            inputs.push_back(SchedulerInput::Cancel);
                        }
                    }
                    SchedulerAction::ResolveCancellation => match token.take() {
                        Some(token) => token.resolve(),
                        None => debug!("no cancellation token to resolve"),
                    },
                    SchedulerAction::Exit => {
                        debug!("scheduler exit requested");
                    }
                }
            }
        }
    }
}
