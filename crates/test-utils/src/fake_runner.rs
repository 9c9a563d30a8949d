use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use war::engine::CancelReceiver;
use war::exec::{RunRequest, SequenceOutcome, SequenceRunner};

/// What one scripted invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    /// Simulated execution time; cancellable throughout.
    pub duration: Duration,
    pub succeed: bool,
}

impl Script {
    pub fn succeed_after(duration: Duration) -> Self {
        Self { duration, succeed: true }
    }

    pub fn fail_after(duration: Duration) -> Self {
        Self { duration, succeed: false }
    }

    /// Runs until cancelled.
    pub fn hang() -> Self {
        Self::succeed_after(Duration::from_secs(24 * 60 * 60))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct Invocation {
    pub started: Instant,
    pub finished: Option<Instant>,
    pub first_attempt: bool,
    pub outcome: Recorded,
}

#[derive(Debug, Default)]
struct RunLog {
    invocations: Vec<Invocation>,
    active: usize,
    max_active: usize,
}

/// Shared view on what a [`ScriptedRunner`] did.
#[derive(Debug, Clone, Default)]
pub struct RunRecorder {
    log: Arc<Mutex<RunLog>>,
}

impl RunRecorder {
    fn lock(&self) -> MutexGuard<'_, RunLog> {
        self.log.lock().unwrap()
    }

    pub fn count(&self) -> usize {
        self.lock().invocations.len()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    pub fn first_attempts(&self) -> Vec<bool> {
        self.lock().invocations.iter().map(|i| i.first_attempt).collect()
    }

    pub fn outcomes(&self) -> Vec<Recorded> {
        self.lock().invocations.iter().map(|i| i.outcome).collect()
    }

    /// Highest number of invocations that were in flight at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.lock().max_active
    }

    /// Wait (in tokio time) until at least `n` invocations have started.
    pub async fn wait_for_runs(&self, n: usize) {
        while self.count() < n {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Wait (in tokio time) until no invocation is running.
    pub async fn wait_idle(&self) {
        while self.lock().active > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

/// A fake runner that:
/// - plays back a script of invocations (then `default` forever)
/// - honours cancellation tokens mid-run, handing them back
/// - records timing, `first_attempt` and concurrency in a [`RunRecorder`].
pub struct ScriptedRunner {
    script: VecDeque<Script>,
    default: Script,
    recorder: RunRecorder,
}

impl ScriptedRunner {
    /// Every invocation succeeds immediately.
    pub fn new() -> Self {
        Self::with_script(Vec::new(), Script::succeed_after(Duration::ZERO))
    }

    pub fn with_script(script: Vec<Script>, default: Script) -> Self {
        Self {
            script: script.into(),
            default,
            recorder: RunRecorder::default(),
        }
    }

    pub fn recorder(&self) -> RunRecorder {
        self.recorder.clone()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceRunner for ScriptedRunner {
    fn run_sequence<'a>(
        &'a mut self,
        request: RunRequest,
        cancels: &'a mut CancelReceiver,
    ) -> Pin<Box<dyn Future<Output = SequenceOutcome> + Send + 'a>> {
        let script = self.script.pop_front().unwrap_or(self.default);
        let recorder = self.recorder.clone();

        Box::pin(async move {
            let index = {
                let mut log = recorder.lock();
                log.invocations.push(Invocation {
                    started: Instant::now(),
                    finished: None,
                    first_attempt: request.first_attempt,
                    outcome: Recorded::Running,
                });
                log.active += 1;
                log.max_active = log.max_active.max(log.active);
                log.invocations.len() - 1
            };

            let cancelled = tokio::select! {
                _ = tokio::time::sleep(script.duration) => None,
                Some(token) = cancels.recv() => Some(token),
            };

            let (outcome, recorded) = match cancelled {
                Some(token) => (SequenceOutcome::Cancelled(token), Recorded::Cancelled),
                None if script.succeed => (SequenceOutcome::Succeeded, Recorded::Succeeded),
                None => (SequenceOutcome::Failed, Recorded::Failed),
            };

            let mut log = recorder.lock();
            log.active -= 1;
            let entry = &mut log.invocations[index];
            entry.finished = Some(Instant::now());
            entry.outcome = recorded;
            outcome
        })
    }
}
