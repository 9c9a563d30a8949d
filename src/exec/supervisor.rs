// src/exec/supervisor.rs

//! Runs the configured command sequence as OS processes.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::config::ResolvedPolicy;
use crate::engine::{CancelReceiver, CancelToken};
use crate::exec::backend::{RunRequest, SequenceOutcome, SequenceRunner};
use crate::exec::process_group::{self, Severity};

/// Directory of the config file, when one was used.
pub const ENV_CFG_DIR: &str = "WAR_CFG_DIR";
/// Set to `1` on every invocation until a full sequence has succeeded.
pub const ENV_RUN0: &str = "WAR_RUN0";

/// Production [`SequenceRunner`].
///
/// Each command runs through the platform shell in the watch root, inside its
/// own process group, with the inherited environment plus the configured
/// overrides and the `WAR_*` variables.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    policy: Arc<ResolvedPolicy>,
}

enum CommandOutcome {
    Exited,
    Failed,
    Cancelled(CancelToken),
}

enum Waited {
    Exited(io::Result<ExitStatus>),
    Cancel(CancelToken),
}

impl ProcessSupervisor {
    pub fn new(policy: Arc<ResolvedPolicy>) -> Self {
        Self { policy }
    }

    async fn run_all(
        &self,
        request: RunRequest,
        cancels: &mut CancelReceiver,
    ) -> SequenceOutcome {
        let total = self.policy.run.len();
        for (index, line) in self.policy.run.iter().enumerate() {
            let step = index + 1;
            match self.run_command(step, total, line, request, cancels).await {
                CommandOutcome::Exited => {}
                CommandOutcome::Failed => {
                    if step < total {
                        warn!(skipped = total - step, "run failed; skipping remaining commands");
                    }
                    return SequenceOutcome::Failed;
                }
                CommandOutcome::Cancelled(token) => return SequenceOutcome::Cancelled(token),
            }
        }
        SequenceOutcome::Succeeded
    }

    fn build_command(&self, line: &str, request: RunRequest) -> Command {
        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(line);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(line);
            c
        };

        cmd.current_dir(&self.policy.root)
            .envs(&self.policy.env)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        if let Some(cfg_dir) = &self.policy.cfg_dir {
            cmd.env(ENV_CFG_DIR, cfg_dir);
        }
        if request.first_attempt {
            cmd.env(ENV_RUN0, "1");
        } else {
            cmd.env_remove(ENV_RUN0);
        }

        process_group::isolate(&mut cmd);
        cmd
    }

    async fn run_command(
        &self,
        step: usize,
        total: usize,
        line: &str,
        request: RunRequest,
        cancels: &mut CancelReceiver,
    ) -> CommandOutcome {
        let begin = Instant::now();
        let mut child = match self.build_command(line, request).spawn() {
            Ok(child) => child,
            Err(err) => {
                error!(step, total, cmd = %line, error = %err, "run: start error");
                return CommandOutcome::Failed;
            }
        };
        info!(step, total, cmd = %line, pid = child.id(), "run: start");

        // Either the process exits on its own (normal case), or a
        // cancellation token arrives first.
        let waited = tokio::select! {
            status = child.wait() => Waited::Exited(status),
            Some(token) = cancels.recv() => Waited::Cancel(token),
        };

        match waited {
            Waited::Exited(Ok(status)) if status.success() => {
                info!(step, total, cost = ?begin.elapsed(), "run: done");
                CommandOutcome::Exited
            }
            Waited::Exited(Ok(status)) => {
                error!(step, total, cmd = %line, status = %status, "run: exited with error");
                CommandOutcome::Failed
            }
            Waited::Exited(Err(err)) => {
                error!(step, total, cmd = %line, error = %err, "run: wait error");
                CommandOutcome::Failed
            }
            Waited::Cancel(token) => {
                let cancel_begin = Instant::now();
                match self.stop_child(&mut child).await {
                    Ok(()) => {
                        warn!(step, total, cost = ?cancel_begin.elapsed(), "run: cancel ok")
                    }
                    Err(err) => error!(step, total, error = %err, "run: cancel error"),
                }
                CommandOutcome::Cancelled(token)
            }
        }
    }

    /// Graceful-then-forceful escalation against the child's process group.
    ///
    /// With a non-zero termination timeout the group gets SIGTERM and that
    /// long to exit; otherwise (or when it does not exit in time) it gets
    /// SIGKILL.
    async fn stop_child(&self, child: &mut Child) -> io::Result<()> {
        let timeout = self.policy.term_timeout;

        if !timeout.is_zero() {
            let sent = process_group::signal_group(child, Severity::Graceful);
            match &sent {
                Ok(()) => warn!(pid = child.id(), "run: sent SIGTERM"),
                Err(err) => warn!(pid = child.id(), error = %err, "run: SIGTERM failed"),
            }

            if tokio::time::timeout(timeout, child.wait()).await.is_ok() {
                return Ok(());
            }
            error!(pid = child.id(), ?timeout, "run: still alive after SIGTERM; sending SIGKILL");
        }

        let killed = process_group::signal_group(child, Severity::Forceful);
        if killed.is_err() {
            // Make sure at least the direct child goes away.
            let _ = child.start_kill();
        }
        if let Err(err) = child.wait().await {
            warn!(error = %err, "run: failed to reap killed child");
        }
        killed
    }
}

impl SequenceRunner for ProcessSupervisor {
    fn run_sequence<'a>(
        &'a mut self,
        request: RunRequest,
        cancels: &'a mut CancelReceiver,
    ) -> Pin<Box<dyn Future<Output = SequenceOutcome> + Send + 'a>> {
        Box::pin(self.run_all(request, cancels))
    }
}
