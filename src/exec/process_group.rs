// src/exec/process_group.rs

//! Platform seam for process groups.
//!
//! Two capabilities: start a child in its own process group, and deliver a
//! signal of a given severity to that whole group. The escalation policy
//! lives in the supervisor and does not care which platform it runs on.

use std::io;

use tokio::process::{Child, Command};

/// How hard to ask a process group to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// SIGTERM: the group may clean up.
    Graceful,
    /// SIGKILL: no cleanup.
    Forceful,
}

/// Make the spawned child the leader of a fresh process group, so every
/// process it starts can be signalled together.
#[cfg(unix)]
pub fn isolate(cmd: &mut Command) {
    cmd.process_group(0);
}

#[cfg(windows)]
pub fn isolate(cmd: &mut Command) {
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

/// Deliver `severity` to the child's process group.
///
/// A child that has already been reaped has no group left to signal; that
/// is reported as success.
#[cfg(unix)]
pub fn signal_group(child: &mut Child, severity: Severity) -> io::Result<()> {
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pgid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    let signal = match severity {
        Severity::Graceful => libc::SIGTERM,
        Severity::Forceful => libc::SIGKILL,
    };

    // SAFETY: killpg only sends a signal; the group id comes from a child we
    // spawned as group leader via `process_group(0)`.
    let rc = unsafe { libc::killpg(pgid, signal) };
    if rc == 0 {
        Ok(())
    } else {
        let err = io::Error::last_os_error();
        // ESRCH: the whole group already exited.
        if err.raw_os_error() == Some(libc::ESRCH) {
            Ok(())
        } else {
            Err(err)
        }
    }
}

/// Windows has no group-wide graceful signal for console-less children; both
/// severities terminate the child.
#[cfg(windows)]
pub fn signal_group(child: &mut Child, _severity: Severity) -> io::Result<()> {
    child.start_kill()
}
