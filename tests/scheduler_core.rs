// tests/scheduler_core.rs

use std::time::Duration;

use war::engine::{SchedulerAction, SchedulerCore, SchedulerInput, SchedulerState};

use SchedulerAction::*;

const DELAY: Duration = Duration::from_millis(200);

fn core() -> SchedulerCore {
    SchedulerCore::new(DELAY)
}

fn finished(succeeded: bool) -> SchedulerInput {
    SchedulerInput::SequenceFinished { succeeded }
}

#[test]
fn first_trigger_arms_with_zero_delay() {
    let mut c = core();

    assert_eq!(c.step(SchedulerInput::Trigger), vec![ArmDebounce(Duration::ZERO)]);
    assert_eq!(c.state(), SchedulerState::DebounceWindowOpen);
}

#[test]
fn later_triggers_rearm_with_configured_delay() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);

    // Still inside the first window: restart with the full delay.
    assert_eq!(c.step(SchedulerInput::Trigger), vec![ArmDebounce(DELAY)]);
    assert_eq!(c.step(SchedulerInput::Trigger), vec![ArmDebounce(DELAY)]);
    assert_eq!(c.state(), SchedulerState::DebounceWindowOpen);
}

#[test]
fn elapsed_window_runs_sequence_as_first_attempt() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);

    assert_eq!(
        c.step(SchedulerInput::DebounceElapsed),
        vec![RunSequence { first_attempt: true }]
    );
    assert_eq!(c.state(), SchedulerState::Executing);
}

#[test]
fn elapsed_without_window_is_ignored() {
    let mut c = core();
    assert!(c.step(SchedulerInput::DebounceElapsed).is_empty());
    assert_eq!(c.state(), SchedulerState::Idle);
}

#[test]
fn first_attempt_stays_true_until_a_success() {
    let mut c = core();

    c.step(SchedulerInput::Trigger);
    c.step(SchedulerInput::DebounceElapsed);
    c.step(finished(false));
    assert!(!c.first_success());

    c.step(SchedulerInput::Trigger);
    assert_eq!(
        c.step(SchedulerInput::DebounceElapsed),
        vec![RunSequence { first_attempt: true }]
    );
    c.step(finished(true));
    assert!(c.first_success());

    c.step(SchedulerInput::Trigger);
    assert_eq!(
        c.step(SchedulerInput::DebounceElapsed),
        vec![RunSequence { first_attempt: false }]
    );

    // A later failure does not flip it back.
    c.step(finished(false));
    assert!(c.first_success());
}

#[test]
fn trigger_queued_during_execution_is_read_after_finish() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);
    c.step(SchedulerInput::DebounceElapsed);

    // The shell is busy in the runner; the trigger waits in the queue.
    assert!(c.step(finished(true)).is_empty());
    assert_eq!(c.state(), SchedulerState::Idle);

    assert_eq!(c.step(SchedulerInput::Trigger), vec![ArmDebounce(DELAY)]);
    assert_eq!(c.state(), SchedulerState::DebounceWindowOpen);
}

#[test]
fn trigger_while_executing_changes_nothing() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);
    c.step(SchedulerInput::DebounceElapsed);

    assert!(c.step(SchedulerInput::Trigger).is_empty());
    assert_eq!(c.state(), SchedulerState::Executing);
    assert!(c.step(finished(true)).is_empty());
    assert_eq!(c.state(), SchedulerState::Idle);
}

#[test]
fn finish_without_pending_trigger_goes_idle() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);
    c.step(SchedulerInput::DebounceElapsed);

    assert!(c.step(finished(true)).is_empty());
    assert_eq!(c.state(), SchedulerState::Idle);
}

#[test]
fn cancel_clears_everything_and_resolves() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);

    assert_eq!(
        c.step(SchedulerInput::Cancel),
        vec![DropPendingTriggers, DisarmDebounce, ResolveCancellation]
    );
    assert_eq!(c.state(), SchedulerState::Idle);
}

#[test]
fn cancelled_sequence_finishes_then_resolves() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);
    c.step(SchedulerInput::DebounceElapsed);

    // The runner handed back a token: the sequence is over, then the token
    // is serviced.
    assert!(c.step(finished(false)).is_empty());
    let actions = c.step(SchedulerInput::Cancel);

    assert_eq!(actions, vec![DropPendingTriggers, DisarmDebounce, ResolveCancellation]);
    assert_eq!(c.state(), SchedulerState::Idle);
}

#[test]
fn cancel_while_idle_still_resolves() {
    let mut c = core();
    assert_eq!(
        c.step(SchedulerInput::Cancel),
        vec![DropPendingTriggers, DisarmDebounce, ResolveCancellation]
    );
}

#[test]
fn zero_delay_only_applies_once() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);
    c.step(SchedulerInput::Cancel);

    assert_eq!(c.step(SchedulerInput::Trigger), vec![ArmDebounce(DELAY)]);
}

#[test]
fn shutdown_stops_and_ignores_everything_after() {
    let mut c = core();
    c.step(SchedulerInput::Trigger);

    assert_eq!(c.step(SchedulerInput::Shutdown), vec![DisarmDebounce, Exit]);
    assert!(c.is_stopped());

    assert!(c.step(SchedulerInput::Trigger).is_empty());
    assert!(c.step(SchedulerInput::DebounceElapsed).is_empty());
    assert!(c.step(SchedulerInput::Cancel).is_empty());
    assert!(c.step(SchedulerInput::Shutdown).is_empty());
    assert_eq!(c.state(), SchedulerState::Stopped);
}
