// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which directories/files are worth watching ([`filter`], backed by
//!   gitignore-style rules from [`ignore`]).
//! - Keeping the set of OS watches in step with the live tree ([`tree`]).
//! - Turning raw `notify` events into tree updates and run triggers
//!   ([`event`], [`watcher`]).
//!
//! It does **not** run anything; it only tells the scheduler that a run is
//! wanted.

pub mod event;
pub mod filter;
pub mod ignore;
pub mod notifier;
pub mod tree;
pub mod watcher;

pub use event::{translate, EventTranslator, WatchEvent, WatchEventKind};
pub use filter::PathFilter;
pub use ignore::{GitIgnore, IgnoreMatcher};
pub use notifier::{Notifier, NotifierEvents, NotifierMessage, NotifyBackend};
pub use tree::{RunTrigger, TriggerCause, WatchTree};
pub use watcher::spawn_event_loop;
