// src/config/mod.rs

//! Configuration loading and resolution for war.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Normalize and check the file's fields (`validate.rs`).
//! - Merge CLI overrides, the file and defaults into a [`ResolvedPolicy`]
//!   (`resolve.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod policy;
pub mod resolve;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, RawConfigFile, RunSpec};
pub use policy::{ResolvedPolicy, DEFAULT_CANCEL_LAST, DEFAULT_DELAY, DEFAULT_TERM_TIMEOUT};
pub use resolve::{absolutize, resolve_policy, resolve_root, CliOverrides};
