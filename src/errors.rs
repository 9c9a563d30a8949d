// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("watch root does not exist: {0:?}")]
    RootNotFound(PathBuf),

    #[error("watch root is not a directory: {0:?}")]
    RootNotDirectory(PathBuf),

    #[error("file notifier error: {0}")]
    Notifier(#[from] notify::Error),

    #[error("watch error: {0}")]
    Watch(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WarError>;
