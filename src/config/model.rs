// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::config::duration::parse_duration;

/// Configuration file as read from TOML, before validation.
///
/// ```toml
/// root = "cfg:."
/// run = ["go build ./...", "go test ./..."]
/// include_exts = ["go", "mod"]
/// ignore_rules = ["target/", "*.md"]
/// delay = "500ms"
/// cancel_last = true
/// term_timeout = "3s"
///
/// [env]
/// GOFLAGS = "-race"
/// ```
///
/// Every key is optional. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Watch root. Supports the `wd:`, `cfg:` and `env:` prefixes.
    #[serde(default)]
    pub root: String,

    /// A single command or a list of commands.
    #[serde(default)]
    pub run: RunSpec,

    #[serde(default)]
    pub include_exts: Vec<String>,

    #[serde(default)]
    pub ignore_rules: Vec<String>,

    /// Path to a gitignore-format file, relative to the working directory.
    #[serde(default)]
    pub ignore_file: Option<String>,

    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub delay: Option<Duration>,

    #[serde(default)]
    pub cancel_last: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub term_timeout: Option<Duration>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `run = "cmd"` or `run = ["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RunSpec {
    One(String),
    Many(Vec<String>),
}

impl Default for RunSpec {
    fn default() -> Self {
        RunSpec::Many(Vec::new())
    }
}

impl RunSpec {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            RunSpec::One(cmd) => vec![cmd],
            RunSpec::Many(cmds) => cmds,
        }
    }
}

fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// Validated configuration file.
///
/// Construct via `ConfigFile::try_from(RawConfigFile)`, which trims and
/// normalizes the fields (see `validate.rs`).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub root: String,
    pub run: Vec<String>,
    /// Extensions without their leading dot.
    pub include_exts: Vec<String>,
    pub ignore_rules: Vec<String>,
    pub ignore_file: Option<String>,
    pub delay: Option<Duration>,
    pub cancel_last: Option<bool>,
    pub term_timeout: Option<Duration>,
    pub env: BTreeMap<String, String>,
}
