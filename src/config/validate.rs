// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WarError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WarError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let run = validate_run(raw.run.into_vec())?;
        let include_exts = normalize_exts(raw.include_exts)?;
        validate_env(&raw.env)?;

        let ignore_file = raw
            .ignore_file
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(ConfigFile {
            root: raw.root.trim().to_string(),
            run,
            include_exts,
            ignore_rules: raw.ignore_rules,
            ignore_file,
            delay: raw.delay,
            cancel_last: raw.cancel_last,
            term_timeout: raw.term_timeout,
            env: raw.env,
        })
    }
}

fn validate_run(run: Vec<String>) -> Result<Vec<String>> {
    for (index, cmd) in run.iter().enumerate() {
        if cmd.trim().is_empty() {
            return Err(WarError::ConfigError(format!(
                "run[{index}] is an empty command"
            )));
        }
    }
    Ok(run)
}

/// Strip the leading dot so both `"go"` and `".go"` mean the same thing.
pub fn normalize_exts(exts: Vec<String>) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(exts.len());
    for ext in exts {
        let trimmed = ext.trim();
        let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if bare.is_empty() {
            return Err(WarError::ConfigError(format!(
                "include_exts contains an empty extension ('{ext}')"
            )));
        }
        if bare.contains('/') || bare.contains('\\') {
            return Err(WarError::ConfigError(format!(
                "include_exts entry '{ext}' is not a file extension"
            )));
        }
        out.push(bare.to_string());
    }
    Ok(out)
}

fn validate_env(env: &std::collections::BTreeMap<String, String>) -> Result<()> {
    for key in env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(WarError::ConfigError(format!(
                "invalid environment variable name '{key}' in [env]"
            )));
        }
    }
    Ok(())
}
