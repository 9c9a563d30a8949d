use std::fmt;
use std::str::FromStr;

/// How chatty the file-change log lines are.
///
/// - `0`: silent, no file-change lines at all.
/// - `1` (default): log file changes once the initial scan is done.
/// - `9`: log everything, including every entry found by the initial scan.
///
/// Warnings and errors are never gated by verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u8);

impl Verbosity {
    pub const SILENT: Verbosity = Verbosity(0);
    pub const CHANGES: Verbosity = Verbosity(1);
    pub const ALL: Verbosity = Verbosity(9);

    /// Whether a file-change line should be emitted right now.
    pub fn logs_change(self, initial_scan_done: bool) -> bool {
        self >= Verbosity::ALL || (initial_scan_done && self >= Verbosity::CHANGES)
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::CHANGES
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map(Verbosity)
            .map_err(|e| format!("invalid log level '{s}': {e} (expected 0, 1 or 9)"))
    }
}

/// Kind of a tracked entry in the watch tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}
