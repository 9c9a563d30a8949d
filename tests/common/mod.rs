#![allow(dead_code)]

pub use war_test_utils::builders;
pub use war_test_utils::{init_tracing, with_timeout};

use std::path::PathBuf;
use std::sync::Arc;

use war::fs::mock::MockFileSystem;
use war::fs::FileSystem;

/// Root used by tests that run on the in-memory filesystem.
pub const MOCK_ROOT: &str = "/w";

pub fn mock_path(rel: &str) -> PathBuf {
    if rel.is_empty() {
        PathBuf::from(MOCK_ROOT)
    } else {
        PathBuf::from(MOCK_ROOT).join(rel)
    }
}

/// A mock filesystem with an empty root directory, plus the trait-object
/// handle the watch tree wants.
pub fn mock_fs() -> (MockFileSystem, Arc<dyn FileSystem>) {
    let fs = MockFileSystem::new();
    fs.add_dir(MOCK_ROOT);
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    (fs, shared)
}
