//! Shared testing utilities: structure and report fixtures, stub tool scripts.

pub mod fixtures;
pub mod tools;

pub use tempfile::TempDir;

/// Fresh scratch directory, removed on drop.
pub fn workspace() -> TempDir {
    tempfile::Builder::new()
        .prefix("ferrodock-test-")
        .tempdir()
        .expect("failed to create temp workspace")
}
