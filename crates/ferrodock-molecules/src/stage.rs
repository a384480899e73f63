//! External tool execution.
//!
//! Every external step of the pipeline is described by a [`CommandSpec`] and
//! executed through a [`StageRunner`]. A step succeeds only if the process
//! exits successfully *and* each declared output exists and is non-empty;
//! some tools exit 0 after writing nothing.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{DockError, Result};

/// A file written before the process is launched (e.g. a tool script).
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// One invocation of an external tool.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    /// Human-readable step name used in logs and errors.
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
    pub staged_files: Vec<StagedFile>,
    /// Standard output followed by standard error is written here.
    pub capture_output: Option<PathBuf>,
    pub expected_outputs: Vec<PathBuf>,
}

impl CommandSpec {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            staged_files: Vec::new(),
            capture_output: None,
            expected_outputs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn stage_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.staged_files.push(StagedFile {
            path: path.into(),
            contents: contents.into(),
        });
        self
    }

    pub fn capture_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.capture_output = Some(path.into());
        self
    }

    pub fn expect_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.expected_outputs.push(path.into());
        self
    }

    /// Shell-like rendering for logs. Not meant to be re-parsed.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Executes a [`CommandSpec`] and returns its validated outputs.
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<Vec<PathBuf>>;
}

/// Runs commands as child processes, one at a time.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StageRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<Vec<PathBuf>> {
        info!(stage = %spec.label, "Running: {}", spec.display_command());

        for staged in &spec.staged_files {
            debug!("Writing {:?} for {}", staged.path, spec.label);
            tokio::fs::write(&staged.path, &staged.contents).await?;
        }

        let mut command = Command::new(&spec.program);
        command.args(&spec.args).kill_on_drop(true);
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let output = match command.output().await {
            Ok(output) => output,
            Err(e) => {
                return Err(DockError::ExternalToolFailed {
                    stage: spec.label.clone(),
                    exit_status: None,
                    stderr: format!("failed to launch {}: {}", spec.program.display(), e),
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        // The log is kept even when the tool fails.
        if let Some(capture) = &spec.capture_output {
            let mut combined = output.stdout.clone();
            combined.extend_from_slice(&output.stderr);
            tokio::fs::write(capture, combined).await?;
        }

        if !output.status.success() {
            warn!(stage = %spec.label, status = ?output.status.code(), "External tool failed");
            return Err(DockError::ExternalToolFailed {
                stage: spec.label.clone(),
                exit_status: output.status.code(),
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            debug!(stage = %spec.label, "stderr: {}", stderr.trim());
        }

        verify_outputs(&spec.label, &spec.expected_outputs).await?;

        debug!("{} completed successfully", spec.label);
        Ok(spec.expected_outputs.clone())
    }
}

/// Every path must exist and be non-empty.
pub async fn verify_outputs(stage: &str, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if !is_non_empty_file(path).await {
            return Err(DockError::MissingExpectedOutput {
                stage: stage.to_string(),
                path: path.clone(),
            });
        }
    }
    Ok(())
}

async fn is_non_empty_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(label: &str, script: &str) -> CommandSpec {
        CommandSpec::new(label, "/bin/sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn test_success_with_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let spec = sh("writer", "echo hello > out.txt")
            .current_dir(dir.path())
            .expect_output(&out);

        let outputs = ProcessRunner::new().run(&spec).await.unwrap();
        assert_eq!(outputs, vec![out]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_captures_stderr() {
        let spec = sh("converter", "echo 'bad input' >&2; exit 3");
        let err = ProcessRunner::new().run(&spec).await.unwrap_err();
        match err {
            DockError::ExternalToolFailed { stage, exit_status, stderr } => {
                assert_eq!(stage, "converter");
                assert_eq!(exit_status, Some(3));
                assert!(stderr.contains("bad input"));
            }
            other => panic!("expected ExternalToolFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exit_zero_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never.pdbqt");
        let spec = sh("lazy tool", "exit 0").expect_output(&missing);

        let err = ProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, DockError::MissingExpectedOutput { ref path, .. } if *path == missing));
    }

    #[tokio::test]
    async fn test_empty_output_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.pdbqt");
        let spec = sh("truncating tool", "touch empty.pdbqt")
            .current_dir(dir.path())
            .expect_output(&empty);

        let err = ProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, DockError::MissingExpectedOutput { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let spec = CommandSpec::new("docking", "/nonexistent/ferrodock-vina");
        let err = ProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, DockError::ExternalToolFailed { exit_status: None, .. }));
    }

    #[tokio::test]
    async fn test_capture_and_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("job.sh");
        let log = dir.path().join("log.txt");
        let spec = CommandSpec::new("scripted", "/bin/sh")
            .arg(&script)
            .stage_file(&script, "echo to-stdout\necho to-stderr >&2\n")
            .capture_to(&log)
            .expect_output(&log);

        ProcessRunner::new().run(&spec).await.unwrap();
        let text = std::fs::read_to_string(&log).unwrap();
        assert_eq!(text, "to-stdout\nto-stderr\n");
    }

    #[tokio::test]
    async fn test_capture_written_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log.txt");
        let spec = sh("failing", "echo partial; exit 1").capture_to(&log);

        assert!(ProcessRunner::new().run(&spec).await.is_err());
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "partial\n");
    }

    #[test]
    fn test_display_command() {
        let spec = CommandSpec::new("conv", "obabel").args(["in.pdb", "-O", "out.pdbqt", "-xr"]);
        assert_eq!(spec.display_command(), "obabel in.pdb -O out.pdbqt -xr");
    }
}
