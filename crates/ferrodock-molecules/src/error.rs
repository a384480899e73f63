//! Docking pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DockError>;

#[derive(Debug, Error)]
pub enum DockError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not acquire structure {id}: {reason}")]
    AcquisitionFailed { id: String, reason: String },

    #[error("No atoms found for residue {residue}{}", chain_suffix(.chain))]
    SelectionNotFound { residue: String, chain: Option<char> },

    #[error("Residue {residue} occurs in chains {}; a chain selector is required", join_chains(.chains))]
    AmbiguousSelection { residue: String, chains: Vec<char> },

    #[error("Cannot compute a search box from an empty coordinate set")]
    EmptyCoordinateSet,

    #[error("Search box has non-positive size {size} on the {axis} axis")]
    DegenerateSearchBox { axis: char, size: f64 },

    #[error("{stage} exited with {}: {stderr}", exit_label(.exit_status))]
    ExternalToolFailed {
        stage: String,
        exit_status: Option<i32>,
        stderr: String,
    },

    #[error("{stage} finished but did not produce {}", .path.display())]
    MissingExpectedOutput { stage: String, path: PathBuf },

    #[error("Docking report is unparsable: {0}")]
    UnparsableReport(String),

    #[error("Docking report lists {found} poses, {requested} were requested")]
    IncompletePoseCount { requested: u32, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DockError {
    /// Whether the error must stop the run. Only a short pose table is tolerated.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DockError::IncompletePoseCount { .. })
    }
}

impl From<ferrodock_config::ConfigError> for DockError {
    fn from(err: ferrodock_config::ConfigError) -> Self {
        match err {
            ferrodock_config::ConfigError::Invalid(msg) => DockError::InvalidConfig(msg),
            other => DockError::InvalidConfig(other.to_string()),
        }
    }
}

fn chain_suffix(chain: &Option<char>) -> String {
    chain.map(|c| format!(" in chain {c}")).unwrap_or_default()
}

fn join_chains(chains: &[char]) -> String {
    chains.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no exit status".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = DockError::SelectionNotFound { residue: "BTN".into(), chain: Some('B') };
        assert_eq!(err.to_string(), "No atoms found for residue BTN in chain B");

        let err = DockError::AmbiguousSelection { residue: "BTN".into(), chains: vec!['A', 'B'] };
        assert_eq!(err.to_string(), "Residue BTN occurs in chains A, B; a chain selector is required");

        let err = DockError::ExternalToolFailed { stage: "docking (vina)".into(), exit_status: None, stderr: "killed".into() };
        assert_eq!(err.to_string(), "docking (vina) exited with no exit status: killed");
    }

    #[test]
    fn test_only_short_pose_table_is_tolerated() {
        assert!(!DockError::IncompletePoseCount { requested: 9, found: 4 }.is_fatal());
        assert!(DockError::EmptyCoordinateSet.is_fatal());
        assert!(DockError::UnparsableReport("empty".into()).is_fatal());
    }

    #[test]
    fn test_config_error_keeps_message() {
        let err: DockError = ferrodock_config::ConfigError::Invalid("search.num_modes must be >= 1".into()).into();
        assert_eq!(err.to_string(), "Invalid configuration: search.num_modes must be >= 1");
    }
}
