//! Presentation of a finished docking run.

use serde::Serialize;
use std::fmt::Write;
use uuid::Uuid;

use ferrodock_config::Config;
use ferrodock_molecules::pipeline::ArtifactSummary;
use ferrodock_molecules::{DockingOutcome, PoseRecord, SearchBox};

/// Machine-readable result, printed when `FERRODOCK_OUTPUT=json`.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub run_id: Uuid,
    pub pdb_id: &'a str,
    pub chain: char,
    pub ligand: &'a str,
    pub search_box: &'a SearchBox,
    pub poses: &'a [PoseRecord],
    pub warnings: Vec<String>,
    pub artifacts: &'a [ArtifactSummary],
}

impl<'a> RunSummary<'a> {
    pub fn new(config: &'a Config, outcome: &'a DockingOutcome, artifacts: &'a [ArtifactSummary]) -> Self {
        Self {
            run_id: outcome.run_id,
            pdb_id: &config.target.pdb_id,
            chain: config.target.chain,
            ligand: &config.target.ligand_resn,
            search_box: &outcome.search_box,
            poses: &outcome.poses,
            warnings: outcome.warnings.iter().map(|w| w.to_string()).collect(),
            artifacts,
        }
    }
}

pub fn pose_table(poses: &[PoseRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "mode |   affinity | rmsd l.b. | rmsd u.b.");
    let _ = writeln!(out, "     | (kcal/mol) |           |");
    let _ = writeln!(out, "-----+------------+-----------+----------");
    for pose in poses {
        let _ = writeln!(
            out,
            "{:>4} | {:>10.3} | {:>9} | {:>9}",
            pose.mode,
            pose.affinity,
            rmsd(pose.rmsd_lb),
            rmsd(pose.rmsd_ub),
        );
    }
    out
}

pub fn artifact_list(artifacts: &[ArtifactSummary]) -> String {
    let mut out = String::new();
    for artifact in artifacts {
        let size = match artifact.bytes {
            Some(bytes) => format!("{bytes} bytes"),
            None => "missing".to_string(),
        };
        let _ = writeln!(out, "  {} ({})", artifact.path.display(), size);
    }
    out
}

fn rmsd(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrodock_molecules::pipeline::ArtifactKind;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_pose_table() {
        let mut second = PoseRecord::new(2, -6.153);
        second.rmsd_lb = Some(1.927);
        second.rmsd_ub = Some(2.876);
        let table = pose_table(&[PoseRecord::new(1, -7.109), second]);

        let rows: Vec<&str> = table.lines().skip(3).collect();
        assert_eq!(
            rows,
            vec![
                "   1 |     -7.109 |         - |         -",
                "   2 |     -6.153 |     1.927 |     2.876",
            ]
        );
    }

    #[test]
    fn test_artifact_list() {
        let artifacts = vec![
            ArtifactSummary {
                kind: ArtifactKind::Receptor,
                path: PathBuf::from("workspace/receptor.pdbqt"),
                bytes: Some(1024),
            },
            ArtifactSummary {
                kind: ArtifactKind::Report,
                path: PathBuf::from("workspace/result_log.txt"),
                bytes: None,
            },
        ];
        assert_eq!(
            artifact_list(&artifacts),
            "  workspace/receptor.pdbqt (1024 bytes)\n  workspace/result_log.txt (missing)\n"
        );
    }
}
