//! Pose table parsing for docking reports.
//!
//! Vina prints its results as
//!
//! ```text
//! mode |   affinity | dist from best mode
//!      | (kcal/mol) | rmsd l.b.| rmsd u.b.
//! -----+------------+----------+----------
//!    1       -7.109          0          0
//!    2       -6.153      1.927      2.876
//! ```
//!
//! surrounded by banner and progress output. Only the rows matter: a mode
//! index followed by an affinity, optionally followed by the two RMSD columns.
//! Column widths are not assumed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DockError, Result};

/// Row of the pose table: mode, affinity, then optional RMSD l.b./u.b.
fn pose_row_regex() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(\d+)\s+([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)(?:\s+([-+]?\d*\.?\d+))?(?:\s+([-+]?\d*\.?\d+))?\s*$",
        )
        .unwrap()
    })
}

/// One docked pose as ranked by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// 1-based rank, best first.
    pub mode: u32,
    /// kcal/mol; more negative binds tighter.
    pub affinity: f64,
    /// RMSD lower bound from the best mode, when reported.
    pub rmsd_lb: Option<f64>,
    /// RMSD upper bound from the best mode, when reported.
    pub rmsd_ub: Option<f64>,
}

impl PoseRecord {
    pub fn new(mode: u32, affinity: f64) -> Self {
        Self {
            mode,
            affinity,
            rmsd_lb: None,
            rmsd_ub: None,
        }
    }
}

/// Extract the pose table from report text.
///
/// The table is the first run of rows numbered 1, 2, 3, ...; the first line
/// that is neither blank nor the next row closes it.
pub fn parse_report(text: &str) -> Result<Vec<PoseRecord>> {
    let mut poses: Vec<PoseRecord> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line) {
            Some(pose) if pose.mode as usize == poses.len() + 1 => poses.push(pose),
            _ if !poses.is_empty() => break,
            _ => {}
        }
    }

    if poses.is_empty() {
        return Err(DockError::UnparsableReport(
            "no pose table (mode, affinity rows starting at mode 1) found".to_string(),
        ));
    }
    Ok(poses)
}

/// Read and parse a report artifact. Invalid UTF-8 is replaced, not rejected.
pub async fn read_report(path: &Path) -> Result<Vec<PoseRecord>> {
    let bytes = tokio::fs::read(path).await?;
    parse_report(&String::from_utf8_lossy(&bytes))
}

/// Fewer poses than requested is reported, not fatal.
pub fn check_pose_count(poses: &[PoseRecord], requested: u32) -> Result<()> {
    if poses.len() < requested as usize {
        return Err(DockError::IncompletePoseCount {
            requested,
            found: poses.len(),
        });
    }
    Ok(())
}

fn parse_row(line: &str) -> Option<PoseRecord> {
    let caps = pose_row_regex().captures(line)?;
    let mode: u32 = caps[1].parse().ok()?;
    let affinity: f64 = caps[2].parse().ok()?;
    let column = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
    Some(PoseRecord {
        mode,
        affinity,
        rmsd_lb: column(3),
        rmsd_ub: column(4),
    })
}
