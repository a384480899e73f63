//! Molecular docking using AutoDock Vina.

use std::path::{Path, PathBuf};

use crate::gridbox::SearchBox;
use crate::stage::CommandSpec;

/// Inputs and outputs of a docking run.
#[derive(Debug, Clone)]
pub struct DockingConfig {
    pub receptor: PathBuf,
    pub ligand: PathBuf,
    pub search_box: SearchBox,
    pub exhaustiveness: u32,
    pub num_modes: u32,
    pub seed: Option<i64>,
    pub cpu: Option<u32>,
    /// Pose file written by Vina (`--out`).
    pub out: PathBuf,
    /// Captured console output; Vina 1.2.7 dropped `--log`.
    pub report: PathBuf,
}

/// Builds AutoDock Vina invocations.
#[derive(Debug, Clone)]
pub struct VinaDocking {
    executable_path: PathBuf,
}

impl VinaDocking {
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    /// Box values are passed at full precision.
    pub fn command(&self, config: &DockingConfig) -> CommandSpec {
        let [center_x, center_y, center_z] = config.search_box.center;
        let [size_x, size_y, size_z] = config.search_box.size;

        let mut spec = CommandSpec::new("docking (vina)", &self.executable_path)
            .arg("--receptor")
            .arg(&config.receptor)
            .arg("--ligand")
            .arg(&config.ligand)
            .arg("--center_x")
            .arg(center_x.to_string())
            .arg("--center_y")
            .arg(center_y.to_string())
            .arg("--center_z")
            .arg(center_z.to_string())
            .arg("--size_x")
            .arg(size_x.to_string())
            .arg("--size_y")
            .arg(size_y.to_string())
            .arg("--size_z")
            .arg(size_z.to_string())
            .arg("--exhaustiveness")
            .arg(config.exhaustiveness.to_string())
            .arg("--num_modes")
            .arg(config.num_modes.to_string());

        if let Some(seed) = config.seed {
            spec = spec.arg("--seed").arg(seed.to_string());
        }
        if let Some(cpu) = config.cpu {
            spec = spec.arg("--cpu").arg(cpu.to_string());
        }

        spec.arg("--out")
            .arg(&config.out)
            .capture_to(&config.report)
            .expect_output(&config.out)
            .expect_output(&config.report)
    }
}
