//! Which external tools prepare the inputs and run the docking search.
//!
//! The orchestrator never names a binary: it asks a [`Toolchain`] for the
//! command specs of each stage and hands them to a
//! [`StageRunner`](crate::stage::StageRunner).

use std::path::Path;

use ferrodock_config::Config;

use crate::docking::{DockingConfig, VinaDocking};
use crate::prepare::{ObabelConverter, PymolPreparer};
use crate::stage::CommandSpec;
use crate::structure::ResidueSelector;

/// Receptor preparation: `structure` → `selection` (PDB) → `output` (PDBQT).
#[derive(Debug, Clone, Copy)]
pub struct ReceptorJob<'a> {
    pub structure: &'a Path,
    pub chain: char,
    pub selection: &'a Path,
    pub output: &'a Path,
}

/// Ligand preparation: `structure` → `reference` (PDB) → `output` (PDBQT).
///
/// `reference` keeps the crystal coordinates used for the search box.
#[derive(Debug, Clone, Copy)]
pub struct LigandJob<'a> {
    pub structure: &'a Path,
    pub selector: &'a ResidueSelector,
    pub reference: &'a Path,
    pub output: &'a Path,
}

pub trait Toolchain: Send + Sync {
    /// Commands run in order; together they must produce `job.output`.
    fn prepare_receptor(&self, job: &ReceptorJob<'_>) -> Vec<CommandSpec>;

    /// Commands run in order; together they must produce `job.reference` and `job.output`.
    fn prepare_ligand(&self, job: &LigandJob<'_>) -> Vec<CommandSpec>;

    /// Must produce `config.out` and `config.report`.
    fn dock(&self, config: &DockingConfig) -> CommandSpec;
}

/// PyMOL + Open Babel + AutoDock Vina.
#[derive(Debug, Clone)]
pub struct ExternalToolchain {
    pymol: PymolPreparer,
    obabel: ObabelConverter,
    vina: VinaDocking,
}

impl ExternalToolchain {
    pub fn new(pymol: PymolPreparer, obabel: ObabelConverter, vina: VinaDocking) -> Self {
        Self { pymol, obabel, vina }
    }

    pub fn from_config(config: &Config) -> Self {
        let prep = &config.preparation;
        Self {
            pymol: PymolPreparer::new(&config.tools.pymol)
                .remove_waters(prep.remove_waters)
                .add_hydrogens(prep.add_hydrogens),
            obabel: ObabelConverter::new(&config.tools.obabel, prep.ligand_ph),
            vina: VinaDocking::new(&config.tools.vina),
        }
    }
}

impl Toolchain for ExternalToolchain {
    fn prepare_receptor(&self, job: &ReceptorJob<'_>) -> Vec<CommandSpec> {
        vec![
            self.pymol.receptor_command(job.structure, job.chain, job.selection),
            self.obabel.receptor_command(job.selection, job.output),
        ]
    }

    fn prepare_ligand(&self, job: &LigandJob<'_>) -> Vec<CommandSpec> {
        vec![
            self.pymol.ligand_command(job.structure, job.selector, job.reference),
            self.obabel.ligand_command(job.reference, job.output),
        ]
    }

    fn dock(&self, config: &DockingConfig) -> CommandSpec {
        self.vina.command(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tool_paths_follow_config() {
        let mut config = Config::default();
        config.tools.pymol = PathBuf::from("/opt/pymol/bin/pymol");
        config.tools.obabel = PathBuf::from("/usr/local/bin/obabel");
        config.preparation.ligand_ph = 6.5;

        let toolchain = ExternalToolchain::from_config(&config);
        let selector = ResidueSelector::new("BTN", Some('A'));
        let steps = toolchain.prepare_ligand(&LigandJob {
            structure: Path::new("1stp.pdb"),
            selector: &selector,
            reference: Path::new("ligand_ref.pdb"),
            output: Path::new("ligand.pdbqt"),
        });

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].program, PathBuf::from("/opt/pymol/bin/pymol"));
        assert_eq!(
            steps[1].display_command(),
            "/usr/local/bin/obabel ligand_ref.pdb -O ligand.pdbqt -h -p 6.5"
        );
    }

    #[test]
    fn test_receptor_steps_chain_through_selection() {
        let toolchain = ExternalToolchain::from_config(&Config::default());
        let steps = toolchain.prepare_receptor(&ReceptorJob {
            structure: Path::new("1stp.pdb"),
            chain: 'A',
            selection: Path::new("receptor.pdb"),
            output: Path::new("receptor.pdbqt"),
        });

        assert_eq!(steps[0].expected_outputs, vec![PathBuf::from("receptor.pdb")]);
        assert_eq!(steps[1].args[0], std::ffi::OsString::from("receptor.pdb"));
        assert_eq!(steps[1].expected_outputs, vec![PathBuf::from("receptor.pdbqt")]);
    }
}
