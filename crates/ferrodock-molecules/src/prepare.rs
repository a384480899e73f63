//! Receptor and ligand preparation with PyMOL and Open Babel.
//!
//! PyMOL runs headless on a generated `.pml` script that isolates the
//! receptor chain or the reference ligand and adds hydrogens. Open Babel then
//! converts the resulting PDB files to PDBQT.

use std::path::{Path, PathBuf};

use crate::stage::CommandSpec;
use crate::structure::ResidueSelector;

/// Builds PyMOL selection/cleanup invocations.
#[derive(Debug, Clone)]
pub struct PymolPreparer {
    executable_path: PathBuf,
    remove_waters: bool,
    add_hydrogens: bool,
}

impl PymolPreparer {
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
            remove_waters: true,
            add_hydrogens: true,
        }
    }

    pub fn remove_waters(mut self, yes: bool) -> Self {
        self.remove_waters = yes;
        self
    }

    pub fn add_hydrogens(mut self, yes: bool) -> Self {
        self.add_hydrogens = yes;
        self
    }

    /// Save the polymer of `chain` to `output`.
    pub fn receptor_command(&self, structure: &Path, chain: char, output: &Path) -> CommandSpec {
        let selection = format!("chain {chain} and polymer");
        self.command("receptor selection (pymol)", structure, &selection, output)
    }

    /// Save the atoms of the reference ligand to `output`.
    pub fn ligand_command(&self, structure: &Path, selector: &ResidueSelector, output: &Path) -> CommandSpec {
        let selection = match selector.chain {
            Some(chain) => format!("resn {} and chain {}", selector.name, chain),
            None => format!("resn {}", selector.name),
        };
        self.command("ligand selection (pymol)", structure, &selection, output)
    }

    fn command(&self, label: &str, structure: &Path, selection: &str, output: &Path) -> CommandSpec {
        let script_path = output.with_extension("pml");
        let script = self.script(structure, selection, output);

        // No working directory: script and structure paths are relative to the caller's.
        CommandSpec::new(label, &self.executable_path)
            .args(["-c", "-q"])
            .arg(&script_path)
            .stage_file(&script_path, script)
            .expect_output(output)
    }

    /// Waters go before hydrogens are added, otherwise they get protonated too.
    fn script(&self, structure: &Path, selection: &str, output: &Path) -> String {
        let mut lines = vec![format!("load {}, structure", structure.display())];
        if self.remove_waters {
            lines.push("remove resn HOH".to_string());
        }
        if self.add_hydrogens {
            lines.push("h_add".to_string());
        }
        lines.push(format!("save {}, structure and ({})", output.display(), selection));
        lines.push("quit".to_string());
        lines.join("\n") + "\n"
    }
}

/// Builds Open Babel PDB → PDBQT conversions.
#[derive(Debug, Clone)]
pub struct ObabelConverter {
    executable_path: PathBuf,
    ligand_ph: f64,
}

impl ObabelConverter {
    pub fn new<P: AsRef<Path>>(executable_path: P, ligand_ph: f64) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
            ligand_ph,
        }
    }

    /// Rigid receptor: every rotatable bond locked (`-xr`).
    pub fn receptor_command(&self, input: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new("receptor conversion (obabel)", &self.executable_path)
            .arg(input)
            .arg("-O")
            .arg(output)
            .arg("-xr")
            .expect_output(output)
    }

    /// Ligand with hydrogens at the configured pH.
    pub fn ligand_command(&self, input: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new("ligand conversion (obabel)", &self.executable_path)
            .arg(input)
            .arg("-O")
            .arg(output)
            .arg("-h")
            .arg("-p")
            .arg(self.ligand_ph.to_string())
            .expect_output(output)
    }
}
