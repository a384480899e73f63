//! Configuration loading for Ferrodock.
//! Reads ferrodock.toml from the current directory or the path in FERRODOCK_CONFIG.
//!
//! Every section and field has a default, so an empty file reproduces the
//! reference run: streptavidin (1stp) chain A docked against its biotin (BTN).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV_VAR: &str = "FERRODOCK_CONFIG";

/// Config file read when `FERRODOCK_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "ferrodock.toml";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub preparation: PreparationConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Which structure to fetch and which residue is the reference ligand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Structure identifier in the remote database (e.g. "1stp").
    #[serde(default = "default_pdb_id")]
    pub pdb_id: String,

    /// Receptor chain.
    #[serde(default = "default_chain")]
    pub chain: char,

    /// Three-letter residue name of the reference ligand.
    #[serde(default = "default_ligand_resn")]
    pub ligand_resn: String,

    /// Chain holding the reference ligand. Falls back to `chain`.
    #[serde(default)]
    pub ligand_chain: Option<char>,
}

fn default_pdb_id()      -> String { "1stp".to_string() }
fn default_chain()       -> char   { 'A' }
fn default_ligand_resn() -> String { "BTN".to_string() }

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            pdb_id: default_pdb_id(),
            chain: default_chain(),
            ligand_resn: default_ligand_resn(),
            ligand_chain: None,
        }
    }
}

impl TargetConfig {
    /// Chain used to select the reference ligand.
    pub fn ligand_chain(&self) -> char {
        self.ligand_chain.unwrap_or(self.chain)
    }
}

/// Search box and docking engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Extra space added on each side of the ligand, in ångström.
    #[serde(default = "default_padding")]
    pub padding: f64,

    #[serde(default = "default_exhaustiveness")]
    pub exhaustiveness: u32,

    /// Number of poses requested from the engine.
    #[serde(default = "default_num_modes")]
    pub num_modes: u32,

    #[serde(default)]
    pub seed: Option<i64>,

    #[serde(default)]
    pub cpu: Option<u32>,
}

fn default_padding()        -> f64 { 10.0 }
fn default_exhaustiveness() -> u32 { 8 }
fn default_num_modes()      -> u32 { 9 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            exhaustiveness: default_exhaustiveness(),
            num_modes: default_num_modes(),
            seed: None,
            cpu: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparationConfig {
    #[serde(default = "bool_true")]
    pub remove_waters: bool,

    #[serde(default = "bool_true")]
    pub add_hydrogens: bool,

    /// Protonation pH used when converting the ligand.
    #[serde(default = "default_ligand_ph")]
    pub ligand_ph: f64,
}

fn bool_true()         -> bool { true }
fn default_ligand_ph() -> f64  { 7.4 }

impl Default for PreparationConfig {
    fn default() -> Self {
        Self {
            remove_waters: true,
            add_hydrogens: true,
            ligand_ph: default_ligand_ph(),
        }
    }
}

/// Executables for the three external tools. Bare names are resolved via PATH.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_pymol")]
    pub pymol: PathBuf,
    #[serde(default = "default_obabel")]
    pub obabel: PathBuf,
    #[serde(default = "default_vina")]
    pub vina: PathBuf,
}

fn default_pymol()  -> PathBuf { PathBuf::from("pymol") }
fn default_obabel() -> PathBuf { PathBuf::from("obabel") }

fn default_vina() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("vina.exe")
    } else {
        PathBuf::from("vina")
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pymol: default_pymol(),
            obabel: default_obabel(),
            vina: default_vina(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory all artifacts are written to.
    #[serde(default = "default_workspace_path")]
    pub path: PathBuf,

    /// Prepended to every artifact file name. Runs sharing a directory need distinct prefixes.
    #[serde(default)]
    pub artifact_prefix: String,

    /// Read `<pdb_id>.pdb` from this directory instead of downloading it.
    #[serde(default)]
    pub structure_dir: Option<PathBuf>,
}

fn default_workspace_path() -> PathBuf { PathBuf::from("./workspace") }

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            path: default_workspace_path(),
            artifact_prefix: String::new(),
            structure_dir: None,
        }
    }
}

mod tests;

// ── Loading ───────────────────────────────────────────────────────────────────

impl Config {
    /// Load configuration from ferrodock.toml.
    /// Checks FERRODOCK_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        let target = &self.target;
        let id = target.pdb_id.trim();
        if id.is_empty() {
            return Err(ConfigError::Invalid("target.pdb_id must not be empty".into()));
        }
        if id.len() != target.pdb_id.len()
            || id == "."
            || id == ".."
            || id.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(ConfigError::Invalid(format!(
                "target.pdb_id {:?} cannot be used as a file name",
                target.pdb_id
            )));
        }

        for (field, chain) in [("target.chain", Some(target.chain)), ("target.ligand_chain", target.ligand_chain)] {
            if let Some(c) = chain {
                if !c.is_ascii_alphanumeric() {
                    return Err(ConfigError::Invalid(format!(
                        "{field} must be a single alphanumeric character, got {c:?}"
                    )));
                }
            }
        }

        let resn = &target.ligand_resn;
        if resn.is_empty() || resn.len() > 3 || !resn.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid(format!(
                "target.ligand_resn must be 1-3 alphanumeric characters, got {resn:?}"
            )));
        }

        let search = &self.search;
        if !search.padding.is_finite() || search.padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "search.padding must be a finite value >= 0, got {}",
                search.padding
            )));
        }
        if search.exhaustiveness == 0 {
            return Err(ConfigError::Invalid("search.exhaustiveness must be >= 1".into()));
        }
        if search.num_modes == 0 {
            return Err(ConfigError::Invalid("search.num_modes must be >= 1".into()));
        }
        if search.cpu == Some(0) {
            return Err(ConfigError::Invalid("search.cpu must be >= 1 when set".into()));
        }

        let ph = self.preparation.ligand_ph;
        if !ph.is_finite() || !(0.0..=14.0).contains(&ph) {
            return Err(ConfigError::Invalid(format!(
                "preparation.ligand_ph must be within 0-14, got {ph}"
            )));
        }

        Ok(())
    }
}
