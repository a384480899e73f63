//! Ferrodock Molecules - single-target docking pipeline.
//!
//! This crate turns a structure identifier into a ranked set of docked poses:
//! 1. Fetching the protein structure (RCSB PDB or a local directory)
//! 2. Preparing receptor and reference ligand (PyMOL, Open Babel)
//! 3. Computing the search box around the reference ligand
//! 4. Molecular docking (AutoDock Vina)
//! 5. Parsing the pose table from the docking report

pub mod error;
pub mod structure;
pub mod gridbox;
pub mod stage;
pub mod pdb;
pub mod prepare;
pub mod docking;
pub mod toolchain;
pub mod report;
pub mod pipeline;

pub use error::{DockError, Result};
pub use gridbox::SearchBox;
pub use pipeline::{DockingOutcome, DockingPipeline, PipelineFailure, PipelineRun, PipelineStage, PipelineState};
pub use report::PoseRecord;
pub use structure::{AtomCoordinate, ResidueSelector};
