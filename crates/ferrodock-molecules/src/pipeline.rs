//! Orchestrator for the docking pipeline.
//!
//! Runs a fixed, linear sequence of stages:
//!   1. Acquire the structure file
//!   2. Prepare the receptor (chain isolation, hydrogens, PDBQT)
//!   3. Prepare the reference ligand (selection, hydrogens, PDBQT)
//!   4. Compute the search box from the ligand's crystal coordinates
//!   5. Dock with the configured engine
//!   6. Parse the engine's report into pose records
//!
//! Any fatal error moves the run to `Failed` and nothing after it executes.
//! Artifacts already written stay on disk for inspection; a rerun with the
//! same workspace and prefix overwrites them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use ferrodock_config::Config;

use crate::docking::DockingConfig;
use crate::error::{DockError, Result};
use crate::gridbox::SearchBox;
use crate::pdb::{LocalStructureSource, RcsbFetcher, StructureSource};
use crate::report::{check_pose_count, read_report, PoseRecord};
use crate::stage::{verify_outputs, CommandSpec, ProcessRunner, StageRunner};
use crate::structure::{extract_ligand_coordinates, ResidueSelector};
use crate::toolchain::{ExternalToolchain, LigandJob, ReceptorJob, Toolchain};

// ── Stages and states ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Acquisition,
    ReceptorPreparation,
    LigandPreparation,
    BoxCalculation,
    Docking,
    ResultParsing,
}

impl PipelineStage {
    pub fn state(self) -> PipelineState {
        match self {
            PipelineStage::Acquisition => PipelineState::Acquiring,
            PipelineStage::ReceptorPreparation => PipelineState::PreparingReceptor,
            PipelineStage::LigandPreparation => PipelineState::PreparingLigand,
            PipelineStage::BoxCalculation => PipelineState::ComputingBox,
            PipelineStage::Docking => PipelineState::Docking,
            PipelineStage::ResultParsing => PipelineState::ParsingResults,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Acquisition => "acquisition",
            PipelineStage::ReceptorPreparation => "receptor preparation",
            PipelineStage::LigandPreparation => "ligand preparation",
            PipelineStage::BoxCalculation => "box calculation",
            PipelineStage::Docking => "docking",
            PipelineStage::ResultParsing => "result parsing",
        };
        f.write_str(name)
    }
}

/// `Pending → Acquiring → … → ParsingResults → Done`, or `Failed` from any
/// non-terminal state. There is no way back out of `Done` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    Acquiring,
    PreparingReceptor,
    PreparingLigand,
    ComputingBox,
    Docking,
    ParsingResults,
    Done,
    Failed { stage: PipelineStage, cause: String },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }

    /// The stage being executed in this state, if any.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineState::Acquiring => Some(PipelineStage::Acquisition),
            PipelineState::PreparingReceptor => Some(PipelineStage::ReceptorPreparation),
            PipelineState::PreparingLigand => Some(PipelineStage::LigandPreparation),
            PipelineState::ComputingBox => Some(PipelineStage::BoxCalculation),
            PipelineState::Docking => Some(PipelineStage::Docking),
            PipelineState::ParsingResults => Some(PipelineStage::ResultParsing),
            PipelineState::Failed { stage, .. } => Some(*stage),
            PipelineState::Pending | PipelineState::Done => None,
        }
    }
}

// ── Artifacts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Structure,
    ReceptorSelection,
    Receptor,
    LigandReference,
    Ligand,
    Poses,
    Report,
    /// Any other file a toolchain declared.
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

/// Artifact path plus its size on disk, for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub bytes: Option<u64>,
}

/// File names of one run inside its workspace directory.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    dir: PathBuf,
    prefix: String,
}

impl ArtifactLayout {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, name))
    }

    pub fn structure(&self, id: &str) -> PathBuf {
        self.file(&format!("{id}.pdb"))
    }

    pub fn receptor_selection(&self) -> PathBuf {
        self.file("receptor.pdb")
    }

    pub fn receptor(&self) -> PathBuf {
        self.file("receptor.pdbqt")
    }

    pub fn ligand_reference(&self) -> PathBuf {
        self.file("ligand_ref.pdb")
    }

    pub fn ligand(&self) -> PathBuf {
        self.file("ligand.pdbqt")
    }

    pub fn poses(&self) -> PathBuf {
        self.file("result.pdbqt")
    }

    pub fn report(&self) -> PathBuf {
        self.file("result_log.txt")
    }

    /// Fixed path of `kind`; the structure file is named after its identifier.
    pub fn path(&self, kind: ArtifactKind) -> Option<PathBuf> {
        match kind {
            ArtifactKind::ReceptorSelection => Some(self.receptor_selection()),
            ArtifactKind::Receptor => Some(self.receptor()),
            ArtifactKind::LigandReference => Some(self.ligand_reference()),
            ArtifactKind::Ligand => Some(self.ligand()),
            ArtifactKind::Poses => Some(self.poses()),
            ArtifactKind::Report => Some(self.report()),
            ArtifactKind::Structure | ArtifactKind::Intermediate => None,
        }
    }

    fn classify(&self, path: &Path) -> ArtifactKind {
        [
            ArtifactKind::ReceptorSelection,
            ArtifactKind::Receptor,
            ArtifactKind::LigandReference,
            ArtifactKind::Ligand,
            ArtifactKind::Poses,
            ArtifactKind::Report,
        ]
        .into_iter()
        .find(|kind| self.path(*kind).as_deref() == Some(path))
        .unwrap_or(ArtifactKind::Intermediate)
    }
}

// ── Progress events ───────────────────────────────────────────────────────────

/// Emitted on every state transition (cloneable for broadcast).
#[derive(Debug, Clone, Serialize)]
pub struct PipelineProgress {
    pub run_id: Uuid,
    pub state: PipelineState,
    pub message: String,
    pub at: DateTime<Utc>,
}

// ── Results ───────────────────────────────────────────────────────────────────

/// A run that reached `Done`.
#[derive(Debug)]
pub struct DockingOutcome {
    pub run_id: Uuid,
    pub search_box: SearchBox,
    /// Ascending by mode.
    pub poses: Vec<PoseRecord>,
    /// Non-fatal problems, e.g. fewer poses than requested.
    pub warnings: Vec<DockError>,
    pub artifacts: Vec<PipelineArtifact>,
}

impl DockingOutcome {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Path> {
        self.artifacts.iter().find(|a| a.kind == kind).map(|a| a.path.as_path())
    }

    pub fn best_pose(&self) -> Option<&PoseRecord> {
        self.poses.first()
    }

    /// Receptor, ligand, poses and report with their sizes.
    pub async fn artifact_summaries(&self) -> Vec<ArtifactSummary> {
        let mut summaries = Vec::new();
        for kind in [ArtifactKind::Receptor, ArtifactKind::Ligand, ArtifactKind::Poses, ArtifactKind::Report] {
            if let Some(path) = self.artifact(kind) {
                let bytes = tokio::fs::metadata(path).await.ok().map(|m| m.len());
                summaries.push(ArtifactSummary {
                    kind,
                    path: path.to_path_buf(),
                    bytes,
                });
            }
        }
        summaries
    }
}

/// A run that ended in `Failed`.
#[derive(Debug, Error)]
#[error("Pipeline failed during {stage}: {cause}")]
pub struct PipelineFailure {
    pub run_id: Uuid,
    pub stage: PipelineStage,
    #[source]
    pub cause: DockError,
    /// Artifacts written before the failure; left on disk.
    pub artifacts: Vec<PipelineArtifact>,
}

// ── Run record ────────────────────────────────────────────────────────────────

/// State of one pipeline execution, from `Pending` to a terminal state.
#[derive(Debug)]
pub struct PipelineRun {
    id: Uuid,
    config: Config,
    state: PipelineState,
    history: Vec<PipelineState>,
    artifacts: Vec<PipelineArtifact>,
    search_box: Option<SearchBox>,
    poses: Vec<PoseRecord>,
    warnings: Vec<DockError>,
    failure: Option<DockError>,
}

impl PipelineRun {
    fn new(config: Config) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            state: PipelineState::Pending,
            history: vec![PipelineState::Pending],
            artifacts: Vec::new(),
            search_box: None,
            poses: Vec::new(),
            warnings: Vec::new(),
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Every state entered, in order, starting with `Pending`.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn artifacts(&self) -> &[PipelineArtifact] {
        &self.artifacts
    }

    pub fn search_box(&self) -> Option<&SearchBox> {
        self.search_box.as_ref()
    }

    pub fn poses(&self) -> &[PoseRecord] {
        &self.poses
    }

    pub fn warnings(&self) -> &[DockError] {
        &self.warnings
    }

    pub fn failure(&self) -> Option<&DockError> {
        self.failure.as_ref()
    }

    /// Whether `stage` was ever entered.
    pub fn reached(&self, stage: PipelineStage) -> bool {
        self.history.contains(&stage.state())
    }

    pub fn into_result(self) -> std::result::Result<DockingOutcome, PipelineFailure> {
        if let Some(cause) = self.failure {
            let stage = self.state.stage().unwrap_or(PipelineStage::Acquisition);
            return Err(PipelineFailure {
                run_id: self.id,
                stage,
                cause,
                artifacts: self.artifacts,
            });
        }

        match self.search_box {
            Some(search_box) if self.state == PipelineState::Done => Ok(DockingOutcome {
                run_id: self.id,
                search_box,
                poses: self.poses,
                warnings: self.warnings,
                artifacts: self.artifacts,
            }),
            _ => Err(PipelineFailure {
                run_id: self.id,
                stage: self.state.stage().unwrap_or(PipelineStage::Acquisition),
                cause: DockError::InvalidConfig(format!("run did not complete (state {:?})", self.state)),
                artifacts: self.artifacts,
            }),
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(!self.state.is_terminal(), "transition out of terminal state");
        self.history.push(next.clone());
        self.state = next;
    }

    fn record(&mut self, kind: ArtifactKind, path: PathBuf) {
        if let Some(existing) = self.artifacts.iter_mut().find(|a| a.path == path) {
            if existing.kind == ArtifactKind::Intermediate {
                existing.kind = kind;
            }
            return;
        }
        self.artifacts.push(PipelineArtifact { kind, path });
    }
}

// ── Pipeline orchestrator ─────────────────────────────────────────────────────

pub struct DockingPipeline {
    config: Config,
    layout: ArtifactLayout,
    source: Box<dyn StructureSource>,
    toolchain: Box<dyn Toolchain>,
    runner: Box<dyn StageRunner>,
    progress_tx: Option<broadcast::Sender<PipelineProgress>>,
}

impl DockingPipeline {
    /// Pipeline with the default collaborators: RCSB download (or the local
    /// `workspace.structure_dir`), PyMOL/Open Babel/Vina, child processes.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let source: Box<dyn StructureSource> = match &config.workspace.structure_dir {
            Some(dir) => Box::new(LocalStructureSource::new(dir)),
            None => Box::new(RcsbFetcher::new()?),
        };
        let toolchain = Box::new(ExternalToolchain::from_config(&config));
        let workspace = std::path::absolute(&config.workspace.path)?;
        let layout = ArtifactLayout::new(workspace, config.workspace.artifact_prefix.clone());

        Ok(Self {
            config,
            layout,
            source,
            toolchain,
            runner: Box::new(ProcessRunner::new()),
            progress_tx: None,
        })
    }

    pub fn with_source(mut self, source: impl StructureSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn with_toolchain(mut self, toolchain: impl Toolchain + 'static) -> Self {
        self.toolchain = Box::new(toolchain);
        self
    }

    pub fn with_runner(mut self, runner: impl StageRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Progress events are sent here on every state transition.
    pub fn with_progress(mut self, tx: broadcast::Sender<PipelineProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Run every stage and return the poses, or the failing stage and its cause.
    pub async fn run(&self) -> std::result::Result<DockingOutcome, PipelineFailure> {
        self.execute().await.into_result()
    }

    /// Run every stage and return the full run record, whatever the outcome.
    #[instrument(skip(self), fields(pdb_id = %self.config.target.pdb_id, ligand = %self.config.target.ligand_resn))]
    pub async fn execute(&self) -> PipelineRun {
        let mut run = PipelineRun::new(self.config.clone());
        info!(run_id = %run.id, workspace = ?self.layout.dir(), "Starting docking pipeline");

        match self.drive(&mut run).await {
            Ok(()) => {
                self.transition(&mut run, PipelineState::Done, "Pipeline completed");
                info!(
                    run_id = %run.id,
                    poses = run.poses.len(),
                    warnings = run.warnings.len(),
                    "Docking pipeline done"
                );
            }
            Err(cause) => {
                let stage = run.state.stage().unwrap_or(PipelineStage::Acquisition);
                let message = cause.to_string();
                warn!(run_id = %run.id, stage = %stage, "Pipeline failed: {}", message);
                self.transition(
                    &mut run,
                    PipelineState::Failed {
                        stage,
                        cause: message.clone(),
                    },
                    &message,
                );
                run.failure = Some(cause);
            }
        }
        run
    }

    async fn drive(&self, run: &mut PipelineRun) -> Result<()> {
        self.enter(run, PipelineStage::Acquisition);
        let structure = self.acquire(run).await?;

        self.enter(run, PipelineStage::ReceptorPreparation);
        let receptor = self.prepare_receptor(run, &structure).await?;

        self.enter(run, PipelineStage::LigandPreparation);
        let (reference, ligand) = self.prepare_ligand(run, &structure).await?;

        self.enter(run, PipelineStage::BoxCalculation);
        let search_box = self.compute_box(&reference).await?;
        run.search_box = Some(search_box);

        self.enter(run, PipelineStage::Docking);
        let report = self.dock(run, receptor, ligand, search_box).await?;

        self.enter(run, PipelineStage::ResultParsing);
        let poses = read_report(&report).await?;
        if let Err(shortfall) = check_pose_count(&poses, self.config.search.num_modes) {
            warn!(run_id = %run.id, "{}", shortfall);
            run.warnings.push(shortfall);
        }
        info!(run_id = %run.id, "Parsed {} poses from {:?}", poses.len(), report);
        run.poses = poses;

        Ok(())
    }

    async fn acquire(&self, run: &mut PipelineRun) -> Result<PathBuf> {
        tokio::fs::create_dir_all(self.layout.dir()).await?;

        let id = &self.config.target.pdb_id;
        let dest = self.layout.structure(id);
        let path = self.source.fetch(id, &dest).await?;
        verify_outputs(&PipelineStage::Acquisition.to_string(), std::slice::from_ref(&path)).await?;

        run.record(ArtifactKind::Structure, path.clone());
        Ok(path)
    }

    async fn prepare_receptor(&self, run: &mut PipelineRun, structure: &Path) -> Result<PathBuf> {
        let selection = self.layout.receptor_selection();
        let output = self.layout.receptor();
        let steps = self.toolchain.prepare_receptor(&ReceptorJob {
            structure,
            chain: self.config.target.chain,
            selection: &selection,
            output: &output,
        });

        self.run_steps(run, &steps).await?;
        verify_outputs(&PipelineStage::ReceptorPreparation.to_string(), std::slice::from_ref(&output)).await?;
        run.record(ArtifactKind::Receptor, output.clone());
        Ok(output)
    }

    async fn prepare_ligand(&self, run: &mut PipelineRun, structure: &Path) -> Result<(PathBuf, PathBuf)> {
        let selector = self.ligand_selector();
        let reference = self.layout.ligand_reference();
        let output = self.layout.ligand();
        let steps = self.toolchain.prepare_ligand(&LigandJob {
            structure,
            selector: &selector,
            reference: &reference,
            output: &output,
        });

        self.run_steps(run, &steps).await?;
        verify_outputs(
            &PipelineStage::LigandPreparation.to_string(),
            &[reference.clone(), output.clone()],
        )
        .await?;
        run.record(ArtifactKind::LigandReference, reference.clone());
        run.record(ArtifactKind::Ligand, output.clone());
        Ok((reference, output))
    }

    async fn compute_box(&self, reference: &Path) -> Result<SearchBox> {
        let coords = extract_ligand_coordinates(reference, &self.ligand_selector()).await?;
        let search_box = SearchBox::enclosing(&coords, self.config.search.padding)?;
        search_box.validate()?;

        let [cx, cy, cz] = search_box.center;
        let [sx, sy, sz] = search_box.size;
        info!("Atom count     : {}", coords.len());
        info!("Grid center    : X={:.2}  Y={:.2}  Z={:.2}", cx, cy, cz);
        info!("Grid size      : X={:.2}  Y={:.2}  Z={:.2}", sx, sy, sz);
        info!("Grid volume    : {:.1} A^3", search_box.volume());
        Ok(search_box)
    }

    async fn dock(
        &self,
        run: &mut PipelineRun,
        receptor: PathBuf,
        ligand: PathBuf,
        search_box: SearchBox,
    ) -> Result<PathBuf> {
        let search = &self.config.search;
        let docking = DockingConfig {
            receptor,
            ligand,
            search_box,
            exhaustiveness: search.exhaustiveness,
            num_modes: search.num_modes,
            seed: search.seed,
            cpu: search.cpu,
            out: self.layout.poses(),
            report: self.layout.report(),
        };

        let spec = self.toolchain.dock(&docking);
        self.run_steps(run, std::slice::from_ref(&spec)).await?;
        verify_outputs(
            &PipelineStage::Docking.to_string(),
            &[docking.out.clone(), docking.report.clone()],
        )
        .await?;
        run.record(ArtifactKind::Poses, docking.out);
        run.record(ArtifactKind::Report, docking.report.clone());
        Ok(docking.report)
    }

    async fn run_steps(&self, run: &mut PipelineRun, steps: &[CommandSpec]) -> Result<()> {
        for step in steps {
            let outputs = self.runner.run(step).await?;
            for path in outputs {
                let kind = self.layout.classify(&path);
                run.record(kind, path);
            }
        }
        Ok(())
    }

    fn ligand_selector(&self) -> ResidueSelector {
        let target = &self.config.target;
        ResidueSelector::new(target.ligand_resn.clone(), Some(target.ligand_chain()))
    }

    fn enter(&self, run: &mut PipelineRun, stage: PipelineStage) {
        info!(run_id = %run.id, stage = %stage, "Entering stage");
        self.transition(run, stage.state(), &format!("Starting {stage}"));
    }

    fn transition(&self, run: &mut PipelineRun, next: PipelineState, message: &str) {
        debug!(run_id = %run.id, from = ?run.state, to = ?next, "State transition");
        run.transition(next.clone());
        if let Some(ref tx) = self.progress_tx {
            let _ = tx.send(PipelineProgress {
                run_id: run.id,
                state: next,
                message: message.to_string(),
                at: Utc::now(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_names_with_prefix() {
        let layout = ArtifactLayout::new("/runs/a", "batch7_");
        assert_eq!(layout.structure("1stp"), PathBuf::from("/runs/a/batch7_1stp.pdb"));
        assert_eq!(layout.path(ArtifactKind::Receptor), Some(PathBuf::from("/runs/a/batch7_receptor.pdbqt")));
        assert_eq!(layout.path(ArtifactKind::Report), Some(PathBuf::from("/runs/a/batch7_result_log.txt")));
        assert_eq!(layout.path(ArtifactKind::Structure), None);
    }

    #[test]
    fn test_layout_classifies_known_files() {
        let layout = ArtifactLayout::new("w", "");
        assert_eq!(layout.classify(Path::new("w/ligand_ref.pdb")), ArtifactKind::LigandReference);
        assert_eq!(layout.classify(Path::new("w/receptor.pml")), ArtifactKind::Intermediate);
    }

    #[test]
    fn test_stage_state_round_trip() {
        for stage in [
            PipelineStage::Acquisition,
            PipelineStage::ReceptorPreparation,
            PipelineStage::LigandPreparation,
            PipelineStage::BoxCalculation,
            PipelineStage::Docking,
            PipelineStage::ResultParsing,
        ] {
            assert_eq!(stage.state().stage(), Some(stage));
            assert!(!stage.state().is_terminal());
        }
        assert!(PipelineState::Done.is_terminal());
        assert_eq!(PipelineState::Pending.stage(), None);
    }

    #[test]
    fn test_failure_message_names_stage_and_cause() {
        let failure = PipelineFailure {
            run_id: Uuid::nil(),
            stage: PipelineStage::Docking,
            cause: DockError::ExternalToolFailed {
                stage: "docking (vina)".into(),
                exit_status: Some(1),
                stderr: "Parse error on line 12 in file \"receptor.pdbqt\"".into(),
            },
            artifacts: vec![],
        };
        assert_eq!(
            failure.to_string(),
            "Pipeline failed during docking: docking (vina) exited with status 1: \
             Parse error on line 12 in file \"receptor.pdbqt\""
        );
    }

    #[test]
    fn test_record_upgrades_intermediate_kind() {
        let mut run = PipelineRun::new(Config::default());
        run.record(ArtifactKind::Intermediate, PathBuf::from("x.pdbqt"));
        run.record(ArtifactKind::Ligand, PathBuf::from("x.pdbqt"));
        assert_eq!(run.artifacts(), &[PipelineArtifact { kind: ArtifactKind::Ligand, path: PathBuf::from("x.pdbqt") }]);
    }
}
