//! Dock biotin back into streptavidin (1STP) with the real tools.
//!
//! Requires network access plus `pymol`, `obabel` and `vina` on PATH. Run with:
//! ```bash
//! cargo test --package ferrodock-molecules --test test_docking_e2e -- --ignored --nocapture
//! ```

use ferrodock_config::Config;
use ferrodock_molecules::pipeline::ArtifactKind;
use ferrodock_molecules::{DockingPipeline, PipelineState};

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires network and external tools
async fn test_dock_biotin_streptavidin() {
    let _ = tracing_subscriber_init();

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.workspace.path = dir.path().join("workspace");
    config.target.pdb_id = "1stp".to_string();
    config.target.chain = 'A';
    config.target.ligand_resn = "BTN".to_string();
    config.search.padding = 10.0;
    config.search.exhaustiveness = 8;
    config.search.num_modes = 9;

    let pipeline = DockingPipeline::new(config).expect("valid config");
    let run = pipeline.execute().await;
    println!("States: {:?}", run.history());
    assert_eq!(run.state(), &PipelineState::Done, "failure: {:?}", run.failure());

    let outcome = run.into_result().unwrap();
    println!("\n=== Docking Result ===");
    println!("Box center: {:?}", outcome.search_box.center);
    println!("Box size:   {:?}", outcome.search_box.size);
    for pose in &outcome.poses {
        println!("  mode {:>2}  {:>8.3} kcal/mol", pose.mode, pose.affinity);
    }

    assert!(!outcome.poses.is_empty() && outcome.poses.len() <= 9);
    assert!(outcome.poses.windows(2).all(|w| w[0].mode < w[1].mode));
    assert!(outcome.poses.iter().all(|p| p.affinity < 0.0));
    for kind in [ArtifactKind::Receptor, ArtifactKind::Ligand, ArtifactKind::Poses, ArtifactKind::Report] {
        let path = outcome.artifact(kind).expect("artifact recorded");
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
}

fn tracing_subscriber_init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("ferrodock=debug,info").try_init()
}
