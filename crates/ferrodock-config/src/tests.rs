#[cfg(test)]
mod tests {
    use super::super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_reproduces_reference_run() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.target.pdb_id, "1stp");
        assert_eq!(config.target.chain, 'A');
        assert_eq!(config.target.ligand_resn, "BTN");
        assert_eq!(config.search.padding, 10.0);
        assert_eq!(config.search.exhaustiveness, 8);
        assert_eq!(config.search.num_modes, 9);
        assert_eq!(config.preparation.ligand_ph, 7.4);
        assert!(config.preparation.remove_waters);
        assert!(config.workspace.artifact_prefix.is_empty());
    }

    #[test]
    fn test_default_vina_matches_platform() {
        let vina = default_vina();
        if cfg!(windows) {
            assert_eq!(vina, PathBuf::from("vina.exe"));
        } else {
            assert_eq!(vina, PathBuf::from("vina"));
        }
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [target]
            pdb_id = "4hvp"
            chain = "B"
            ligand_resn = "ROC"

            [search]
            num_modes = 20
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.target.pdb_id, "4hvp");
        assert_eq!(config.target.ligand_chain(), 'B');
        assert_eq!(config.search.num_modes, 20);
        assert_eq!(config.search.seed, Some(42));
        assert_eq!(config.search.exhaustiveness, default_exhaustiveness());
    }

    #[test]
    fn test_ligand_chain_override() {
        let config = Config::from_toml_str(
            r#"
            [target]
            chain = "A"
            ligand_chain = "C"
            "#,
        )
        .unwrap();
        assert_eq!(config.target.chain, 'A');
        assert_eq!(config.target.ligand_chain(), 'C');
    }

    #[test]
    fn test_rejects_negative_padding() {
        let err = Config::from_toml_str("[search]\npadding = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("padding")));
    }

    #[test]
    fn test_rejects_zero_modes_and_exhaustiveness() {
        assert!(Config::from_toml_str("[search]\nnum_modes = 0\n").is_err());
        assert!(Config::from_toml_str("[search]\nexhaustiveness = 0\n").is_err());
    }

    #[test]
    fn test_zero_padding_is_allowed() {
        let config = Config::from_toml_str("[search]\npadding = 0.0\n").unwrap();
        assert_eq!(config.search.padding, 0.0);
    }

    #[test]
    fn test_rejects_path_like_identifier() {
        for id in ["", "../1stp", "a b", ".."] {
            let doc = format!("[target]\npdb_id = {id:?}\n");
            assert!(
                matches!(Config::from_toml_str(&doc), Err(ConfigError::Invalid(_))),
                "identifier {id:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_long_residue_name() {
        let err = Config::from_toml_str("[target]\nligand_resn = \"BIOTIN\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_multi_character_chain_is_a_parse_error() {
        let err = Config::from_toml_str("[target]\nchain = \"AB\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load_from(&missing), Err(ConfigError::NotFound(p)) if p == missing));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[workspace]\npath = \"/tmp/dock-run\"\nartifact_prefix = \"run1_\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.workspace.path, PathBuf::from("/tmp/dock-run"));
        assert_eq!(config.workspace.artifact_prefix, "run1_");
    }

    #[test]
    fn test_example_file_parses() {
        let config = Config::from_toml_str(include_str!("../../../ferrodock.example.toml")).unwrap();
        assert_eq!(config.target.pdb_id, "1stp");
        assert_eq!(config.search.num_modes, 9);
        assert_eq!(config.search.seed, None);
        assert_eq!(config.workspace.structure_dir, None);
    }
}
