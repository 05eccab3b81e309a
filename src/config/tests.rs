use super::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn config_file_persistence() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");

        let mut original_config = Config::load_from(temp_dir.path()).expect("defaults load");
        original_config.index.index_name = "ops-papers".to_string();
        original_config.index.host = Some("ops-abc.svc.pinecone.io".to_string());
        original_config.index.timeout_seconds = 5;
        original_config.recommend.top_k = 20;
        original_config.save().expect("should save config");

        assert!(original_config.config_file_path().exists());

        let loaded_config = Config::load_from(temp_dir.path()).expect("should load saved config");
        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn save_creates_missing_directory() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let config_dir = temp_dir.path().join("nested").join("paper-recommender");

        let config = Config {
            base_dir: config_dir.clone(),
            ..Config::default()
        };

        assert!(!config_dir.exists());
        config.save().expect("should save config");
        assert!(config_dir.join("config.toml").exists());
    }

    #[test]
    fn save_rejects_invalid_config() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let mut config = Config::load_from(temp_dir.path()).expect("defaults load");
        config.recommend.top_k = 0;

        assert!(config.save().is_err());
        assert!(!config.config_file_path().exists());
    }

    #[test]
    fn invalid_toml_handling() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let invalid_toml = r#"
            [index
            index_name = "ops"
            timeout_seconds = "soon"
        "#;
        fs::write(temp_dir.path().join("config.toml"), invalid_toml)
            .expect("should write config");

        assert!(Config::load_from(temp_dir.path()).is_err());
    }

    #[test]
    fn out_of_range_values_fail_on_load() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let toml = r#"
            [index]
            timeout_seconds = 900
        "#;
        fs::write(temp_dir.path().join("config.toml"), toml).expect("should write config");

        let err = Config::load_from(temp_dir.path()).expect_err("timeout is out of range");
        assert!(format!("{err:#}").contains("Invalid timeout"));
    }

    #[test]
    fn artifact_paths_from_file() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let toml = r#"
            [vectorizer]
            path = "models/tfidf_model.json"

            [catalog]
            database = "/srv/papers.db"
        "#;
        fs::write(temp_dir.path().join("config.toml"), toml).expect("should write config");

        let config = Config::load_from(temp_dir.path()).expect("should load config");
        assert_eq!(
            config.vectorizer_path(),
            temp_dir.path().join("models").join("tfidf_model.json")
        );
        assert_eq!(config.database_path(), PathBuf::from("/srv/papers.db"));
    }

    #[test]
    fn error_display_messages() {
        let errors = vec![
            ConfigError::InvalidIndexName("Bad Name".to_string()),
            ConfigError::InvalidTimeout(0),
            ConfigError::InvalidTopK(0),
            ConfigError::InvalidHost(String::new()),
            ConfigError::MissingApiKey("PINECONE_API_KEY".to_string()),
            ConfigError::EmptyPath("vectorizer.path"),
        ];

        for error in errors {
            let message = format!("{error}");
            assert!(message.len() > 10);
        }
    }
}
