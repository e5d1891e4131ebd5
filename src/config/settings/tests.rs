use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.services.ollama_url, "http://localhost:11434");
    assert_eq!(config.services.transcription_url, "http://localhost:8080");
    assert_eq!(config.models.embedding, "nomic-embed-text");
    assert_eq!(config.models.embedding_dimension, 768);
    assert_eq!(config.collection.name, "go_terms");
    assert_eq!(config.retrieval.search_limit, 5);
    assert_eq!(config.retrieval.correction_limit, 10);
    assert!(config.validate().is_ok());
}

#[test]
fn config_validation() {
    let config = Config::default();

    let mut invalid_config = config.clone();
    invalid_config.services.ollama_url = "not a url".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl("ollama", _))
    ));

    let mut invalid_config = config.clone();
    invalid_config.services.vector_store_uri = "  ".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.models.embedding = String::new();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidModel("embedding", _))
    ));

    let mut invalid_config = config.clone();
    invalid_config.models.embedding_dimension = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.collection.name = "go terms".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.retrieval.correction_limit = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidLimit("correction limit", 0))
    ));

    let mut invalid_config = config;
    invalid_config.capture.default_seconds = 0;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let parsed: Config = toml::from_str(
        r#"
        [models]
        embedding = "qwen3-embedding:8b"
        embedding_dimension = 4096
        "#,
    )
    .expect("should parse partial toml");

    assert_eq!(parsed.models.embedding, "qwen3-embedding:8b");
    assert_eq!(parsed.models.embedding_dimension, 4096);
    assert_eq!(parsed.models.correction, "llama3.2:3b");
    assert_eq!(parsed.services, ServicesConfig::default());
}

#[test]
fn load_missing_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load(temp_dir.path()).expect("should load defaults");

    assert_eq!(config.base_dir, temp_dir.path());
    assert_eq!(config.models, ModelsConfig::default());
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    std::fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[retrieval]\nsearch_limit = 0\n",
    )
    .expect("should write config");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn relative_paths_resolve_against_base_dir() {
    let config = Config {
        base_dir: PathBuf::from("/etc/asr-rag"),
        ..Config::default()
    };

    assert_eq!(config.vector_store_uri(), "/etc/asr-rag/vectors");
    assert_eq!(config.corpus_path(), PathBuf::from("/etc/asr-rag/corpus.json"));
}

#[test]
fn scheme_uris_are_used_verbatim() {
    let mut config = Config {
        base_dir: PathBuf::from("/etc/asr-rag"),
        ..Config::default()
    };
    config.services.vector_store_uri = "s3://bucket/glossary".to_string();

    assert_eq!(config.vector_store_uri(), "s3://bucket/glossary");
}

#[test]
fn zero_timeout_disables_deadline() {
    let mut config = Config::default();
    assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));

    config.services.request_timeout_secs = 0;
    assert_eq!(config.request_timeout(), None);
}
