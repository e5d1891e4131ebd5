#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

/// End-to-end tests: mocked Ollama endpoints in front of a real on-disk LanceDB collection
use asr_rag::config::Config;
use asr_rag::corpus::{CorpusEntry, parse_corpus};
use asr_rag::correction::OllamaCorrector;
use asr_rag::database::{LanceVectorIndex, VectorIndex};
use asr_rag::embeddings::OllamaEmbedder;
use asr_rag::indexer::CorpusSeeder;
use asr_rag::pipeline::{RagPipeline, Retriever, Stage};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CORPUS: &str = r#"[
    {"term": "goroutine", "definition": "a lightweight thread managed by the Go runtime"},
    {"term": "channel", "definition": "a typed conduit for communication between goroutines"},
    {"term": "defer", "definition": "schedules a call to run when the surrounding function returns"}
]"#;

fn test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.base_dir = dir.path().to_path_buf();
    config.services.ollama_url = server.uri();
    config.services.vector_store_uri = "vectors".to_string();
    config.models.embedding_dimension = 3;
    config.collection.name = "go_terms".to_string();
    config
}

async fn mount_embedding(server: &MockServer, input: &str, vector: [f32; 3]) {
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(serde_json::json!({ "input": input })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "embeddings": [vector] })),
        )
        .mount(server)
        .await;
}

async fn mount_corpus_embeddings(server: &MockServer, entries: &[CorpusEntry]) {
    let vectors = [[1.0, 0.0, 0.0], [0.8, 0.6, 0.0], [0.0, 1.0, 0.0]];
    for (entry, vector) in entries.iter().zip(vectors) {
        mount_embedding(server, &entry.embedding_text(), vector).await;
    }
}

#[tokio::test]
async fn seeded_term_is_its_own_nearest_neighbour() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&server, &dir);
    let entries = parse_corpus(CORPUS).expect("corpus should parse");
    mount_corpus_embeddings(&server, &entries).await;

    let embedder = OllamaEmbedder::new(&config).expect("should create embedder");
    let index = LanceVectorIndex::connect(&config)
        .await
        .expect("should open vector store");

    let seeded = CorpusSeeder::new(&embedder, &index)
        .seed(&entries)
        .await
        .expect("seeding should succeed");
    assert_eq!(seeded, 3);
    assert_eq!(index.count().await.expect("should count"), 3);

    let results = Retriever::new(&embedder, &index)
        .search_terms(&entries[0].embedding_text(), 5)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].term, "goroutine");
    assert_eq!(
        results[0].definition,
        "a lightweight thread managed by the Go runtime"
    );
    assert!((results[0].score - 1.0).abs() < 1e-4);
    assert_eq!(results[1].term, "channel");
    assert!(results[1].score > results[2].score);
}

#[tokio::test]
async fn reseeding_overwrites_instead_of_duplicating() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&server, &dir);
    let entries = parse_corpus(CORPUS).expect("corpus should parse");
    mount_corpus_embeddings(&server, &entries).await;

    let embedder = OllamaEmbedder::new(&config).expect("should create embedder");
    let index = LanceVectorIndex::connect(&config)
        .await
        .expect("should open vector store");
    let seeder = CorpusSeeder::new(&embedder, &index);

    seeder.seed(&entries).await.expect("first seed should succeed");
    seeder.seed(&entries).await.expect("second seed should succeed");

    assert_eq!(index.count().await.expect("should count"), 3);
}

#[tokio::test]
async fn transcript_is_corrected_with_retrieved_terms() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&server, &dir);
    let entries = parse_corpus(CORPUS).expect("corpus should parse");
    mount_corpus_embeddings(&server, &entries).await;
    mount_embedding(&server, "go routines are cheap to start", [0.9, 0.1, 0.0]).await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "stream": false,
            "messages": [{"role": "system"}, {"role": "user", "content": "go routines are cheap to start"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"role": "assistant", "content": "goroutines are cheap to start"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(&config).expect("should create embedder");
    let corrector = OllamaCorrector::new(&config).expect("should create corrector");
    let index = LanceVectorIndex::connect(&config)
        .await
        .expect("should open vector store");
    CorpusSeeder::new(&embedder, &index)
        .seed(&entries)
        .await
        .expect("seeding should succeed");

    let correction = RagPipeline::new(&embedder, &index, &corrector, 2)
        .correct_transcript("go routines are cheap to start")
        .await
        .expect("correction should succeed");

    assert_eq!(correction.raw, "go routines are cheap to start");
    assert_eq!(correction.corrected, "goroutines are cheap to start");
    assert_eq!(correction.context.len(), 2);
    assert_eq!(correction.context[0].term, "goroutine");
}

#[tokio::test]
async fn search_before_seeding_reports_missing_collection() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&server, &dir);
    mount_embedding(&server, "goroutine", [1.0, 0.0, 0.0]).await;

    let embedder = OllamaEmbedder::new(&config).expect("should create embedder");
    let index = LanceVectorIndex::connect(&config)
        .await
        .expect("should open vector store");

    let err = Retriever::new(&embedder, &index)
        .search_terms("goroutine", 5)
        .await
        .expect_err("collection does not exist yet");

    assert_eq!(err.stage, Stage::Retrieval);
    assert!(matches!(
        err.source,
        asr_rag::RagError::CollectionNotFound(_)
    ));
}

#[tokio::test]
async fn embedding_outage_aborts_seeding() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("should create temp dir");
    let config = test_config(&server, &dir);
    let entries = parse_corpus(CORPUS).expect("corpus should parse");

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(&config).expect("should create embedder");
    let index = LanceVectorIndex::connect(&config)
        .await
        .expect("should open vector store");

    let err = CorpusSeeder::new(&embedder, &index)
        .seed(&entries)
        .await
        .expect_err("seeding should fail");

    assert_eq!(err.stage, Stage::Embedding);
    index.ensure_collection().await.expect("collection should exist");
    assert_eq!(index.count().await.expect("should count"), 0);
}
