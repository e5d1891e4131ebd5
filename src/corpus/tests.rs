use super::*;
use tempfile::TempDir;

#[test]
fn parse_preserves_order() {
    let entries = parse_corpus(
        r#"[
            {"term": "goroutine", "definition": "a lightweight thread managed by the runtime"},
            {"term": "channel", "definition": "a typed conduit for communication between goroutines"}
        ]"#,
    )
    .expect("corpus should parse");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].term, "goroutine");
    assert_eq!(entries[1].term, "channel");
}

#[test]
fn embedding_text_joins_term_and_definition() {
    let entry = CorpusEntry::new("goroutine", "a lightweight thread managed by the runtime");
    assert_eq!(
        entry.embedding_text(),
        "goroutine: a lightweight thread managed by the runtime"
    );
}

#[test]
fn empty_corpus_is_valid() {
    let entries = parse_corpus("[]").expect("empty array should parse");
    assert!(entries.is_empty());
}

#[test]
fn missing_definition_is_rejected() {
    assert!(parse_corpus(r#"[{"term": "defer"}]"#).is_err());
}

#[test]
fn load_reports_missing_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let err = load_corpus(temp_dir.path().join("corpus.json")).expect_err("file is missing");
    assert!(err.to_string().contains("Failed to read corpus file"));
}

#[test]
fn load_reads_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("corpus.json");
    std::fs::write(
        &path,
        r#"[{"term": "defer", "definition": "schedules a call to run when the function returns"}]"#,
    )
    .expect("should write corpus");

    let entries = load_corpus(&path).expect("corpus should load");
    assert_eq!(
        entries,
        vec![CorpusEntry::new(
            "defer",
            "schedules a call to run when the function returns"
        )]
    );
}
