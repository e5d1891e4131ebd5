use super::*;

fn term(name: &str, definition: &str) -> GroundingTerm {
    GroundingTerm {
        name: name.to_string(),
        definition: definition.to_string(),
    }
}

#[test]
fn prompt_keeps_retrieval_order() {
    let prompt = build_system_prompt(&[
        term("goroutine", "a lightweight thread managed by the runtime"),
        term("channel", "a typed conduit between goroutines"),
    ]);

    let goroutine = prompt.find("- goroutine:").expect("goroutine bullet");
    let channel = prompt.find("- channel:").expect("channel bullet");
    assert!(goroutine < channel);
    assert!(prompt.starts_with(CORRECTION_INSTRUCTIONS));
}

#[test]
fn prompt_has_one_bullet_per_term() {
    let prompt = build_system_prompt(&[
        term("defer", "schedules a call for function exit"),
        term("select", "waits on multiple channel operations"),
        term("iota", "successive untyped integer constants"),
    ]);

    assert_eq!(prompt.lines().filter(|l| l.starts_with("- ")).count(), 3);
    assert!(prompt.contains("- iota: successive untyped integer constants\n"));
}

#[test]
fn empty_grounding_still_builds_instructions() {
    let prompt = build_system_prompt(&[]);

    assert!(prompt.contains("Reference terms:"));
    assert!(!prompt.contains("- "));
}

#[test]
fn grounding_term_from_search_result() {
    let result = SearchResult {
        term: "goroutine".to_string(),
        definition: "a lightweight thread".to_string(),
        score: 0.9,
    };

    assert_eq!(
        GroundingTerm::from(&result),
        term("goroutine", "a lightweight thread")
    );
}
