//! Every query under `tests/cases` analyzes to its recorded JSON and survives
//! a trip through the hierarchy-set algebra.

mod common;

use mdxalchemy::{export, GrammarEngine};

#[test]
fn fixtures_are_discovered() {
    let cases = common::load_cases();
    assert!(cases.len() >= 3, "expected fixtures, found {}", cases.len());
    assert!(cases.iter().all(|c| c.expected.is_some()));
}

#[test]
fn analysis_matches_recorded_json() {
    let engine = GrammarEngine::default();
    for case in common::load_cases() {
        let Some(expected_path) = &case.expected else {
            continue;
        };
        let statement = engine
            .analyze(&case.query)
            .unwrap_or_else(|e| panic!("{}: {e}", case.name));
        let actual = export::to_json_value(&statement).unwrap();
        let expected: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(expected_path).unwrap()).unwrap();
        assert_eq!(actual, expected, "analysis of '{}' changed", case.name);
    }
}

#[test]
fn rebuilt_queries_parse_again() {
    let engine = GrammarEngine::default();
    for case in common::load_cases() {
        let builder = engine
            .transform(&case.query)
            .unwrap_or_else(|e| panic!("{}: {e}", case.name));
        let mdx = builder.to_mdx();
        let rebuilt = engine
            .transform(&mdx)
            .unwrap_or_else(|e| panic!("{}: rebuilt MDX does not parse: {e}\n{mdx}", case.name));
        assert_eq!(rebuilt, builder, "{}: rebuild is not stable", case.name);
    }
}

#[test]
fn recorded_json_deserializes_to_the_same_statement() {
    let engine = GrammarEngine::default();
    let case = common::case("bus_eta");
    let statement = engine.analyze(&case.query).unwrap();
    let text = std::fs::read_to_string(case.expected.unwrap()).unwrap();
    let stored: mdxalchemy::QueryStatement = serde_json::from_str(&text).unwrap();
    assert_eq!(stored, statement);
}
