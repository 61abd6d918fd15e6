// crates/suggest-contract-core/src/scenario/tests.rs
// ============================================================================
// Module: Scenario Matrix Unit Tests
// Description: Unit coverage for scenario parsing, matrix expansion, and steps.
// Purpose: Pin case ids, step order, and duplicate detection.
// Dependencies: proptest, serde_yaml
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use proptest::prelude::*;
use serde_yaml::Value;

use super::Scenario;
use super::ScenarioError;
use super::ScenarioMatrix;
use super::parse_scenarios;
use super::step::Step;
use super::step::StepRequest;
use super::step::delay_duration;

const SCENARIOS: &str = r"
scenarios:
  - name: suggest_apple
    description: Apple resolves from remote settings
    steps:
      - request:
          service: registry
          filenames: [fruit.json]
      - request:
          service: suggest
          path: /api/v1/suggest?q=apple
          headers:
            - name: User-Agent
              value: contract-tests
        response:
          status_code: 200
  - name: suggest_miss
    steps:
      - request:
          service: merino
          method: post
          path: /api/v1/suggest?q=nope
          delay: 0.5
        response:
          status_code: 200
          content:
            suggestions: []
";

fn scenario(name: &str, steps: usize) -> Scenario {
    Scenario {
        name: name.to_string(),
        description: None,
        steps: (0..steps).map(|index| Value::from(format!("{name}-{index}"))).collect(),
    }
}

#[test]
fn parses_scenarios_in_file_order() {
    let scenarios = parse_scenarios(SCENARIOS).unwrap();
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0].name, "suggest_apple");
    assert_eq!(scenarios[0].description.as_deref(), Some("Apple resolves from remote settings"));
    assert_eq!(scenarios[0].steps.len(), 2);
    assert_eq!(scenarios[1].name, "suggest_miss");
    assert!(scenarios[1].description.is_none());
}

#[test]
fn rejects_documents_without_scenarios() {
    let err = parse_scenarios("other: []").unwrap_err();
    assert!(matches!(err, ScenarioError::Parse(_)));
}

#[test]
fn matrix_carries_steps_unmodified() {
    let scenarios = parse_scenarios(SCENARIOS).unwrap();
    let expected_steps = scenarios[1].steps.clone();
    let matrix = ScenarioMatrix::build(scenarios).unwrap();

    assert_eq!(matrix.ids().collect::<Vec<_>>(), vec!["suggest_apple", "suggest_miss"]);
    assert_eq!(matrix.cases()[1].steps(), expected_steps.as_slice());
}

#[test]
fn matrix_rejects_duplicate_names() {
    let err = ScenarioMatrix::build(vec![scenario("a", 1), scenario("b", 1), scenario("a", 2)])
        .unwrap_err();
    assert!(matches!(err, ScenarioError::DuplicateName(ref name) if name == "a"));
}

#[test]
fn matrix_rejects_blank_names() {
    let err = ScenarioMatrix::build(vec![scenario("a", 1), scenario("  ", 1)]).unwrap_err();
    assert!(matches!(err, ScenarioError::EmptyName(1)));
}

#[test]
fn selection_keeps_matrix_order() {
    let matrix =
        ScenarioMatrix::build(vec![scenario("a", 1), scenario("b", 1), scenario("c", 1)]).unwrap();
    let selected = matrix.select(&["c".to_string(), "a".to_string()]).unwrap();
    assert_eq!(selected.ids().collect::<Vec<_>>(), vec!["a", "c"]);
}

#[test]
fn selection_rejects_unknown_names() {
    let matrix = ScenarioMatrix::build(vec![scenario("a", 1)]).unwrap();
    let err = matrix.select(&["zzz".to_string()]).unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownSelection(ref names) if names == &["zzz"]));
}

#[test]
fn empty_selection_keeps_everything() {
    let matrix = ScenarioMatrix::build(vec![scenario("a", 1), scenario("b", 0)]).unwrap();
    assert_eq!(matrix.clone().select(&[]).unwrap(), matrix);
}

#[test]
fn steps_parse_with_service_aliases() {
    let scenarios = parse_scenarios(SCENARIOS).unwrap();

    let upload = Step::parse(&scenarios[0].steps[0]).unwrap();
    match upload.request {
        StepRequest::Registry(ref request) => assert_eq!(request.filenames, vec!["fruit.json"]),
        StepRequest::Suggest(_) => unreachable!("expected registry step"),
    }
    assert!(upload.response.is_none());

    let query = Step::parse(&scenarios[0].steps[1]).unwrap();
    match query.request {
        StepRequest::Suggest(ref request) => {
            assert_eq!(request.method, "GET");
            assert_eq!(request.headers[0].name, "User-Agent");
        }
        StepRequest::Registry(_) => unreachable!("expected suggest step"),
    }
    assert_eq!(query.response.unwrap().status_code, 200);

    let legacy = Step::parse(&scenarios[1].steps[0]).unwrap();
    assert_eq!(legacy.request.delay(), Some(0.5));
    assert!(matches!(legacy.request, StepRequest::Suggest(ref request) if request.method == "post"));
    let content = legacy.response.unwrap().content.unwrap();
    assert_eq!(content, serde_json::json!({"suggestions": []}));
}

#[test]
fn steps_reject_unknown_services() {
    let value: Value = serde_yaml::from_str("request: {service: ftp, path: /}").unwrap();
    assert!(Step::parse(&value).is_err());
}

#[test]
fn delays_reject_negative_values() {
    assert!(delay_duration(-1.0).is_none());
    assert!(delay_duration(f64::NAN).is_none());
    assert_eq!(delay_duration(0.25).unwrap().as_millis(), 250);
}

proptest! {
    #[test]
    fn matrix_has_one_case_per_unique_scenario(
        names in proptest::collection::hash_set("[a-z][a-z0-9_]{0,12}", 0..16),
        step_count in 0usize..5,
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let scenarios: Vec<Scenario> =
            names.iter().map(|name| scenario(name, step_count)).collect();
        let matrix = ScenarioMatrix::build(scenarios.clone()).unwrap();

        prop_assert_eq!(matrix.len(), names.len());
        for (case, scenario) in matrix.cases().iter().zip(&scenarios) {
            prop_assert_eq!(case.id(), scenario.name.as_str());
            prop_assert_eq!(case.steps(), scenario.steps.as_slice());
        }
    }
}
