// Property tests for completion recovery.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use docdiff_core::{ChangeAction, ChangeType, DiffItem, DiffPayload};
use docdiff_provider::{extract_json, normalize_completion};
use proptest::prelude::*;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-zA-Z0-9_ .,()>-]{0,40}",
        1 => r"[ぁ-んァ-ン一-龥]{1,10}",
        1 => Just("VARCHAR(50) -> VARCHAR(100)".to_string()),
    ]
}

fn arb_item() -> impl Strategy<Value = DiffItem> {
    (
        prop::sample::select(ChangeType::ALL.to_vec()),
        prop::sample::select(ChangeAction::ALL.to_vec()),
        arb_text(),
        arb_text(),
        prop::option::of(arb_text()),
        prop::option::of(arb_text()),
    )
        .prop_map(|(t, a, target, description, old, new)| {
            DiffItem::new(t, a, target, description).with_values(old, new)
        })
}

fn arb_payload() -> impl Strategy<Value = DiffPayload> {
    (prop::collection::vec(arb_item(), 0..6), arb_text())
        .prop_map(|(diffs, summary)| DiffPayload { diffs, summary })
}

/// Prose that never contains braces or backticks.
fn arb_prose() -> impl Strategy<Value = String> {
    r"[a-zA-Z .:!\n]{0,60}"
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn bare_serialization_round_trips(payload in arb_payload()) {
        let text = serde_json::to_string(&payload).unwrap();
        let value = extract_json(&text).unwrap();
        prop_assert_eq!(value, serde_json::to_value(&payload).unwrap());
    }

    #[test]
    fn fenced_serialization_round_trips(payload in arb_payload(), before in arb_prose(), after in arb_prose()) {
        let text = format!(
            "{}\n```json\n{}\n```\n{}",
            before,
            serde_json::to_string_pretty(&payload).unwrap(),
            after
        );
        prop_assert_eq!(normalize_completion(&text).unwrap(), payload);
    }

    #[test]
    fn prose_wrapped_serialization_round_trips(payload in arb_payload(), before in arb_prose(), after in arb_prose()) {
        let text = format!("{} {} {}", before, serde_json::to_string(&payload).unwrap(), after);
        prop_assert_eq!(normalize_completion(&text).unwrap(), payload);
    }

    #[test]
    fn untagged_fence_round_trips(payload in arb_payload()) {
        let text = format!("Result:\n```\n{}\n```", serde_json::to_string(&payload).unwrap());
        prop_assert_eq!(normalize_completion(&text).unwrap(), payload);
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn fenced_reply_scenario() {
    let raw = "Here is the result:\n```json\n{\"diffs\":[],\"summary\":\"ok\"}\n```";
    assert_eq!(normalize_completion(raw).unwrap(), DiffPayload::empty("ok"));
}
