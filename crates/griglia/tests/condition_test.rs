#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Condition builder tests against the public API.

use griglia::{ConditionTerm, render_condition};
use serde_json::json;

#[test]
fn tenant_scoping_condition() {
    let fragment = render_condition(&[ConditionTerm::field("tenant_id", 7)]).unwrap();
    assert_eq!(fragment.sql, "(`tenant_id` = ?)");
    assert_eq!(fragment.bindings, vec![json!(7)]);
}

#[test]
fn binding_count_matches_field_terms() {
    // Mixed sequence: K = 4 field terms among N = 7 items.
    let terms = [
        ConditionTerm::field("a", 1),
        ConditionTerm::keyword("and"),
        ConditionTerm::field_op("b", "<", 2),
        ConditionTerm::keyword("and"),
        ConditionTerm::keyword("not"),
        ConditionTerm::field_op("c", "LIKE", "%x%"),
        ConditionTerm::field("d", true),
    ];
    let fragment = render_condition(&terms).unwrap();

    assert_eq!(fragment.bindings.len(), 4);
    assert_eq!(
        fragment.bindings,
        vec![json!(1), json!(2), json!("%x%"), json!(true)]
    );
    assert_eq!(
        fragment.sql,
        "(`a` = ? AND `b` < ? AND NOT `c` LIKE ? `d` = ?)"
    );
}

#[test]
fn empty_condition_is_empty_fragment() {
    let fragment = render_condition(&[]).unwrap();
    assert!(fragment.is_empty());
    assert!(fragment.bindings.is_empty());
}

#[test]
fn terms_round_trip_through_serde() {
    let terms = vec![
        ConditionTerm::field("status", "active"),
        ConditionTerm::keyword("or"),
        ConditionTerm::field_op("age", ">", 21),
    ];
    let encoded = serde_json::to_string(&terms).unwrap();
    let decoded: Vec<ConditionTerm> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(
        render_condition(&decoded).unwrap(),
        render_condition(&terms).unwrap()
    );
}
