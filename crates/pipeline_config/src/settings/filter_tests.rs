//! Tests for FilterConfig

use super::*;
use serde_json::json;

#[test]
fn test_enabled_filter_needs_expression() {
    let filter: FilterConfig = serde_json::from_value(json!({"enabled": true})).unwrap();
    assert!(filter
        .validate()
        .unwrap_err()
        .to_string()
        .contains("expression is required when filter is enabled"));

    assert!(FilterConfig::enabled("amount > 100").validate().is_ok());
    assert!(FilterConfig::default().validate().is_ok());
}

#[test]
fn test_update_sets_expression() {
    let base = FilterConfig::enabled("amount > 100");
    let patch: FilterConfigPatch =
        serde_json::from_value(json!({"expression": "amount > 500"})).unwrap();

    let updated = base.update(&patch).unwrap();
    assert_eq!(updated.expression.as_deref(), Some("amount > 500"));
    assert!(updated.enabled);
    assert_eq!(base.expression.as_deref(), Some("amount > 100"));
}

#[test]
fn test_update_disable_and_clear() {
    let base = FilterConfig::enabled("amount > 100");
    let patch: FilterConfigPatch =
        serde_json::from_value(json!({"enabled": false, "expression": null})).unwrap();

    let updated = base.update(&patch).unwrap();
    assert_eq!(updated, FilterConfig::default());
}
