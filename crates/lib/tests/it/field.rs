use docview::{Document, Model, SerializeMode};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_value_falls_back_to_default() {
    let model = mutable_sparse();
    assert_eq!(model.salutation.get(), None);
    assert_eq!(model.salutation.value(), "Hello");
    assert_eq!(model.salutation.default_value(), "Hello");
    assert!(!model.salutation.has_value());
    assert!(model.first_name.has_value());
}

#[test]
fn test_set_then_read() {
    let model = mutable_sparse();
    model.salutation.set("Howdy".into()).unwrap();
    assert_eq!(model.salutation.get().as_deref(), Some("Howdy"));
    assert!(model.salutation.has_value());
    assert_eq!(model.original_data().get("salutation"), None);
}

#[test]
fn test_set_null_reads_default_until_cleared() {
    let model = mutable_wyatt();
    assert_eq!(model.salutation.value(), "Greetings");

    model.salutation.set_null().unwrap();
    assert!(!model.salutation.has_value());
    assert_eq!(model.salutation.value(), "Hello");

    model.salutation.clear();
    assert_eq!(model.salutation.value(), "Greetings");
}

#[test]
fn test_explicit_none_has_no_value() {
    let model = mutable_wyatt();
    assert!(model.first_name.has_value());
    assert!(model.num_returns.has_value());
    assert!(model.join_date.has_value());

    model.first_name.set(None).unwrap();
    model.num_returns.set(None).unwrap();
    model.join_date.set(None).unwrap();

    assert_eq!(model.first_name.get(), None);
    assert!(!model.first_name.has_value());
    assert_eq!(model.num_returns.get(), None);
    assert!(!model.num_returns.has_value());
    assert_eq!(model.join_date.get(), None);
    assert!(!model.join_date.has_value());

    let data = model.current_data(true, true);
    assert_eq!(data["firstName"], serde_json::Value::Null);
    assert!(!model.current_data(false, true).contains_key("firstName"));

    model.first_name.clear();
    assert_eq!(model.first_name.value().as_deref(), Some("Wyatt"));
}

#[test]
fn test_assigned_sub_model_joins_parent_guard() {
    let model = mutable_wyatt();
    let foreign = Model::<Purchase>::from_value(
        json!({"purchaseDate": "2020-01-02T03:04:05Z", "purchasePrice": 5.5}),
        false,
    )
    .unwrap();
    model.current_purchase.set(Some(foreign.clone())).unwrap();

    let stored = model.current_purchase.value().unwrap();
    assert!(stored.shares_guard_with(&model));
    assert!(!stored.shares_guard_with(&foreign));
    assert!(stored.is_mutable());

    stored.price.set(6.5).unwrap();
    assert_eq!(foreign.price.value(), 5.5);
    assert_eq!(model.current_data(false, true)["currentPurchase"]["purchasePrice"], 6.5);

    let list = vec![foreign.clone(), stored.clone()];
    model.purchases.set(list).unwrap();
    let purchases = model.purchases.value();
    assert!(purchases.iter().all(|p| p.shares_guard_with(&model)));
    assert!(purchases[1].ptr_eq(&stored));
}

#[test]
fn test_clear_is_allowed_on_frozen_models() {
    let model = wyatt();
    assert_eq!(model.first_name.value().as_deref(), Some("Wyatt"));
    model.first_name.clear();
    assert_eq!(model.first_name.value().as_deref(), Some("Wyatt"));
}

#[test]
fn test_raw_honors_flags() {
    let model = mutable_wyatt();
    assert_eq!(model.first_score.raw(false, true), Some(json!("1")));
    assert_eq!(model.num_purchases.raw(false, true), Some(json!(3)));
    assert_eq!(
        model.never_output.raw(false, false),
        Some(json!("shouldn't see this string in output JSON"))
    );
    assert_eq!(model.never_output.raw(false, true), None);
    assert_eq!(model.last_name.raw(true, true), Some(json!("Earp")));

    let sparse = mutable_sparse();
    assert_eq!(sparse.last_name.raw(true, true), None);
}

#[test]
fn test_path_and_mode() {
    let model = wyatt();
    assert_eq!(model.first_name.path().to_string(), "firstName");
    assert_eq!(model.first_name.serialize_mode(), SerializeMode::Always);
    assert_eq!(model.never_output.serialize_mode(), SerializeMode::Never);
    assert!(model.comm_prefs.path().is_same_level());

    let purchase = model.current_purchase.value().unwrap();
    assert_eq!(purchase.adjustment.serialize_mode(), SerializeMode::Never);
}

#[test]
fn test_mismatched_type_reads_as_absent() {
    let data = document(json!({"firstName": 12, "numberOfPurchases": "many"}));
    let model = Model::<Customer>::new(data, false);
    assert_eq!(model.first_name.value(), None);
    assert_eq!(model.num_purchases.value(), 0);
    assert!(!model.num_purchases.has_value());
}

#[test]
fn test_group_outlives_parent() {
    let model = Model::<Customer>::new(Document::new(), true);
    let prefs = model.comm_prefs.value();
    drop(model);

    assert_eq!(prefs.comm_interval.value(), 7);
    prefs.comm_interval.set(3).unwrap();
    assert_eq!(prefs.comm_interval.value(), 3);
}

#[test]
fn test_group_placeholder_is_default() {
    let model = wyatt();
    let placeholder = model.comm_prefs.default_value();
    assert!(!placeholder.is_mutable());
    assert_eq!(placeholder.comm_interval.value(), 7);
    assert!(model.comm_prefs.has_value());
}

#[test]
fn test_debug_shows_path_and_value() {
    let model = wyatt();
    let debug = format!("{:?}", model.first_name);
    assert!(debug.contains("firstName"));
    assert!(debug.contains("Wyatt"));
}
