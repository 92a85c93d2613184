use super::*;
use crate::{filter::CompareOp, update::Dialect};
use std::collections::BTreeMap;

// ---- query table -------------------------------------------------------

#[test]
fn empty_and_equals_tokens_both_mean_equality() {
    assert_eq!(QueryOp::from_token(""), Some(QueryOp::Eq));
    assert_eq!(QueryOp::from_token("="), Some(QueryOp::Eq));
}

#[test]
fn every_canonical_token_resolves_to_its_operator() {
    for op in [
        QueryOp::Lt,
        QueryOp::Lte,
        QueryOp::Eq,
        QueryOp::Ne,
        QueryOp::Gt,
        QueryOp::Gte,
        QueryOp::In,
        QueryOp::NotIn,
        QueryOp::Like,
        QueryOp::Null,
        QueryOp::Or,
    ] {
        assert_eq!(QueryOp::from_token(op.token()), Some(op), "{op}");
    }
}

#[test]
fn query_tokens_are_matched_exactly() {
    for token in ["IN", "Like", "between", "not_in", " in", "=="] {
        assert_eq!(QueryOp::from_token(token), None, "{token:?}");
    }
}

#[test]
fn only_or_lacks_a_builder() {
    for entry in QUERY_OPERATORS {
        assert_eq!(
            entry.build.is_none(),
            entry.op == QueryOp::Or,
            "{}",
            entry.token
        );
    }
    assert!(QueryOp::Or.builder().is_none());
    assert!(QueryOp::Like.builder().is_some());
}

#[test]
fn membership_ops_are_in_and_not_in() {
    assert!(QueryOp::In.is_membership());
    assert!(QueryOp::NotIn.is_membership());
    assert!(!QueryOp::Eq.is_membership());
    assert!(!QueryOp::Or.is_membership());
}

// ---- query builders ----------------------------------------------------

fn build(op: QueryOp, value: Value) -> Result<Option<Filter>, Error> {
    let builder = op.builder().expect("builder");
    builder("col", value)
}

#[test]
fn comparison_builders_emit_their_operator() {
    let cases = [
        (QueryOp::Eq, CompareOp::Eq),
        (QueryOp::Ne, CompareOp::Ne),
        (QueryOp::Lt, CompareOp::Lt),
        (QueryOp::Lte, CompareOp::Lte),
        (QueryOp::Gt, CompareOp::Gt),
        (QueryOp::Gte, CompareOp::Gte),
    ];

    for (op, compare) in cases {
        assert_eq!(
            build(op, Value::Int(5)).unwrap(),
            Some(Filter::compare("col", compare, 5_i64)),
            "{op}"
        );
    }
}

#[test]
fn in_flattens_list_items() {
    let value = Value::List(vec![Value::present(1_i64), Value::Int(2)]);

    assert_eq!(
        build(QueryOp::In, value).unwrap(),
        Some(Filter::in_("col", vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn not_in_renders_as_not_in() {
    let value = Value::from_slice(&["a", "b"]);
    let filter = build(QueryOp::NotIn, value).unwrap().unwrap();

    assert_eq!(filter.to_string(), "col NOT IN ('a', 'b')");
}

#[test]
fn membership_on_a_scalar_value_is_rejected() {
    let err = build(QueryOp::In, Value::Int(1)).unwrap_err();

    assert_eq!(
        err,
        Error::InvalidFieldValue {
            column: "col".into(),
            expected: "list",
            found: "int",
        }
    );
}

#[test]
fn like_passes_the_pattern_through() {
    assert_eq!(
        build(QueryOp::Like, Value::Text("%ann%".into())).unwrap(),
        Some(Filter::like("col", "%ann%"))
    );
}

#[test]
fn like_on_non_text_is_rejected() {
    let err = build(QueryOp::Like, Value::Map(BTreeMap::new())).unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidFieldValue {
            expected: "text",
            found: "map",
            ..
        }
    ));
}

#[test]
fn null_selects_by_boolean() {
    assert_eq!(
        build(QueryOp::Null, Value::Bool(true)).unwrap(),
        Some(Filter::is_null("col"))
    );
    assert_eq!(
        build(QueryOp::Null, Value::Bool(false)).unwrap(),
        Some(Filter::is_not_null("col"))
    );
}

#[test]
fn null_ignores_non_boolean_values() {
    assert_eq!(build(QueryOp::Null, Value::Int(1)).unwrap(), None);
    assert_eq!(build(QueryOp::Null, Value::Text("yes".into())).unwrap(), None);
}

// ---- update table ------------------------------------------------------

#[test]
fn update_tokens_resolve() {
    assert_eq!(UpdateOp::from_token("+"), Some(UpdateOp::Add));
    assert_eq!(UpdateOp::from_token("-"), Some(UpdateOp::Sub));
    assert_eq!(UpdateOp::from_token("merge_json"), Some(UpdateOp::MergeJson));
    assert_eq!(UpdateOp::from_token(""), None);
    assert_eq!(UpdateOp::from_token("*"), None);
    assert_eq!(UpdateOp::from_token("MERGE_JSON"), None);

    for entry in UPDATE_OPERATORS {
        assert_eq!(entry.op.token(), entry.token);
    }
}

#[test]
fn arithmetic_updates_reference_the_column() {
    let add = UpdateOp::Add
        .build("count", Value::Int(3), Dialect::MySql)
        .unwrap();
    assert_eq!(
        add,
        Some(Assignment::Expr(UpdateExpr::new(
            "count + ?",
            vec![Value::Int(3)]
        )))
    );

    let sub = UpdateOp::Sub
        .build("stock", Value::Uint(2), Dialect::Sqlite)
        .unwrap();
    assert_eq!(
        sub,
        Some(Assignment::Expr(UpdateExpr::new(
            "stock - ?",
            vec![Value::Uint(2)]
        )))
    );
}

#[test]
fn merge_json_binds_the_document_twice() {
    let mut doc = BTreeMap::new();
    doc.insert("theme".to_string(), Value::Text("dark".into()));

    let assignment = UpdateOp::MergeJson
        .build("prefs", Value::Map(doc), Dialect::MySql)
        .unwrap()
        .unwrap();
    let expr = assignment.as_expr().unwrap();

    assert_eq!(
        expr.sql,
        "CASE WHEN (`prefs` IS NULL OR `prefs` = '') THEN CAST(? AS JSON) \
         ELSE JSON_MERGE_PATCH(`prefs`, CAST(? AS JSON)) END"
    );
    let text = Value::Text(r#"{"theme":"dark"}"#.into());
    assert_eq!(expr.params, vec![text.clone(), text]);
}

#[test]
fn merge_json_follows_the_dialect() {
    let assignment = UpdateOp::MergeJson
        .build("prefs", Value::Text("x".into()), Dialect::Sqlite)
        .unwrap()
        .unwrap();
    let expr = assignment.as_expr().unwrap();

    assert_eq!(
        expr.sql,
        "CASE WHEN (\"prefs\" IS NULL OR \"prefs\" = '') THEN json(?) \
         ELSE json_patch(\"prefs\", json(?)) END"
    );
    assert_eq!(expr.params[0], Value::Text(r#""x""#.into()));
}

#[test]
fn merge_json_of_a_scalar_serializes_it_directly() {
    let assignment = UpdateOp::MergeJson
        .build("n", Value::Int(7), Dialect::MySql)
        .unwrap()
        .unwrap();

    assert_eq!(
        assignment.as_expr().unwrap().params,
        vec![Value::Text("7".into()), Value::Text("7".into())]
    );
}
