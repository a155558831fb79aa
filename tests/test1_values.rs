use chrono::NaiveDate;
use easy_mssql::{Params, SqlType, SqlValue, TypedValue};

#[test]
fn plain_values_classify_onto_the_documented_wire_types() {
    assert_eq!(SqlValue::from(5_i64).wire_type(), SqlType::BigInt);
    assert_eq!(SqlValue::from(5_i32).wire_type(), SqlType::BigInt);
    assert_eq!(SqlValue::from(5.5_f64).wire_type(), SqlType::Float);
    assert_eq!(SqlValue::from(5.0_f64).wire_type(), SqlType::BigInt);
    assert_eq!(SqlValue::from("hi").wire_type(), SqlType::NVarChar);
    assert_eq!(SqlValue::from(true).wire_type(), SqlType::Bit);
    assert_eq!(SqlValue::from(vec![0_u8, 1]).wire_type(), SqlType::VarBinary);
    assert_eq!(SqlValue::Null.wire_type(), SqlType::NVarChar);

    let dt = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    assert_eq!(SqlValue::from(dt).wire_type(), SqlType::DateTime2);
}

#[test]
fn null_and_none_share_the_placeholder_type() {
    let none = SqlValue::from(Option::<i64>::None);
    assert!(none.is_null());
    assert_eq!(none.wire_type(), SqlValue::Null.wire_type());
}

#[test]
fn values_survive_classification_unchanged() {
    let blob = vec![1_u8, 2, 3];
    let v = SqlValue::from(blob.clone());
    assert_eq!(v.as_blob(), Some(blob.as_slice()));

    let v = SqlValue::from("hello world");
    assert_eq!(v.as_text(), Some("hello world"));

    let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 1)
        .unwrap();
    assert_eq!(SqlValue::from(dt).as_timestamp(), Some(dt));

    let typed = TypedValue::new(SqlType::Image, SqlValue::Blob(blob.clone())).unwrap();
    assert_eq!(typed.value().as_blob(), Some(blob.as_slice()));
}

#[test]
fn params_bind_in_insertion_order_with_unique_names() {
    let params = Params::new()
        .with("z", 1_i64)
        .with("a", 2_i64)
        .with("z", 3_i64);

    assert_eq!(params.len(), 2);
    let names: Vec<_> = params.names().collect();
    assert_eq!(names, ["z", "a"]);
    assert_eq!(params.get("z"), Some(&SqlValue::Int(3)));
    assert_eq!(params.as_refs().len(), 2);
}

#[test]
fn params_collect_from_pairs() {
    let params: Params = [("a", 1_i64), ("b", 2_i64)].into_iter().collect();
    assert_eq!(params.position("b"), Some(1));
}

#[test]
fn typed_values_are_the_escape_hatch_for_unguessable_types() {
    // A float that happens to be integral would otherwise travel as BIGINT.
    let forced = TypedValue::new(SqlType::Float, SqlValue::Float(3.0)).unwrap();
    assert_eq!(SqlValue::from(forced).wire_type(), SqlType::Float);

    // Mismatched pairings are rejected up front, not at bind time.
    assert!(TypedValue::new(SqlType::VarBinary, SqlValue::Text("nope".into())).is_err());
}
