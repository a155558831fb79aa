use std::borrow::Cow;

use tiberius::{ColumnData, ToSql};

use crate::types::{SqlType, SqlValue, TypedValue};

/// An ordered set of named parameters.
///
/// Binding order is insertion order; names are stored without the `@` sigil.
/// Pushing a name that already exists replaces its value in place, so names
/// stay unique and keep their original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, SqlValue)>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Insert or replace a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        let raw: String = name.into();
        let name = raw.strip_prefix('@').map(str::to_string).unwrap_or(raw);
        let value = value.into();
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Zero-based binding position of a parameter, matched like T-SQL
    /// variable names (ASCII case-insensitive).
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.position(name).map(|idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the values as a driver parameter array, in binding order.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn ToSql> {
        let mut references: Vec<&dyn ToSql> = Vec::with_capacity(self.entries.len());
        for (_, value) in &self.entries {
            references.push(value as &dyn ToSql);
        }
        references
    }
}

impl<N: Into<String>, V: Into<SqlValue>> FromIterator<(N, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

/// ToSql for SqlValue, so parameters bind without a conversion step.
///
/// This is the normalization table: each variant is encoded per its
/// [`SqlValue::wire_type`]. NULL travels as a typeless NVARCHAR placeholder
/// since TDS encodes null identically regardless of declared type.
impl ToSql for SqlValue {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            SqlValue::Int(i) => ColumnData::I64(Some(*i)),
            SqlValue::Float(f) if f.fract() == 0.0 && in_i64_range(*f) => {
                ColumnData::I64(Some(*f as i64))
            }
            SqlValue::Float(f) => ColumnData::F64(Some(*f)),
            SqlValue::Text(s) => ColumnData::String(Some(Cow::from(s.as_str()))),
            SqlValue::Bool(b) => ColumnData::Bit(Some(*b)),
            SqlValue::Timestamp(dt) => dt.to_sql(),
            SqlValue::Null => ColumnData::String(None),
            SqlValue::Json(jsval) => ColumnData::String(Some(Cow::from(jsval.to_string()))),
            SqlValue::Blob(bytes) => ColumnData::Binary(Some(Cow::from(bytes.as_slice()))),
            SqlValue::Typed(typed) => encode_typed(typed),
        }
    }
}

fn in_i64_range(f: f64) -> bool {
    f >= i64::MIN as f64 && f <= i64::MAX as f64
}

// Encode a pre-typed value per its declared type family. TypedValue::new has
// already validated the pairing, so unreachable combinations fall back to a
// null of the declared family.
fn encode_typed(typed: &TypedValue) -> ColumnData<'_> {
    let value = typed.value();
    match typed.sql_type() {
        SqlType::Bit => ColumnData::Bit(value.as_bool().copied()),
        SqlType::TinyInt => ColumnData::U8(integral(value).map(|i| i as u8)),
        SqlType::SmallInt => ColumnData::I16(integral(value).map(|i| i as i16)),
        SqlType::Int => ColumnData::I32(integral(value).map(|i| i as i32)),
        SqlType::BigInt => ColumnData::I64(integral(value)),
        SqlType::Real => ColumnData::F32(numeric(value).map(|f| f as f32)),
        SqlType::Float => ColumnData::F64(numeric(value)),
        SqlType::VarChar | SqlType::NVarChar => ColumnData::String(text(value)),
        SqlType::VarBinary | SqlType::Image => {
            ColumnData::Binary(value.as_blob().map(Cow::from))
        }
        SqlType::DateTime | SqlType::DateTime2 => match value {
            SqlValue::Timestamp(dt) => dt.to_sql(),
            _ => ColumnData::DateTime2(None),
        },
    }
}

fn integral(value: &SqlValue) -> Option<i64> {
    match value {
        SqlValue::Int(i) => Some(*i),
        SqlValue::Float(f) if f.fract() == 0.0 && in_i64_range(*f) => Some(*f as i64),
        _ => None,
    }
}

fn numeric(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Int(i) => Some(*i as f64),
        SqlValue::Float(f) => Some(*f),
        _ => None,
    }
}

fn text(value: &SqlValue) -> Option<Cow<'_, str>> {
    match value {
        SqlValue::Text(s) => Some(Cow::from(s.as_str())),
        SqlValue::Json(jsval) => Some(Cow::from(jsval.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn binding_order_is_insertion_order() {
        let params = Params::new().with("b", 1_i64).with("a", 2_i64);
        let names: Vec<_> = params.names().collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(params.position("a"), Some(1));
    }

    #[test]
    fn duplicate_push_replaces_in_place() {
        let params = Params::new()
            .with("a", 1_i64)
            .with("b", 2_i64)
            .with("A", 3_i64);
        assert_eq!(params.len(), 2);
        assert_eq!(params.position("a"), Some(0));
        assert_eq!(params.get("a"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn at_sigil_is_stripped_from_names() {
        let params = Params::new().with("@id", 1_i64);
        assert_eq!(params.position("id"), Some(0));
    }

    #[test]
    fn null_encodes_as_typeless_string() {
        assert!(matches!(SqlValue::Null.to_sql(), ColumnData::String(None)));
    }

    #[test]
    fn integral_float_encodes_as_i64() {
        assert!(matches!(
            SqlValue::Float(4.0).to_sql(),
            ColumnData::I64(Some(4))
        ));
        assert!(matches!(
            SqlValue::Float(4.5).to_sql(),
            ColumnData::F64(Some(_))
        ));
    }

    #[test]
    fn text_and_blob_pass_through_unchanged() {
        let text = SqlValue::Text("hello".into());
        match text.to_sql() {
            ColumnData::String(Some(s)) => assert_eq!(s, "hello"),
            other => panic!("unexpected encoding: {other:?}"),
        }

        let blob = SqlValue::Blob(vec![1, 2, 3]);
        match blob.to_sql() {
            ColumnData::Binary(Some(b)) => assert_eq!(b.as_ref(), &[1, 2, 3]),
            other => panic!("unexpected encoding: {other:?}"),
        }
    }

    #[test]
    fn timestamp_encodes_via_chrono() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 1)
            .unwrap();
        assert!(matches!(
            SqlValue::Timestamp(dt).to_sql(),
            ColumnData::DateTime2(Some(_))
        ));
    }

    #[test]
    fn typed_value_encodes_per_declared_family() {
        let narrow = TypedValue::new(SqlType::Int, SqlValue::Int(7)).unwrap();
        assert!(matches!(
            SqlValue::Typed(narrow).to_sql(),
            ColumnData::I32(Some(7))
        ));

        let forced_float = TypedValue::new(SqlType::Float, SqlValue::Float(2.0)).unwrap();
        assert!(matches!(
            SqlValue::Typed(forced_float).to_sql(),
            ColumnData::F64(Some(_))
        ));

        let typed_null = TypedValue::new(SqlType::BigInt, SqlValue::Null).unwrap();
        assert!(matches!(
            SqlValue::Typed(typed_null).to_sql(),
            ColumnData::I64(None)
        ));
    }
}
