use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::EasyMssqlError;

/// Values that can be bound as query parameters or read back from a row.
///
/// Plain Rust values convert via `From`, so the common cases need no explicit
/// construction:
/// ```rust
/// use easy_mssql::{Params, SqlValue};
///
/// let params = Params::new()
///     .with("id", 1_i64)
///     .with("name", "alice")
///     .with("photo", SqlValue::Null);
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value (carried as NVARCHAR text on the wire)
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// A pre-typed parameter: the caller supplies both wire type and value,
    /// for types the inference in [`SqlValue::wire_type`] cannot guess.
    Typed(TypedValue),
}

/// TDS wire parameter types this layer can declare.
///
/// Re-exported so callers can construct [`SqlValue::Typed`] parameters
/// manually. Plain values are classified onto this catalogue by
/// [`SqlValue::wire_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Float,
    VarChar,
    NVarChar,
    VarBinary,
    Image,
    DateTime,
    DateTime2,
}

/// A caller-typed parameter value.
///
/// The inference table maps every plain value to one wire type; when that
/// guess is wrong (fixed-length binary, a genuine float carrying an integral
/// value), wrap the value with the type you mean:
/// ```rust
/// use easy_mssql::{SqlType, SqlValue, TypedValue};
///
/// let forced_float = TypedValue::new(SqlType::Float, SqlValue::Float(2.0)).unwrap();
/// # let _ = forced_float;
/// ```
/// Note that tiberius declares parameter types per encoding family, so the
/// string types all travel as NVARCHAR and the binary types as VARBINARY.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    sql_type: SqlType,
    value: Box<SqlValue>,
}

impl TypedValue {
    /// Pair a wire type with a value.
    ///
    /// # Errors
    ///
    /// Returns `EasyMssqlError::ParameterError` when the value cannot be
    /// encoded as the declared type, or when the value is itself pre-typed.
    pub fn new(sql_type: SqlType, value: SqlValue) -> Result<Self, EasyMssqlError> {
        let compatible = match (&sql_type, &value) {
            (_, SqlValue::Null) => true,
            (_, SqlValue::Typed(_)) => false,
            (SqlType::Bit, SqlValue::Bool(_)) => true,
            (
                SqlType::TinyInt | SqlType::SmallInt | SqlType::Int | SqlType::BigInt,
                SqlValue::Int(_),
            ) => true,
            (
                SqlType::TinyInt | SqlType::SmallInt | SqlType::Int | SqlType::BigInt,
                SqlValue::Float(f),
            ) => f.fract() == 0.0,
            (SqlType::Real | SqlType::Float, SqlValue::Int(_) | SqlValue::Float(_)) => true,
            (SqlType::VarChar | SqlType::NVarChar, SqlValue::Text(_) | SqlValue::Json(_)) => true,
            (SqlType::VarBinary | SqlType::Image, SqlValue::Blob(_)) => true,
            (SqlType::DateTime | SqlType::DateTime2, SqlValue::Timestamp(_)) => true,
            _ => false,
        };

        if compatible {
            Ok(Self {
                sql_type,
                value: Box::new(value),
            })
        } else {
            Err(EasyMssqlError::ParameterError(format!(
                "value {value:?} cannot be sent as {sql_type:?}"
            )))
        }
    }

    /// The declared wire type.
    #[must_use]
    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &SqlValue {
        &self.value
    }
}

impl SqlValue {
    /// The wire type this value is sent as.
    ///
    /// The mapping is fixed: blobs go as VARBINARY, timestamps as DATETIME2,
    /// strings and JSON as NVARCHAR, booleans as BIT. Numbers go as BIGINT
    /// when they have no fractional part and FLOAT otherwise. NULL uses the
    /// NVARCHAR placeholder since TDS encodes null the same way regardless of
    /// the declared type. Pre-typed values report their declared type.
    #[must_use]
    pub fn wire_type(&self) -> SqlType {
        match self {
            SqlValue::Int(_) => SqlType::BigInt,
            SqlValue::Float(f) if f.fract() == 0.0 => SqlType::BigInt,
            SqlValue::Float(_) => SqlType::Float,
            SqlValue::Text(_) | SqlValue::Json(_) | SqlValue::Null => SqlType::NVarChar,
            SqlValue::Bool(_) => SqlType::Bit,
            SqlValue::Timestamp(_) => SqlType::DateTime2,
            SqlValue::Blob(_) => SqlType::VarBinary,
            SqlValue::Typed(t) => t.sql_type(),
        }
    }

    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Blob(value)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(value: &[u8]) -> Self {
        SqlValue::Blob(value.to_vec())
    }
}

impl From<JsonValue> for SqlValue {
    fn from(value: JsonValue) -> Self {
        SqlValue::Json(value)
    }
}

impl From<TypedValue> for SqlValue {
    fn from(value: TypedValue) -> Self {
        SqlValue::Typed(value)
    }
}

/// `None` binds as NULL, mirroring how absent values travel on the wire.
impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}
