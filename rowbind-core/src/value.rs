use crate::{Error, Record, Result};
use std::{
    cmp::Ordering,
    fmt::{self, Display},
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// Dynamically typed field value of a [`Record`].
///
/// `Null`, `Boolean`, `Int64`, `Float64`, `Varchar`, `Uuid` and `Timestamp` are
/// scalars and map one to one onto a column. `List` and `Map` are structured
/// values: they either carry related records attached to a relation field, or
/// JSON payloads that get serialized to text before being written.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Varchar(String),
    Uuid(Uuid),
    Timestamp(OffsetDateTime),
    List(Vec<Value>),
    Map(Record),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Int64(l), Self::Float64(r)) | (Self::Float64(r), Self::Int64(l)) => {
                *l as f64 == *r
            }
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Uuid(l), Self::Varchar(r)) | (Self::Varchar(r), Self::Uuid(l)) => {
                Uuid::parse_str(r).is_ok_and(|r| r == *l)
            }
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::List(l), Self::List(r)) => l == r,
            (Self::Map(l), Self::Map(r)) => l == r,
            _ => false,
        }
    }
}

impl Value {
    /// A fresh client side identity.
    pub fn new_id() -> Self {
        Value::Uuid(Uuid::new_v4())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::Float64(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Canonical text of the value, equal for every pair of values that compare equal.
    ///
    /// Used to group and index rows by identity or foreign key.
    pub fn key(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float64(v) if v.fract() == 0.0 && v.is_finite() => (*v as i64).to_string(),
            Value::Float64(v) => v.to_string(),
            Value::Varchar(v) => match Uuid::parse_str(v) {
                Ok(uuid) => uuid.hyphenated().to_string(),
                Err(..) => v.clone(),
            },
            Value::Uuid(v) => v.hyphenated().to_string(),
            Value::Timestamp(v) => v.format(&Rfc3339).unwrap_or_else(|_| v.to_string()),
            Value::List(..) | Value::Map(..) => self.to_json_text(),
        }
    }

    /// Total order used for sorting, `Null` comes first.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Boolean(l), Value::Boolean(r)) => l.cmp(r),
            (Value::Int64(l), Value::Int64(r)) => l.cmp(r),
            (Value::Int64(l), Value::Float64(r)) => (*l as f64).total_cmp(r),
            (Value::Float64(l), Value::Int64(r)) => l.total_cmp(&(*r as f64)),
            (Value::Float64(l), Value::Float64(r)) => l.total_cmp(r),
            (Value::Varchar(l), Value::Varchar(r)) => l.cmp(r),
            (Value::Timestamp(l), Value::Timestamp(r)) => l.cmp(r),
            _ => self.key().cmp(&other.key()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(v) => (*v).into(),
            Value::Int64(v) => (*v).into(),
            Value::Float64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Varchar(v) => v.clone().into(),
            Value::Uuid(..) | Value::Timestamp(..) => self.key().into(),
            Value::List(v) => v.iter().map(Value::to_json).collect(),
            Value::Map(v) => v.to_json(),
        }
    }

    pub fn to_json_text(&self) -> String {
        self.to_json().to_string()
    }

    /// Parse JSON text back into a structured value.
    pub fn parse_json_text(text: &str) -> Result<Self> {
        serde_json::from_str::<serde_json::Value>(text)
            .map(Into::into)
            .map_err(|e| Error::new(e).context(format!("Could not parse `{}` as JSON", text)))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Varchar(v) => write!(f, "'{}'", v),
            _ => f.write_str(&self.key()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Boolean(v),
            serde_json::Value::Number(v) => match v.as_i64() {
                Some(v) => Value::Int64(v),
                None => v.as_f64().map(Value::Float64).unwrap_or(Value::Null),
            },
            serde_json::Value::String(v) => Value::Varchar(v),
            serde_json::Value::Array(v) => Value::List(v.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(v) => Value::Map(
                v.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

macro_rules! impl_from_value {
    ($source:ty, $into:path $(, $conv:expr)?) => {
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                $into($($conv)?(value))
            }
        }
    };
}

impl_from_value!(bool, Value::Boolean);
impl_from_value!(i32, Value::Int64, i64::from);
impl_from_value!(i64, Value::Int64);
impl_from_value!(u32, Value::Int64, i64::from);
impl_from_value!(f64, Value::Float64);
impl_from_value!(String, Value::Varchar);
impl_from_value!(&str, Value::Varchar, str::to_owned);
impl_from_value!(Uuid, Value::Uuid);
impl_from_value!(OffsetDateTime, Value::Timestamp);
impl_from_value!(Record, Value::Map);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}
