use crate::{Error, Result, Value};
use std::{
    collections::BTreeMap,
    ops::{Deref, DerefMut},
};

/// Identity field, present on every persisted record.
pub const ID: &str = "id";
/// Insert timestamp, written once on create.
pub const CREATED_AT: &str = "createdAt";
/// Write timestamp, shared by a record and every relation saved along with it.
pub const UPDATED_AT: &str = "updatedAt";

/// A plain structured record: field name to [`Value`].
///
/// Fields named after a relation of the owning table carry related records
/// (`Value::Map` or `Value::List` of maps); every other field is an own column.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity, unless absent or null.
    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID).filter(|v| !v.is_null())
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    /// The value of `field`, `Null` when missing.
    pub fn value(&self, field: &str) -> &Value {
        const NULL: &Value = &Value::Null;
        self.0.get(field).unwrap_or(NULL)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Build a record out of a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match Value::from(value) {
            Value::Map(record) => Ok(record),
            other => Err(Error::msg(format!(
                "Expected a JSON object to build a record, found {}",
                other.to_json_text()
            ))),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Deref for Record {
    type Target = BTreeMap<String, Value>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Record {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = Error;
    fn try_from(value: serde_json::Value) -> Result<Self> {
        Record::from_json(value)
    }
}
