mod belongs_to;
mod has_and_belongs_to_many;
mod has_many;
mod has_one;
mod save;

use crate::{
    Error, Executor, Filter, ID, OrmError, Record, RelationDefinition, Result, Select, Table, Value,
    future::try_join_all,
};
use std::collections::HashSet;
use time::OffsetDateTime;

/// Options of a single save.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct SaveOptions {
    /// Skip the existence query: `true` updates, `false` inserts.
    pub exists: Option<bool>,
    /// Write timestamp, now when missing.
    pub timestamp: Option<OffsetDateTime>,
}

impl SaveOptions {
    pub fn exists(mut self, exists: bool) -> Self {
        self.exists = Some(exists);
        self
    }

    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Outcome of the save pipeline.
#[derive(Debug)]
pub(crate) enum Saved {
    Written(Record),
    /// A before hook refused, this is the input as given.
    Cancelled(Record),
}

impl Saved {
    pub(crate) fn into_record(self) -> Record {
        match self {
            Saved::Written(v) | Saved::Cancelled(v) => v,
        }
    }
}

/// Result of persisting one relation field.
pub(crate) struct Persisted {
    pub(crate) name: String,
    pub(crate) value: Value,
    /// Field the parent adopts along with the relation value.
    pub(crate) mirror: Option<(String, Value)>,
}

impl Persisted {
    fn new(relation: &RelationDefinition, value: Value) -> Self {
        Self {
            name: relation.name.clone(),
            value,
            mirror: None,
        }
    }
}

impl<'r> Table<'r> {
    /// Insert or update `record` along with the related records attached to it.
    ///
    /// Returns the record as persisted, or `record` itself when a before hook
    /// cancelled the save.
    pub async fn save<E: Executor>(&self, executor: &E, record: Record) -> Result<Record> {
        self.save_with(executor, record, SaveOptions::default())
            .await
    }

    pub async fn save_with<E: Executor>(
        &self,
        executor: &E,
        record: Record,
        options: SaveOptions,
    ) -> Result<Record> {
        Ok(self
            .save_record(executor, record, options)
            .await?
            .into_record())
    }

    /// Save each record independently and concurrently.
    pub async fn save_many<E: Executor>(
        &self,
        executor: &E,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Vec<Record>> {
        let saved = try_join_all(
            records
                .into_iter()
                .map(|r| self.save_record(executor, r, SaveOptions::default())),
        )
        .await?;
        Ok(saved.into_iter().map(Saved::into_record).collect())
    }

    pub async fn create<E: Executor>(&self, executor: &E, record: Record) -> Result<Record> {
        self.save(executor, record).await
    }

    pub async fn create_many<E: Executor>(
        &self,
        executor: &E,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Vec<Record>> {
        self.save_many(executor, records).await
    }

    /// Save a record or a list of records, keeping the shape.
    pub async fn save_value<E: Executor>(&self, executor: &E, value: Value) -> Result<Value> {
        match value {
            Value::Map(record) => Ok(self.save(executor, record).await?.into()),
            Value::List(items) => {
                let records = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Map(record) => Ok(record),
                        other => Err(self.not_a_record(&other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.save_many(executor, records).await?.into())
            }
            other => Err(self.not_a_record(&other)),
        }
    }

    fn not_a_record(&self, value: &Value) -> Error {
        Error::msg(format!(
            "Cannot save {} into `{}`, expected a record",
            value.to_json_text(),
            self.name()
        ))
    }

    /// The records attached to a collection relation, `Null` being no records.
    pub(crate) fn collection(
        &self,
        relation: &RelationDefinition,
        value: Value,
    ) -> Result<Vec<Record>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Map(record) => Ok(record),
                    other => Err(self.invalid_relation_value(relation, "a list of records", &other)),
                })
                .collect(),
            other => Err(self.invalid_relation_value(relation, "a list of records", &other)),
        }
    }

    pub(crate) fn invalid_relation_value(
        &self,
        relation: &RelationDefinition,
        expected: &'static str,
        found: &Value,
    ) -> Error {
        OrmError::InvalidRelationValue {
            table: self.name().into(),
            relation: relation.name.clone(),
            expected,
            found: found.to_json_text(),
        }
        .into()
    }
}

/// Drop the records repeating the id of an earlier one, records without id are all kept.
pub(crate) fn distinct_records(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| record.id().is_none_or(|id| seen.insert(id.key())))
        .collect()
}

/// Keys of the `ids` that exist as rows of `table`, in a single query.
pub(crate) async fn existing_ids<E: Executor>(
    executor: &E,
    table: &str,
    ids: Vec<Value>,
) -> Result<HashSet<String>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let rows = executor
        .fetch_all(table, &Select::new(Filter::is_in(ID, ids)))
        .await?;
    Ok(rows.iter().map(|r| r.value(ID).key()).collect())
}

#[cfg(test)]
mod tests {
    use super::distinct_records;
    use crate::{ID, Record};

    #[test]
    fn repeated_ids_are_dropped() {
        let first = Record::new().with(ID, "a").with("n", 1);
        let records = distinct_records(vec![
            first.clone(),
            Record::new().with("n", 2),
            Record::new().with(ID, "a").with("n", 3),
            Record::new().with("n", 4),
        ]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], first);
        assert!(records.iter().all(|r| r.value("n").as_i64() != Some(3)));
    }
}
