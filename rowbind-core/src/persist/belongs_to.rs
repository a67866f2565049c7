use super::{Persisted, SaveOptions, Saved};
use crate::{Executor, Filter, ID, Record, RelationDefinition, Result, Table, Value};

impl<'r> Table<'r> {
    /// Save the referenced record and point the parent's foreign key at it.
    pub(super) async fn save_belongs_to<E: Executor>(
        &self,
        executor: &E,
        parent: &Record,
        relation: &RelationDefinition,
        value: Value,
        options: SaveOptions,
    ) -> Result<Persisted> {
        let value = match value {
            Value::Null => Value::Null,
            Value::Map(record) => {
                let related = self.related(relation);
                match related.save_record(executor, record, options).await? {
                    Saved::Written(record) => record.into(),
                    // The parent keeps pointing at its current target
                    Saved::Cancelled(record) => {
                        return Ok(Persisted::new(relation, record.into()));
                    }
                }
            }
            other => return Err(self.invalid_relation_value(relation, "a record", &other)),
        };
        let key = value
            .as_map()
            .and_then(Record::id)
            .cloned()
            .unwrap_or_default();
        if *parent.value(&relation.key) != key {
            executor
                .update(
                    self.name(),
                    &Filter::eq(ID, parent.value(ID).clone()),
                    Record::new().with(relation.key.clone(), key.clone()),
                )
                .await?;
        }
        Ok(Persisted {
            mirror: Some((relation.key.clone(), key)),
            ..Persisted::new(relation, value)
        })
    }
}
