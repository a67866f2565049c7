use super::{Persisted, SaveOptions};
use crate::{Executor, Filter, ID, Record, RelationDefinition, Result, Table, Value};

impl<'r> Table<'r> {
    pub(super) async fn save_has_one<E: Executor>(
        &self,
        executor: &E,
        parent: &Record,
        relation: &RelationDefinition,
        value: Value,
        options: SaveOptions,
    ) -> Result<Persisted> {
        let related = self.related(relation);
        let parent_id = parent.value(ID).clone();
        let unset = Record::new().with(relation.key.clone(), Value::Null);
        let owned = Filter::eq(relation.key.clone(), parent_id.clone());
        let mut child = match value {
            Value::Map(record) => record,
            Value::Null => {
                executor.update(related.name(), &owned, unset).await?;
                return Ok(Persisted::new(relation, Value::Null));
            }
            other => return Err(self.invalid_relation_value(relation, "a record", &other)),
        };
        if !child.has_id() {
            child.insert(ID.into(), Value::new_id());
        }
        let id = child.value(ID).clone();
        executor
            .update(
                related.name(),
                &owned.and(Filter::ne(ID, id.clone())),
                unset,
            )
            .await?;
        let exists = executor
            .exists(related.name(), &Filter::eq(ID, id))
            .await?;
        child.insert(relation.key.clone(), parent_id);
        let saved = related
            .save_record(executor, child, options.exists(exists))
            .await?;
        Ok(Persisted::new(relation, saved.into_record().into()))
    }
}
