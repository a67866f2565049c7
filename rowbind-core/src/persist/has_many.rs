use super::{Persisted, SaveOptions, Saved, distinct_records, existing_ids};
use crate::{
    Executor, Filter, ID, Record, RelationDefinition, Result, Table, Value, future::try_join_all,
};

impl<'r> Table<'r> {
    /// Make the attached records the only children of the parent.
    ///
    /// Children no longer listed are detached, their foreign key nulled, never deleted.
    pub(super) async fn save_has_many<E: Executor>(
        &self,
        executor: &E,
        parent: &Record,
        relation: &RelationDefinition,
        value: Value,
        options: SaveOptions,
    ) -> Result<Persisted> {
        let related = self.related(relation);
        let children = distinct_records(self.collection(relation, value)?);
        let parent_id = parent.value(ID).clone();
        let present = children
            .iter()
            .filter_map(|child| child.id().cloned())
            .collect::<Vec<_>>();
        let detached = executor
            .update(
                related.name(),
                &Filter::eq(relation.key.clone(), parent_id.clone())
                    .and(Filter::not_in(ID, present.clone())),
                Record::new().with(relation.key.clone(), Value::Null),
            )
            .await?;
        if !detached.is_empty() {
            log::debug!(
                "Detached {} `{}` rows from `{}` {}",
                detached.len(),
                related.name(),
                self.name(),
                parent_id
            );
        }
        let existing = existing_ids(executor, related.name(), present).await?;
        let saved = try_join_all(children.into_iter().map(|mut child| {
            let exists = child.id().is_some_and(|id| existing.contains(&id.key()));
            child.insert(relation.key.clone(), parent_id.clone());
            related.save_record(executor, child, options.exists(exists))
        }))
        .await?;
        Ok(Persisted::new(
            relation,
            Value::List(
                saved
                    .into_iter()
                    .map(|v| Value::Map(Saved::into_record(v)))
                    .collect(),
            ),
        ))
    }
}
