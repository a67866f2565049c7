use super::{Persisted, SaveOptions, Saved, distinct_records, existing_ids};
use crate::{
    CREATED_AT, Executor, Filter, ID, Record, RelationDefinition, Result, Select, Table,
    UPDATED_AT, Value, future::try_join_all,
};
use std::collections::HashSet;
use time::OffsetDateTime;

impl<'r> Table<'r> {
    /// Reconcile the join rows of the parent with the attached records.
    ///
    /// Only stale join rows are deleted and only missing ones inserted, saving
    /// the same set twice leaves the join table untouched.
    pub(super) async fn save_has_and_belongs_to_many<E: Executor>(
        &self,
        executor: &E,
        parent: &Record,
        relation: &RelationDefinition,
        value: Value,
        options: SaveOptions,
    ) -> Result<Persisted> {
        let join = relation.join_table()?;
        let related = self.related(relation);
        let parent_id = parent.value(ID).clone();
        let mut targets = self.collection(relation, value)?;
        for target in targets.iter_mut().filter(|v| !v.has_id()) {
            target.insert(ID.into(), Value::new_id());
        }
        let targets = distinct_records(targets);
        let desired = targets
            .iter()
            .map(|v| v.value(ID).clone())
            .collect::<Vec<_>>();
        let desired_keys = desired.iter().map(Value::key).collect::<HashSet<_>>();

        let owned = Filter::eq(join.source_key.clone(), parent_id.clone());
        let joined = executor
            .fetch_all(&join.table_name, &Select::new(owned.clone()))
            .await?
            .into_iter()
            .map(|row| row.value(&relation.key).clone())
            .collect::<Vec<_>>();
        let stale = joined
            .iter()
            .filter(|v| !desired_keys.contains(&v.key()))
            .cloned()
            .collect::<Vec<_>>();
        if !stale.is_empty() {
            let deleted = executor
                .delete(
                    &join.table_name,
                    &owned.and(Filter::is_in(relation.key.clone(), stale)),
                )
                .await?;
            log::debug!(
                "Unjoined {} `{}` rows from `{}` {}",
                deleted.rows_affected,
                related.name(),
                self.name(),
                parent_id
            );
        }
        let joined = joined.iter().map(Value::key).collect::<HashSet<_>>();

        let existing = existing_ids(executor, related.name(), desired).await?;
        let saved = try_join_all(targets.into_iter().map(|target| {
            let exists = existing.contains(&target.value(ID).key());
            related.save_record(executor, target, options.exists(exists))
        }))
        .await?;

        let timestamp = options.timestamp.unwrap_or_else(OffsetDateTime::now_utc);
        let mut linked = HashSet::new();
        let links = saved
            .iter()
            .filter_map(|v| match v {
                Saved::Written(record) => record.id(),
                Saved::Cancelled(..) => None,
            })
            .filter(|id| !joined.contains(&id.key()) && linked.insert(id.key()))
            .map(|id| {
                Record::new()
                    .with(ID, Value::new_id())
                    .with(join.source_key.clone(), parent_id.clone())
                    .with(relation.key.clone(), id.clone())
                    .with(CREATED_AT, timestamp)
                    .with(UPDATED_AT, timestamp)
            })
            .collect::<Vec<_>>();
        if !links.is_empty() {
            log::debug!(
                "Joining {} `{}` rows to `{}` {}",
                links.len(),
                related.name(),
                self.name(),
                parent_id
            );
        }
        try_join_all(
            links
                .into_iter()
                .map(|row| executor.insert(&join.table_name, row)),
        )
        .await?;

        Ok(Persisted::new(
            relation,
            Value::List(
                saved
                    .into_iter()
                    .map(|v| Value::Map(v.into_record()))
                    .collect(),
            ),
        ))
    }
}
