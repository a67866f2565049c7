use crate::{
    Error, Executor, Filter, Hook, ID, Record, RelationDefinition, RelationKind, Result, Select,
    Table, Value,
    future::{BoxFuture, FutureExt, try_join_all},
};

impl<'r> Table<'r> {
    /// Delete the row of `record` and cascade through its relations.
    ///
    /// Join rows are always removed. Dependent children, and the record a
    /// dependent `BelongsTo` points at, are destroyed with their own hooks and
    /// cascades; children of the other relations are detached. When a
    /// `BeforeDestroy` hook refuses, nothing is deleted and `record` is
    /// returned unmodified.
    pub async fn destroy<E: Executor>(&self, executor: &E, record: Record) -> Result<Record> {
        self.destroy_record(executor, record).await
    }

    /// Destroy each record independently and concurrently.
    pub async fn destroy_many<E: Executor>(
        &self,
        executor: &E,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Vec<Record>> {
        try_join_all(
            records
                .into_iter()
                .map(|r| self.destroy_record(executor, r)),
        )
        .await
    }

    pub(crate) fn destroy_record<'a, E: Executor>(
        &'a self,
        executor: &'a E,
        record: Record,
    ) -> BoxFuture<'a, Result<Record>> {
        async move {
            let name = self.name();
            let mut row = record.clone();
            if !self
                .model
                .hooks
                .proceed(name, &[Hook::BeforeDestroy], &mut row)
            {
                return Ok(record);
            }
            let Some(id) = row.id().cloned() else {
                return Err(Error::msg(format!(
                    "Cannot destroy a `{}` record without id",
                    name
                )));
            };
            let owner = Filter::eq(ID, id.clone());
            let needs_stored = self.relations().any(|relation| {
                relation.kind == RelationKind::BelongsTo
                    && relation.dependent
                    && !row.contains_key(&relation.key)
            });
            let stored = if needs_stored {
                executor.fetch_one(name, &owner).await?
            } else {
                None
            };
            let stored = stored.as_ref().unwrap_or(&row);

            let deleted = executor.delete(name, &owner).await?;
            log::debug!(
                "Deleted `{}` row {} ({} affected)",
                name,
                id,
                deleted.rows_affected
            );
            try_join_all(
                self.relations()
                    .map(|relation| self.cascade(executor, relation, &id, stored)),
            )
            .await?;

            self.model.hooks.run(Hook::AfterDestroy, &mut row)?;
            Ok(row)
        }
        .boxed()
    }

    async fn cascade<E: Executor>(
        &self,
        executor: &E,
        relation: &RelationDefinition,
        id: &Value,
        stored: &Record,
    ) -> Result<()> {
        let related = self.related(relation);
        match relation.kind {
            RelationKind::HasAndBelongsToMany => {
                let join = relation.join_table()?;
                executor
                    .delete(
                        &join.table_name,
                        &Filter::eq(join.source_key.clone(), id.clone()),
                    )
                    .await?;
            }
            RelationKind::HasMany | RelationKind::HasOne if relation.dependent => {
                let children = related
                    .fetch_rows(
                        executor,
                        &Select::new(Filter::eq(relation.key.clone(), id.clone())),
                    )
                    .await?;
                log::debug!(
                    "Destroying {} dependent `{}` rows of `{}` {}",
                    children.len(),
                    related.name(),
                    self.name(),
                    id
                );
                try_join_all(
                    children
                        .into_iter()
                        .map(|child| related.destroy_record(executor, child)),
                )
                .await?;
            }
            RelationKind::HasMany | RelationKind::HasOne => {
                executor
                    .update(
                        related.name(),
                        &Filter::eq(relation.key.clone(), id.clone()),
                        Record::new().with(relation.key.clone(), Value::Null),
                    )
                    .await?;
            }
            RelationKind::BelongsTo if relation.dependent => {
                let key = stored.value(&relation.key);
                if key.is_null() {
                    return Ok(());
                }
                let target = related.find(executor, key.clone()).await?;
                if let Some(target) = target {
                    related.destroy_record(executor, target).await?;
                }
            }
            RelationKind::BelongsTo => {}
        }
        Ok(())
    }
}
