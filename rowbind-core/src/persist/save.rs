use super::{Persisted, SaveOptions, Saved};
use crate::{
    CREATED_AT, Error, Executor, Filter, Hook, ID, Record, RelationDefinition, RelationKind,
    Result, Table, UPDATED_AT, Value,
    future::{BoxFuture, FutureExt, try_join_all},
};
use time::OffsetDateTime;

/// Own fields are written as scalars: structured values become JSON text and
/// the text `"null"` is a real null.
fn normalize(value: &mut Value) {
    match value {
        Value::List(..) | Value::Map(..) => *value = Value::Varchar(value.to_json_text()),
        Value::Varchar(v) if *v == "null" => *value = Value::Null,
        _ => {}
    }
}

impl<'r> Table<'r> {
    pub(crate) fn save_record<'a, E: Executor>(
        &'a self,
        executor: &'a E,
        record: Record,
        options: SaveOptions,
    ) -> BoxFuture<'a, Result<Saved>> {
        async move {
            let name = self.name();
            let mut row = record.clone();
            let attached = self
                .model
                .relations
                .values()
                .filter_map(|relation| row.remove(&relation.name).map(|v| (relation, v)))
                .collect::<Vec<_>>();
            row.values_mut().for_each(normalize);
            if !row.has_id() {
                row.insert(ID.into(), Value::new_id());
            }
            let id = row.value(ID).clone();
            let timestamp = options.timestamp.unwrap_or_else(OffsetDateTime::now_utc);
            row.insert(UPDATED_AT.into(), timestamp.into());

            let exists = match options.exists {
                Some(exists) => exists,
                None => executor.exists(name, &Filter::eq(ID, id.clone())).await?,
            };
            let before: &[Hook] = if exists {
                &[Hook::BeforeSave]
            } else {
                &[Hook::BeforeCreate, Hook::BeforeSave]
            };
            if !self.model.hooks.proceed(name, before, &mut row) {
                return Ok(Saved::Cancelled(record));
            }

            let written = if exists {
                executor
                    .update(name, &Filter::eq(ID, id.clone()), row)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        Error::msg(format!("Table `{}` has no row with id {} to update", name, id))
                    })?
            } else {
                row.insert(CREATED_AT.into(), timestamp.into());
                executor.insert(name, row).await?
            };
            log::debug!(
                "{} `{}` row {}",
                if exists { "Updated" } else { "Inserted" },
                name,
                id
            );
            let columns = self.schema(executor).await?;
            let mut saved = self.hydrate(&columns, written);

            let persisted = try_join_all(attached.into_iter().map(|(relation, value)| {
                self.persist_relation(executor, &saved, relation, value, timestamp)
            }))
            .await?;
            for relation in persisted {
                if let Some((field, value)) = relation.mirror {
                    saved.insert(field, value);
                }
                saved.insert(relation.name, relation.value);
            }

            self.model.hooks.run(Hook::AfterSave, &mut saved)?;
            if !exists {
                self.model.hooks.run(Hook::AfterCreate, &mut saved)?;
            }
            Ok(Saved::Written(saved))
        }
        .boxed()
    }

    async fn persist_relation<E: Executor>(
        &self,
        executor: &E,
        parent: &Record,
        relation: &RelationDefinition,
        value: Value,
        timestamp: OffsetDateTime,
    ) -> Result<Persisted> {
        let options = SaveOptions::default().timestamp(timestamp);
        match relation.kind {
            RelationKind::BelongsTo => {
                self.save_belongs_to(executor, parent, relation, value, options)
                    .await
            }
            RelationKind::HasMany => {
                self.save_has_many(executor, parent, relation, value, options)
                    .await
            }
            RelationKind::HasOne => {
                self.save_has_one(executor, parent, relation, value, options)
                    .await
            }
            RelationKind::HasAndBelongsToMany => {
                self.save_has_and_belongs_to_many(executor, parent, relation, value, options)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use crate::{Record, Value};

    #[test]
    fn normalize_own_fields() {
        let mut value = Value::from(vec!["a", "b"]);
        normalize(&mut value);
        assert_eq!(value, Value::Varchar(r#"["a","b"]"#.into()));

        let mut value = Value::Map(Record::new().with("x", 1));
        normalize(&mut value);
        assert_eq!(value, Value::Varchar(r#"{"x":1}"#.into()));

        let mut value = Value::from("null");
        normalize(&mut value);
        assert_eq!(value, Value::Null);

        let mut value = Value::from("nullable");
        normalize(&mut value);
        assert_eq!(value, Value::from("nullable"));
    }
}
