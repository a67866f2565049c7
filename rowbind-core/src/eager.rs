use crate::{
    Executor, Filter, ID, Record, RelationDefinition, RelationKind, Result, Select, Table, Value,
    future::try_join_all,
};
use std::collections::{HashMap, HashSet};

/// Related values of one relation, ready to be grafted.
struct Loaded<'d> {
    relation: &'d RelationDefinition,
    /// Field of the owner row whose key selects the related value.
    lookup: &'d str,
    related: HashMap<String, Value>,
    /// Value of the owner rows without related rows.
    missing: Value,
}

/// Distinct non null values of `field` over `rows`.
fn distinct(rows: &[Record], field: &str) -> Vec<Value> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|row| row.value(field))
        .filter(|v| !v.is_null() && seen.insert(v.key()))
        .cloned()
        .collect()
}

impl<'r> Table<'r> {
    /// Attach the rows of the named relations to `rows`.
    ///
    /// Issues one query per relation (two for `HasAndBelongsToMany`), however
    /// many rows are given.
    pub async fn include<E: Executor, S: AsRef<str>>(
        &self,
        executor: &E,
        mut rows: Vec<Record>,
        relations: &[S],
    ) -> Result<Vec<Record>> {
        if rows.is_empty() || relations.is_empty() {
            return Ok(rows);
        }
        let relations = relations
            .iter()
            .map(|name| self.relation(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let loaded = try_join_all(
            relations
                .into_iter()
                .map(|relation| self.load(executor, &rows, relation)),
        )
        .await?;
        for Loaded {
            relation,
            lookup,
            related,
            missing,
        } in loaded
        {
            for row in rows.iter_mut() {
                let value = related
                    .get(&row.value(lookup).key())
                    .cloned()
                    .unwrap_or_else(|| missing.clone());
                row.insert(relation.name.clone(), value);
            }
        }
        Ok(rows)
    }

    async fn load<'d, E: Executor>(
        &self,
        executor: &E,
        rows: &[Record],
        relation: &'d RelationDefinition,
    ) -> Result<Loaded<'d>> {
        let table = self.related(relation);
        let mut related = HashMap::new();
        let loaded = match relation.kind {
            RelationKind::BelongsTo => {
                let keys = distinct(rows, &relation.key);
                let fetched = if keys.is_empty() {
                    Vec::new()
                } else {
                    table
                        .fetch_rows(executor, &Select::new(Filter::is_in(ID, keys)))
                        .await?
                };
                for row in fetched {
                    related.insert(row.value(ID).key(), Value::Map(row));
                }
                Loaded {
                    relation,
                    lookup: &relation.key,
                    related,
                    missing: Value::Null,
                }
            }
            RelationKind::HasMany | RelationKind::HasOne => {
                let ids = distinct(rows, ID);
                let fetched = table
                    .fetch_rows(
                        executor,
                        &Select::new(Filter::is_in(relation.key.clone(), ids)),
                    )
                    .await?;
                let many = relation.kind == RelationKind::HasMany;
                for row in fetched {
                    let key = row.value(&relation.key).key();
                    if many {
                        if let Value::List(children) =
                            related.entry(key).or_insert_with(|| Value::List(Vec::new()))
                        {
                            children.push(Value::Map(row));
                        }
                    } else {
                        related.entry(key).or_insert(Value::Map(row));
                    }
                }
                Loaded {
                    relation,
                    lookup: ID,
                    related,
                    missing: if many {
                        Value::List(Vec::new())
                    } else {
                        Value::Null
                    },
                }
            }
            RelationKind::HasAndBelongsToMany => {
                let join = relation.join_table()?;
                let ids = distinct(rows, ID);
                let links = executor
                    .fetch_all(
                        &join.table_name,
                        &Select::new(Filter::is_in(join.source_key.clone(), ids)),
                    )
                    .await?;
                let targets = distinct(&links, &relation.key);
                let fetched = if targets.is_empty() {
                    Vec::new()
                } else {
                    table
                        .fetch_rows(executor, &Select::new(Filter::is_in(ID, targets)))
                        .await?
                };
                let fetched = fetched
                    .into_iter()
                    .map(|row| (row.value(ID).key(), row))
                    .collect::<HashMap<_, _>>();
                for link in &links {
                    let Some(target) = fetched.get(&link.value(&relation.key).key()) else {
                        continue;
                    };
                    if let Value::List(targets) = related
                        .entry(link.value(&join.source_key).key())
                        .or_insert_with(|| Value::List(Vec::new()))
                    {
                        targets.push(Value::Map(target.clone()));
                    }
                }
                Loaded {
                    relation,
                    lookup: ID,
                    related,
                    missing: Value::List(Vec::new()),
                }
            }
        };
        log::debug!(
            "Loaded `{}` of {} `{}` rows, {} keys matched",
            relation.name,
            rows.len(),
            self.name(),
            loaded.related.len()
        );
        Ok(loaded)
    }
}
