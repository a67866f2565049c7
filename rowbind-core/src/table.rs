use crate::{
    ColumnDef, ColumnType, Error, Executor, Filter, ID, OrmError, Query, Record, Registry,
    RelationDefinition, Result, RowsAffected, Select, Value, registry::Model,
};
use std::sync::Arc;

/// Handle on a mapped table.
///
/// Cheap to clone; every handle on the same name shares one definition, and
/// with it the cached schema.
#[derive(Clone)]
pub struct Table<'r> {
    pub(crate) model: Arc<Model>,
    registry: &'r Registry,
}

impl<'r> Table<'r> {
    pub(crate) fn new(model: Arc<Model>, registry: &'r Registry) -> Self {
        Self { model, registry }
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    /// The relations of the table, sorted by name.
    pub fn relations(&self) -> impl Iterator<Item = &RelationDefinition> {
        self.model.relations.values()
    }

    pub fn relation(&self, name: &str) -> Result<&RelationDefinition> {
        self.model.relations.get(name).ok_or_else(|| {
            OrmError::UnknownRelationName {
                table: self.name().into(),
                relation: name.into(),
            }
            .into()
        })
    }

    /// Handle on the target table of `relation`.
    pub fn related(&self, relation: &RelationDefinition) -> Table<'r> {
        self.registry.table(&relation.table_name)
    }

    /// Columns of the table, introspected on first use and cached from then on.
    pub async fn schema<E: Executor>(&self, executor: &E) -> Result<Arc<[ColumnDef]>> {
        self.model
            .schema
            .get_or_try_init(|| async {
                let columns = executor.columns(self.name()).await?;
                log::debug!("Cached {} columns of `{}`", columns.len(), self.name());
                Ok::<_, Error>(columns.into())
            })
            .await
            .cloned()
    }

    /// Decode the JSON text stored in `Json` columns.
    pub(crate) fn hydrate(&self, columns: &[ColumnDef], mut row: Record) -> Record {
        for column in columns.iter().filter(|c| c.column_type == ColumnType::Json) {
            let Some(value) = row.get_mut(column.name()) else {
                continue;
            };
            if let Value::Varchar(text) = value
                && let Ok(parsed) = Value::parse_json_text(text)
            {
                *value = parsed;
            }
        }
        row
    }

    pub(crate) async fn hydrate_rows<E: Executor>(
        &self,
        executor: &E,
        rows: Vec<Record>,
    ) -> Result<Vec<Record>> {
        if rows.is_empty() {
            return Ok(rows);
        }
        let columns = self.schema(executor).await?;
        Ok(rows
            .into_iter()
            .map(|row| self.hydrate(&columns, row))
            .collect())
    }

    /// Rows selected by `select`, decoded.
    pub async fn fetch_rows<E: Executor>(
        &self,
        executor: &E,
        select: &Select,
    ) -> Result<Vec<Record>> {
        let rows = executor.fetch_all(self.name(), select).await?;
        self.hydrate_rows(executor, rows).await
    }

    pub async fn find<E: Executor>(
        &self,
        executor: &E,
        id: impl Into<Value>,
    ) -> Result<Option<Record>> {
        let filter = Filter::eq(ID, id);
        let Some(row) = executor.fetch_one(self.name(), &filter).await? else {
            return Ok(None);
        };
        let columns = self.schema(executor).await?;
        Ok(Some(self.hydrate(&columns, row)))
    }

    pub async fn all<E: Executor>(&self, executor: &E) -> Result<Vec<Record>> {
        self.query().all(executor).await
    }

    pub async fn count<E: Executor>(&self, executor: &E, filter: &Filter) -> Result<u64> {
        executor.count(self.name(), filter).await
    }

    /// Delete every matching row in one statement: no hooks, no cascade.
    pub async fn bulk_destroy<E: Executor>(
        &self,
        executor: &E,
        filter: &Filter,
    ) -> Result<RowsAffected> {
        let result = executor.delete(self.name(), filter).await?;
        log::debug!(
            "Bulk deleted {} rows from `{}`",
            result.rows_affected,
            self.name()
        );
        Ok(result)
    }

    pub fn query(&self) -> Query<'r> {
        Query::new(self.clone())
    }
}
