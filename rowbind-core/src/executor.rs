use crate::{
    ColumnDef, Filter, Record, Result, Select,
    stream::{Stream, TryStreamExt},
};
use std::{future::Future, pin::pin};

/// Metadata about modify operations.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
        }
    }
}

/// Table scoped access to the underlying storage.
///
/// Connections and transactions both implement it: every engine operation takes
/// the executor it must run on, so passing a transaction scopes the whole
/// operation (nested relation writes included) to that transaction.
///
/// Methods take `&self` because the engine issues independent queries of the
/// same operation concurrently.
pub trait Executor: Send + Sync {
    /// Stream the rows selected by `select`.
    fn select(&self, table: &str, select: &Select) -> impl Stream<Item = Result<Record>> + Send;

    fn count(&self, table: &str, filter: &Filter) -> impl Future<Output = Result<u64>> + Send;

    /// Insert one row, returning it as persisted.
    fn insert(&self, table: &str, row: Record) -> impl Future<Output = Result<Record>> + Send;

    /// Merge `changes` into every matching row, returning the rows after the update.
    fn update(
        &self,
        table: &str,
        filter: &Filter,
        changes: Record,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send;

    fn delete(
        &self,
        table: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Column introspection, fails with [`crate::OrmError::NoSuchTable`].
    fn columns(&self, table: &str) -> impl Future<Output = Result<Vec<ColumnDef>>> + Send;

    fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDef],
        if_not_exists: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    fn drop_table(&self, table: &str, if_exists: bool) -> impl Future<Output = Result<()>> + Send;

    /// Execute the select and collect the rows.
    fn fetch_all(
        &self,
        table: &str,
        select: &Select,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send {
        self.select(table, select).try_collect()
    }

    /// First row matching `filter`.
    fn fetch_one(
        &self,
        table: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Option<Record>>> + Send {
        let select = Select::new(filter.clone()).limit(1);
        async move {
            let mut stream = pin!(self.select(table, &select));
            stream.try_next().await
        }
    }

    fn exists(&self, table: &str, filter: &Filter) -> impl Future<Output = Result<bool>> + Send {
        async move { Ok(self.count(table, filter).await? > 0) }
    }
}
