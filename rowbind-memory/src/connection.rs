use crate::{MemoryTransaction, store::Store};
use async_stream::try_stream;
use rowbind_core::{
    ColumnDef, Connection, Context, Error, Executor, Filter, Record, Result, RowsAffected, Select,
    stream::Stream,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

pub const SCHEME: &str = "memory";

/// Storage-less backend: tables live in process memory.
///
/// Clones share the same tables.
#[derive(Default, Debug, Clone)]
pub struct MemoryConnection {
    pub(crate) store: Arc<RwLock<Store>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_store(store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Names of the tables, sorted.
    pub async fn table_names(&self) -> Vec<String> {
        self.store.read().await.table_names()
    }
}

impl Executor for MemoryConnection {
    fn select(&self, table: &str, select: &Select) -> impl Stream<Item = Result<Record>> + Send {
        try_stream! {
            let rows = self.store.read().await.select(table, select)?;
            for row in rows {
                yield row;
            }
        }
    }

    async fn count(&self, table: &str, filter: &Filter) -> Result<u64> {
        self.store.read().await.count(table, filter)
    }

    async fn insert(&self, table: &str, row: Record) -> Result<Record> {
        self.store
            .write()
            .await
            .insert(table, row)
            .with_context(|| format!("While inserting into `{}`", table))
    }

    async fn update(&self, table: &str, filter: &Filter, changes: Record) -> Result<Vec<Record>> {
        self.store
            .write()
            .await
            .update(table, filter, changes)
            .with_context(|| format!("While updating `{}`", table))
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<RowsAffected> {
        self.store.write().await.delete(table, filter)
    }

    async fn columns(&self, table: &str) -> Result<Vec<ColumnDef>> {
        self.store.read().await.columns(table)
    }

    async fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDef],
        if_not_exists: bool,
    ) -> Result<()> {
        self.store
            .write()
            .await
            .create_table(table, columns, if_not_exists)
    }

    async fn drop_table(&self, table: &str, if_exists: bool) -> Result<()> {
        self.store.write().await.drop_table(table, if_exists)
    }
}

impl Connection for MemoryConnection {
    async fn connect(url: &str) -> Result<MemoryConnection> {
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let parsed = Url::parse(url).with_context(context)?;
        if parsed.scheme() != SCHEME {
            return Err(Error::msg(format!(
                "Expected memory connection url to start with `{}://`",
                SCHEME
            ))
            .context(context()));
        }
        log::debug!("Opened in-memory store for `{}`", url);
        Ok(MemoryConnection::new())
    }

    #[allow(refining_impl_trait)]
    async fn begin(&self) -> Result<MemoryTransaction<'_>> {
        Ok(MemoryTransaction::new(self).await)
    }
}
