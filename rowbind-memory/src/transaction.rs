use crate::MemoryConnection;
use rowbind_core::{
    ColumnDef, Executor, Filter, Record, Result, RowsAffected, Select, Transaction,
    stream::Stream,
};
use std::mem;

/// Works on a snapshot of the store taken at `begin`.
///
/// `commit` publishes the snapshot, replacing whatever the connection holds;
/// `rollback`, or dropping the transaction, discards it.
pub struct MemoryTransaction<'c> {
    connection: &'c MemoryConnection,
    snapshot: MemoryConnection,
}

impl<'c> MemoryTransaction<'c> {
    pub async fn new(connection: &'c MemoryConnection) -> Self {
        let snapshot = MemoryConnection::from_store(connection.store.read().await.clone());
        log::debug!("Began memory transaction");
        Self {
            connection,
            snapshot,
        }
    }
}

impl<'c> Executor for MemoryTransaction<'c> {
    fn select(&self, table: &str, select: &Select) -> impl Stream<Item = Result<Record>> + Send {
        self.snapshot.select(table, select)
    }

    fn count(&self, table: &str, filter: &Filter) -> impl Future<Output = Result<u64>> + Send {
        self.snapshot.count(table, filter)
    }

    fn insert(&self, table: &str, row: Record) -> impl Future<Output = Result<Record>> + Send {
        self.snapshot.insert(table, row)
    }

    fn update(
        &self,
        table: &str,
        filter: &Filter,
        changes: Record,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send {
        self.snapshot.update(table, filter, changes)
    }

    fn delete(
        &self,
        table: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.snapshot.delete(table, filter)
    }

    fn columns(&self, table: &str) -> impl Future<Output = Result<Vec<ColumnDef>>> + Send {
        self.snapshot.columns(table)
    }

    fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDef],
        if_not_exists: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        self.snapshot.create_table(table, columns, if_not_exists)
    }

    fn drop_table(&self, table: &str, if_exists: bool) -> impl Future<Output = Result<()>> + Send {
        self.snapshot.drop_table(table, if_exists)
    }
}

impl<'c> Transaction<'c> for MemoryTransaction<'c> {
    async fn commit(self) -> Result<()> {
        let snapshot = mem::take(&mut *self.snapshot.store.write().await);
        *self.connection.store.write().await = snapshot;
        log::debug!("Committed memory transaction");
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        log::debug!("Rolled back memory transaction");
        Ok(())
    }
}
