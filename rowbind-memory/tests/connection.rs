#[cfg(test)]
mod tests {
    use rowbind_core::{
        ColumnDef, ColumnType, Connection, Executor, Filter, ID, Record, Transaction, Value,
    };
    use rowbind_memory::MemoryConnection;
    use rowbind_tests::{init_logs, silent_logs};

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(MemoryConnection::connect("sqlite://some_value").await.is_err());
            assert!(MemoryConnection::connect("not a url").await.is_err());
        };
    }

    #[tokio::test]
    async fn independent_stores() {
        init_logs();
        let first = MemoryConnection::connect("memory://first")
            .await
            .expect("Could not open the first store");
        let second = MemoryConnection::connect("memory://second")
            .await
            .expect("Could not open the second store");
        first
            .create_table("notes", &ColumnDef::standard(), false)
            .await
            .expect("Failed to create the notes table");
        assert_eq!(first.table_names().await, ["notes"]);
        assert!(second.table_names().await.is_empty());
        assert!(second.count("notes", &Filter::All).await.is_err());
    }

    #[tokio::test]
    async fn transaction_snapshot() {
        init_logs();
        let connection = MemoryConnection::new();
        connection
            .create_table(
                "notes",
                &ColumnDef::standard()
                    .into_iter()
                    .chain([ColumnDef::new("text", ColumnType::Varchar).not_null()])
                    .collect::<Vec<_>>(),
                false,
            )
            .await
            .expect("Failed to create the notes table");
        let transaction = connection
            .begin()
            .await
            .expect("Could not begin a transaction");
        transaction
            .insert(
                "notes",
                Record::new()
                    .with(ID, Value::new_id())
                    .with("text", "draft"),
            )
            .await
            .expect("Failed to insert the note");
        assert_eq!(transaction.count("notes", &Filter::All).await.unwrap(), 1);
        assert_eq!(connection.count("notes", &Filter::All).await.unwrap(), 0);
        transaction
            .commit()
            .await
            .expect("Failed to commit the transaction");
        assert_eq!(connection.count("notes", &Filter::All).await.unwrap(), 1);

        let transaction = connection
            .begin()
            .await
            .expect("Could not begin a transaction");
        transaction
            .delete("notes", &Filter::All)
            .await
            .expect("Failed to delete the notes");
        transaction
            .rollback()
            .await
            .expect("Failed to rollback the transaction");
        assert_eq!(connection.count("notes", &Filter::All).await.unwrap(), 1);
    }
}
