#[cfg(test)]
mod tests {
    use rowbind::{
        CREATED_AT, ColumnDef, ColumnType, Connection, Executor, Filter, ID, Record, Registry,
        RelationDecl, SaveOptions, TableDef, UPDATED_AT, Value,
    };
    use rowbind_memory::MemoryConnection;
    use rowbind_tests::{init_logs, recreate_table};
    use serde_json::json;
    use time::macros::datetime;

    async fn connection() -> MemoryConnection {
        let connection = MemoryConnection::connect("memory://persistence")
            .await
            .expect("Could not open the in-memory store");
        recreate_table(
            &connection,
            "notebooks",
            [
                ColumnDef::new("title", ColumnType::Varchar),
                ColumnDef::new("settings", ColumnType::Json),
            ],
        )
        .await;
        recreate_table(
            &connection,
            "pages",
            [
                ColumnDef::new("number", ColumnType::Integer),
                ColumnDef::new("notebookId", ColumnType::Uuid),
            ],
        )
        .await;
        connection
    }

    fn registry() -> Registry {
        Registry::builder()
            .table(TableDef::new("notebooks").relation(
                "pages",
                RelationDecl::has_many("pages").dependent(true),
            ))
            .build()
            .expect("Failed to build the registry")
    }

    #[tokio::test]
    async fn shared_timestamp() {
        init_logs();
        let connection = connection().await;
        let registry = registry();
        let notebooks = registry.table("notebooks");
        let timestamp = datetime!(2025-01-15 08:30 UTC);
        let notebook = notebooks
            .save_with(
                &connection,
                Record::from_json(json!({
                    "title": "Lab",
                    "pages": [{ "number": 1 }, { "number": 2 }],
                }))
                .unwrap(),
                SaveOptions::default().timestamp(timestamp),
            )
            .await
            .expect("Failed to save the notebook");
        assert_eq!(notebook.value(CREATED_AT), &Value::from(timestamp));
        assert_eq!(notebook.value(UPDATED_AT), &Value::from(timestamp));
        for page in notebook.value("pages").as_list().unwrap() {
            assert_eq!(
                page.as_map().unwrap().value(UPDATED_AT),
                &Value::from(timestamp)
            );
        }
    }

    #[tokio::test]
    async fn json_columns() {
        init_logs();
        let connection = connection().await;
        let registry = registry();
        let notebooks = registry.table("notebooks");
        let notebook = notebooks
            .save(
                &connection,
                Record::from_json(json!({
                    "title": "Settings",
                    "settings": { "theme": "dark", "zoom": [1, 2] },
                }))
                .unwrap(),
            )
            .await
            .expect("Failed to save the notebook");
        let expected = Value::from(json!({ "theme": "dark", "zoom": [1, 2] }));
        assert_eq!(notebook.value("settings"), &expected);
        let stored = connection
            .fetch_one("notebooks", &Filter::eq(ID, notebook.value(ID).clone()))
            .await
            .expect("Failed to read the row")
            .expect("The row must exist");
        assert!(matches!(stored.value("settings"), Value::Varchar(..)));
        let found = notebooks
            .find(&connection, notebook.value(ID).clone())
            .await
            .expect("Failed to find the notebook")
            .expect("The notebook must exist");
        assert_eq!(found.value("settings"), &expected);
    }

    #[tokio::test]
    async fn save_options_exists() {
        init_logs();
        let connection = connection().await;
        let registry = registry();
        let notebooks = registry.table("notebooks");
        let error = notebooks
            .save_with(
                &connection,
                Record::new().with(ID, Value::new_id()).with("title", "Ghost"),
                SaveOptions::default().exists(true),
            )
            .await
            .expect_err("Updating a missing row must fail");
        assert!(format!("{:#}", error).contains("notebooks"));
        let id = Value::new_id();
        let created = notebooks
            .save(&connection, Record::new().with(ID, id.clone()).with("title", "Given"))
            .await
            .expect("Failed to create with a given id");
        assert_eq!(created.value(ID), &id);
        assert_eq!(notebooks.count(&connection, &Filter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn many_and_values() {
        init_logs();
        let connection = connection().await;
        let registry = registry();
        let notebooks = registry.table("notebooks");
        let pages = registry.table("pages");
        let saved = notebooks
            .save_value(
                &connection,
                Value::from(json!([
                    { "title": "First", "pages": [{ "number": 1 }] },
                    { "title": "Second", "pages": [{ "number": 1 }, { "number": 2 }] },
                ])),
            )
            .await
            .expect("Failed to save the notebooks");
        let saved = saved
            .as_list()
            .expect("A list saves into a list")
            .iter()
            .map(|v| v.as_map().unwrap().clone())
            .collect::<Vec<_>>();
        assert_eq!(saved.len(), 2);
        assert_eq!(pages.count(&connection, &Filter::All).await.unwrap(), 3);
        let single = notebooks
            .save_value(&connection, Value::Map(Record::new().with("title", "Third")))
            .await
            .expect("Failed to save the notebook");
        assert!(single.as_map().is_some_and(Record::has_id));
        assert!(
            notebooks
                .save_value(&connection, Value::from("nope"))
                .await
                .is_err()
        );
        notebooks
            .destroy_many(&connection, saved)
            .await
            .expect("Failed to destroy the notebooks");
        assert_eq!(notebooks.count(&connection, &Filter::All).await.unwrap(), 1);
        assert_eq!(pages.count(&connection, &Filter::All).await.unwrap(), 0);
        let error = notebooks
            .destroy(&connection, Record::new().with("title", "No id"))
            .await
            .expect_err("Destroying without id must fail");
        assert!(format!("{:#}", error).contains("without id"));
    }
}
