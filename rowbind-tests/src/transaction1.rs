use crate::recreate_table;
use rowbind::{
    ColumnDef, ColumnType, Connection, Filter, Record, Registry, RelationDecl, TableDef,
    Transaction, Value,
};
use serde_json::json;
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn transaction1<C: Connection>(connection: &C) {
    let _lock = MUTEX.lock().await;

    // Setup
    let transaction = connection
        .begin()
        .await
        .expect("Could not begin a transaction");
    recreate_table(
        &transaction,
        "crates",
        [ColumnDef::new("name", ColumnType::Varchar)],
    )
    .await;
    recreate_table(
        &transaction,
        "parcels",
        [
            ColumnDef::new("weight", ColumnType::Integer),
            ColumnDef::new("crateId", ColumnType::Uuid),
        ],
    )
    .await;
    transaction
        .commit()
        .await
        .expect("Failed to commit the transaction");
    let registry = Registry::builder()
        .table(TableDef::new("crates").relation("parcels", RelationDecl::has_many("parcels")))
        .build()
        .expect("Failed to build the registry");
    let crates = registry.table("crates");
    let parcels = registry.table("parcels");
    let shipment = || {
        Record::from_json(json!({
            "name": "first crate",
            "parcels": [{ "weight": 5 }, { "weight": 8 }, { "weight": 13 }],
        }))
        .unwrap()
    };

    // Rollback discards the whole save, relations included
    let transaction = connection
        .begin()
        .await
        .expect("Could not begin a transaction");
    let saved = crates
        .save(&transaction, shipment())
        .await
        .expect("Failed to save the crate");
    assert!(saved.has_id());
    assert_eq!(
        parcels.count(&transaction, &Filter::All).await.unwrap(),
        3
    );
    transaction
        .rollback()
        .await
        .expect("Failed to rollback the transaction");
    assert_eq!(crates.count(connection, &Filter::All).await.unwrap(), 0);
    assert_eq!(parcels.count(connection, &Filter::All).await.unwrap(), 0);

    // Commit publishes it
    let transaction = connection
        .begin()
        .await
        .expect("Could not begin a transaction");
    let saved = crates
        .save(&transaction, shipment())
        .await
        .expect("Failed to save the crate");
    transaction
        .commit()
        .await
        .expect("Failed to commit the transaction");
    let stored = crates
        .query()
        .include(["parcels"])
        .first(connection)
        .await
        .expect("Failed to load the crate")
        .expect("The committed crate must exist");
    assert_eq!(stored.id(), saved.id());
    assert_eq!(stored.value("parcels").as_list().map(<[Value]>::len), Some(3));

    // Destroy inside a transaction
    let transaction = connection
        .begin()
        .await
        .expect("Could not begin a transaction");
    crates
        .destroy(&transaction, stored)
        .await
        .expect("Failed to destroy the crate");
    assert_eq!(crates.count(&transaction, &Filter::All).await.unwrap(), 0);
    assert_eq!(crates.count(connection, &Filter::All).await.unwrap(), 1);
    transaction
        .commit()
        .await
        .expect("Failed to commit the transaction");
    assert_eq!(crates.count(connection, &Filter::All).await.unwrap(), 0);
    assert_eq!(
        parcels
            .count(connection, &Filter::is_null("crateId"))
            .await
            .unwrap(),
        3
    );
}
