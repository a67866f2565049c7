use crate::recreate_table;
use rowbind::{
    ColumnDef, ColumnType, Executor, Filter, ID, Record, Registry, RelationDecl, TableDef, Value,
};

pub async fn accounts<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "accounts",
        [ColumnDef::new("email", ColumnType::Varchar)],
    )
    .await;
    recreate_table(
        executor,
        "profiles",
        [
            ColumnDef::new("bio", ColumnType::Varchar),
            ColumnDef::new("accountId", ColumnType::Uuid),
        ],
    )
    .await;
    let registry = Registry::builder()
        .table(
            TableDef::new("accounts")
                .relation("profile", RelationDecl::has_one("profiles").dependent(true)),
        )
        .build()
        .expect("Failed to build the registry");
    let accounts = registry.table("accounts");
    let profiles = registry.table("profiles");

    // The child gets an id and the foreign key
    let account = accounts
        .save(
            executor,
            Record::new()
                .with("email", "ada@example.com")
                .with("profile", Record::new().with("bio", "first")),
        )
        .await
        .expect("Failed to save the account");
    let account_id = account.value(ID).clone();
    let first = account
        .value("profile")
        .as_map()
        .expect("The profile must be a record")
        .clone();
    assert!(first.has_id());
    assert_eq!(first.value("accountId"), &account_id);

    // A new child replaces the previous one, which is detached
    let mut account = account;
    account.set("profile", Record::new().with("bio", "second"));
    let account = accounts
        .save(executor, account)
        .await
        .expect("Failed to replace the profile");
    let owned = Filter::eq("accountId", account_id.clone());
    assert_eq!(profiles.count(executor, &owned).await.unwrap(), 1);
    assert_eq!(profiles.count(executor, &Filter::All).await.unwrap(), 2);
    let previous = profiles
        .find(executor, first.value(ID).clone())
        .await
        .expect("Failed to query the first profile")
        .expect("The first profile must survive");
    assert!(previous.value("accountId").is_null());
    let loaded = accounts
        .query()
        .include(["profile"])
        .first(executor)
        .await
        .expect("Failed to load the account")
        .expect("Failed to find the account");
    assert_eq!(
        loaded.value("profile").as_map().unwrap().value("bio"),
        &Value::from("second")
    );

    // Saving the same child again keeps it
    let account = accounts
        .save(executor, account)
        .await
        .expect("Failed to save the account again");
    assert_eq!(profiles.count(executor, &owned).await.unwrap(), 1);
    assert_eq!(profiles.count(executor, &Filter::All).await.unwrap(), 2);

    // Null detaches
    let mut detached = account.clone();
    detached.set("profile", Value::Null);
    let detached = accounts
        .save(executor, detached)
        .await
        .expect("Failed to detach the profile");
    assert!(detached.value("profile").is_null());
    assert_eq!(profiles.count(executor, &owned).await.unwrap(), 0);
    let loaded = accounts
        .query()
        .include(["profile"])
        .first(executor)
        .await
        .expect("Failed to load the account")
        .expect("Failed to find the account");
    assert!(loaded.value("profile").is_null());

    // Dependent child goes with its parent
    let account = accounts
        .save(
            executor,
            detached.with("profile", Record::new().with("bio", "third")),
        )
        .await
        .expect("Failed to attach a third profile");
    assert_eq!(profiles.count(executor, &owned).await.unwrap(), 1);
    accounts
        .destroy(executor, account)
        .await
        .expect("Failed to destroy the account");
    assert_eq!(profiles.count(executor, &owned).await.unwrap(), 0);
    assert_eq!(profiles.count(executor, &Filter::All).await.unwrap(), 2);
}
