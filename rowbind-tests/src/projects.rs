use crate::recreate_table;
use rowbind::{
    ColumnDef, ColumnType, Executor, Filter, ID, Record, Registry, RelationDecl, TableDef, Value,
};
use serde_json::json;

pub async fn projects<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "users",
        [
            ColumnDef::new("firstName", ColumnType::Varchar),
            ColumnDef::new("lastName", ColumnType::Varchar),
        ],
    )
    .await;
    recreate_table(
        executor,
        "projects",
        [ColumnDef::new("title", ColumnType::Varchar)],
    )
    .await;
    recreate_table(
        executor,
        "projects_users",
        [
            ColumnDef::new("userId", ColumnType::Uuid),
            ColumnDef::new("projectId", ColumnType::Uuid),
        ],
    )
    .await;
    let registry = Registry::builder()
        .table(TableDef::new("users").relation(
            "projects",
            RelationDecl::has_and_belongs_to_many("projects"),
        ))
        .table(
            TableDef::new("projects")
                .relations_from_json(json!({ "users": { "hasAndBelongsToMany": "users" } }))
                .expect("Failed to read the project relations"),
        )
        .build()
        .expect("Failed to build the registry");
    let users = registry.table("users");
    let projects = registry.table("projects");
    let relation = users.relation("projects").unwrap();
    assert_eq!(relation.join_table().unwrap().table_name, "projects_users");
    let joins = |filter: Filter| async move {
        executor
            .count("projects_users", &filter)
            .await
            .expect("Failed to count the join rows")
    };

    // New related record
    let user = Record::from_json(json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "projects": [{ "title": "Analytical Engine" }],
    }))
    .unwrap();
    let user = users
        .save(executor, user)
        .await
        .expect("Failed to save the user with a new project");
    let user_id = user.value(ID).clone();
    let attached = user.value("projects").as_list().expect("Projects must be a list");
    assert_eq!(attached.len(), 1);
    let engine = attached[0].as_map().expect("A project must be a record").clone();
    let engine_id = engine.id().cloned().expect("The new project must have an id");
    assert_eq!(projects.count(executor, &Filter::All).await.unwrap(), 1);
    assert_eq!(joins(Filter::All).await, 1);
    assert_eq!(
        joins(Filter::eq("userId", user_id.clone()).and(Filter::eq("projectId", engine_id.clone())))
            .await,
        1
    );

    // Saving the same set again changes nothing
    let user = users
        .save(executor, user)
        .await
        .expect("Failed to save the user again");
    assert_eq!(joins(Filter::All).await, 1);
    assert_eq!(projects.count(executor, &Filter::All).await.unwrap(), 1);

    // Add a project
    let mut user = user;
    user.set(
        "projects",
        vec![
            engine.clone(),
            Record::new().with("title", "Difference Engine"),
        ],
    );
    let user = users
        .save(executor, user)
        .await
        .expect("Failed to add a project");
    assert_eq!(joins(Filter::eq("userId", user_id.clone())).await, 2);
    assert_eq!(projects.count(executor, &Filter::All).await.unwrap(), 2);

    // Other users join the same project
    let grace = users
        .save(
            executor,
            Record::new()
                .with("firstName", "Grace")
                .with("projects", vec![engine.clone()]),
        )
        .await
        .expect("Failed to save the second user");
    assert_eq!(joins(Filter::All).await, 3);
    assert_eq!(projects.count(executor, &Filter::All).await.unwrap(), 2);

    // Remove a project, the project itself stays
    let mut user = user;
    let difference = user.value("projects").as_list().unwrap()[1].clone();
    user.set("projects", vec![difference.clone()]);
    let user = users
        .save(executor, user)
        .await
        .expect("Failed to remove a project");
    assert_eq!(joins(Filter::eq("userId", user_id.clone())).await, 1);
    assert_eq!(
        joins(Filter::eq("projectId", engine_id.clone())).await,
        1,
        "Only the second user still works on the engine"
    );
    assert_eq!(projects.count(executor, &Filter::All).await.unwrap(), 2);

    // Include, both directions
    let loaded = users
        .query()
        .where_eq(ID, user_id.clone())
        .include(["projects"])
        .first(executor)
        .await
        .expect("Failed to load the user")
        .expect("Failed to find the user");
    let titles = loaded
        .value("projects")
        .as_list()
        .unwrap()
        .iter()
        .map(|v| v.as_map().unwrap().value("title").clone())
        .collect::<Vec<_>>();
    assert_eq!(titles, [Value::from("Difference Engine")]);
    let engine = projects
        .query()
        .where_eq(ID, engine_id.clone())
        .include(["users"])
        .first(executor)
        .await
        .expect("Failed to load the engine")
        .expect("Failed to find the engine");
    let members = engine.value("users").as_list().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(
        members[0].as_map().unwrap().value(ID),
        grace.value(ID),
        "The engine belongs to the second user only"
    );
    let everyone = users
        .query()
        .include(["projects"])
        .all(executor)
        .await
        .expect("Failed to load every user");
    assert_eq!(everyone.len(), 2);
    assert!(
        everyone
            .iter()
            .all(|u| u.value("projects").as_list().map(<[Value]>::len) == Some(1))
    );

    // Destroy removes the join rows, never the projects
    users
        .destroy(executor, user)
        .await
        .expect("Failed to destroy the user");
    assert_eq!(joins(Filter::eq("userId", user_id)).await, 0);
    assert_eq!(joins(Filter::All).await, 1);
    assert_eq!(projects.count(executor, &Filter::All).await.unwrap(), 2);

    // The same record listed twice is saved and joined once
    let compiler = Record::new()
        .with(ID, Value::new_id())
        .with("title", "Compiler");
    let compiler_id = compiler.value(ID).clone();
    let linus = users
        .save(
            executor,
            Record::new()
                .with("firstName", "Linus")
                .with("projects", vec![compiler.clone(), compiler]),
        )
        .await
        .expect("Failed to save a user listing a project twice");
    assert_eq!(linus.value("projects").as_list().map(<[Value]>::len), Some(1));
    assert_eq!(
        projects
            .count(executor, &Filter::eq(ID, compiler_id.clone()))
            .await
            .unwrap(),
        1
    );
    assert_eq!(joins(Filter::eq("userId", linus.value(ID).clone())).await, 1);
    assert_eq!(joins(Filter::eq("projectId", compiler_id)).await, 1);
}
