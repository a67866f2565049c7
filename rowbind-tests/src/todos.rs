use crate::recreate_table;
use rowbind::{
    CREATED_AT, ColumnDef, ColumnType, Executor, Filter, ID, Order, Record, Registry, TableDef,
    UPDATED_AT, Value,
};
use serde_json::json;

fn tasks(record: &Record) -> Option<usize> {
    record.value("tasks").as_list().map(<[Value]>::len)
}

pub async fn todos<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "todos",
        [
            ColumnDef::new("name", ColumnType::Varchar),
            ColumnDef::new("tasks", ColumnType::Json),
            ColumnDef::new("rank", ColumnType::Integer),
            ColumnDef::new("done", ColumnType::Boolean),
        ],
    )
    .await;
    let registry = Registry::builder()
        .table(TableDef::new("todos"))
        .build()
        .expect("Failed to build the registry");
    let todos = registry.table("todos");

    // Create
    let todo = Record::from_json(json!({ "name": "Todo", "tasks": ["a", "b"] })).unwrap();
    let todo = todos
        .create(executor, todo)
        .await
        .expect("Failed to create the todo");
    let id = todo.id().cloned().expect("The created todo must have an id");
    assert_eq!(tasks(&todo), Some(2));
    let found = todos
        .find(executor, id.clone())
        .await
        .expect("Failed to query the todo")
        .expect("Failed to find the todo");
    assert_eq!(found.value(ID), &id);
    assert_eq!(found.value("name"), &Value::from("Todo"));
    assert_eq!(tasks(&found), Some(2));
    assert!(!found.value(CREATED_AT).is_null());
    assert_eq!(found.value(CREATED_AT), found.value(UPDATED_AT));

    // Update
    let mut todo = found;
    todo.set("tasks", vec!["a", "b", "c"]);
    let updated = todos
        .save(executor, todo)
        .await
        .expect("Failed to update the todo");
    assert_eq!(updated.value(ID), &id);
    let found = todos
        .find(executor, id.clone())
        .await
        .expect("Failed to query the todo")
        .expect("Failed to find the updated todo");
    assert_eq!(tasks(&found), Some(3));
    assert_eq!(todos.count(executor, &Filter::All).await.unwrap(), 1);

    // Saving again is an update
    let again = todos
        .save(executor, found.clone())
        .await
        .expect("Failed to save the todo again");
    assert_eq!(again.value(ID), &id);
    assert_eq!(again.value(CREATED_AT), found.value(CREATED_AT));
    assert_eq!(todos.count(executor, &Filter::All).await.unwrap(), 1);

    // Stringified null
    let nameless = todos
        .save(executor, Record::new().with("name", "null"))
        .await
        .expect("Failed to save the nameless todo");
    assert!(nameless.value("name").is_null());
    assert_eq!(
        todos
            .count(executor, &Filter::is_null("name"))
            .await
            .unwrap(),
        1
    );

    // Destroy
    let destroyed = todos
        .destroy(executor, again)
        .await
        .expect("Failed to destroy the todo");
    assert_eq!(destroyed.value(ID), &id);
    assert!(
        todos
            .find(executor, id)
            .await
            .expect("Failed to query the todo")
            .is_none()
    );
    assert_eq!(todos.count(executor, &Filter::All).await.unwrap(), 1);
}

pub async fn todos_query<E: Executor>(executor: &E) {
    let registry = Registry::builder()
        .table(TableDef::new("todos"))
        .build()
        .expect("Failed to build the registry");
    let todos = registry.table("todos");
    todos
        .bulk_destroy(executor, &Filter::All)
        .await
        .expect("Failed to clear the todos");
    let saved = todos
        .create_many(
            executor,
            (1..=5).map(|i| {
                Record::new()
                    .with("name", format!("t{}", i))
                    .with("rank", i)
                    .with("done", i % 2 == 0)
            }),
        )
        .await
        .expect("Failed to create the todos");
    assert_eq!(saved.len(), 5);

    let names = |rows: &[Record]| {
        rows.iter()
            .map(|r| r.value("name").as_str().unwrap_or_default().to_owned())
            .collect::<Vec<_>>()
    };
    let page = todos
        .query()
        .order("rank", Order::Desc)
        .page(1, 2)
        .all(executor)
        .await
        .expect("Failed to read the first page");
    assert_eq!(names(&page), ["t5", "t4"]);
    let page = todos
        .query()
        .order("rank", Order::Desc)
        .page(3, 2)
        .all(executor)
        .await
        .expect("Failed to read the last page");
    assert_eq!(names(&page), ["t1"]);

    let done = todos.query().where_eq("done", true);
    assert_eq!(done.count(executor).await.unwrap(), 2);
    let picked = todos
        .query()
        .where_in("name", ["t1", "t3"])
        .order("name", Order::Asc)
        .all(executor)
        .await
        .expect("Failed to select by name");
    assert_eq!(names(&picked), ["t1", "t3"]);
    let first = todos
        .query()
        .where_ne("name", "t1")
        .order("rank", Order::Asc)
        .first(executor)
        .await
        .expect("Failed to read the first todo")
        .expect("There must be a todo");
    assert_eq!(first.value("name").as_str(), Some("t2"));
    let all = todos.all(executor).await.expect("Failed to read all todos");
    assert_eq!(all.len(), 5);
    let edges = todos
        .query()
        .where_filter(Filter::lt("rank", 2).or(Filter::gt("rank", 4)))
        .order("rank", Order::Asc)
        .all(executor)
        .await
        .expect("Failed to select the edges");
    assert_eq!(names(&edges), ["t1", "t5"]);
    let beyond = todos
        .query()
        .page(u64::MAX, 2)
        .all(executor)
        .await
        .expect("Failed to read a page past the end");
    assert!(beyond.is_empty());

    let removed = todos
        .bulk_destroy(executor, &Filter::gt("rank", 3))
        .await
        .expect("Failed to bulk destroy");
    assert_eq!(removed.rows_affected, 2);
    assert_eq!(todos.count(executor, &Filter::All).await.unwrap(), 3);
}
