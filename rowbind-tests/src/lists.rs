use crate::recreate_table;
use rowbind::{
    ColumnDef, ColumnType, Executor, Filter, ID, Order, Record, Registry, RelationDecl, TableDef,
    Value,
};
use serde_json::json;

pub async fn lists<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "lists",
        [ColumnDef::new("title", ColumnType::Varchar)],
    )
    .await;
    recreate_table(
        executor,
        "items",
        [
            ColumnDef::new("label", ColumnType::Varchar),
            ColumnDef::new("listId", ColumnType::Uuid),
        ],
    )
    .await;
    recreate_table(
        executor,
        "boards",
        [ColumnDef::new("title", ColumnType::Varchar)],
    )
    .await;
    recreate_table(
        executor,
        "cards",
        [
            ColumnDef::new("label", ColumnType::Varchar),
            ColumnDef::new("boardId", ColumnType::Uuid),
        ],
    )
    .await;
    let registry = Registry::builder()
        .table(TableDef::new("lists").relation(
            "items",
            RelationDecl::has_many("items").dependent(true),
        ))
        .table(TableDef::new("items").relation("list", RelationDecl::belongs_to("lists")))
        .table(TableDef::new("boards").relation("cards", RelationDecl::has_many("cards")))
        .build()
        .expect("Failed to build the registry");
    let lists = registry.table("lists");
    let items = registry.table("items");
    let boards = registry.table("boards");
    let cards = registry.table("cards");

    // Children get the foreign key
    let list = Record::from_json(json!({
        "title": "Groceries",
        "items": [{ "label": "milk" }, { "label": "eggs" }],
    }))
    .unwrap();
    let list = lists
        .save(executor, list)
        .await
        .expect("Failed to save the list");
    let list_id = list.value(ID).clone();
    let saved = list.value("items").as_list().unwrap().to_vec();
    assert_eq!(saved.len(), 2);
    for item in &saved {
        let item = item.as_map().unwrap();
        assert!(item.has_id());
        assert_eq!(item.value("listId"), &list_id);
    }
    assert_eq!(
        items
            .count(executor, &Filter::eq("listId", list_id.clone()))
            .await
            .unwrap(),
        2
    );

    // Dropped children are detached, not deleted
    let milk = saved[0].as_map().unwrap().clone();
    let eggs_id = saved[1].as_map().unwrap().value(ID).clone();
    let mut list = list;
    list.set(
        "items",
        vec![
            milk.with("label", "oat milk"),
            Record::new().with("label", "bread"),
        ],
    );
    let list = lists
        .save(executor, list)
        .await
        .expect("Failed to save the list again");
    assert_eq!(
        items
            .count(executor, &Filter::eq("listId", list_id.clone()))
            .await
            .unwrap(),
        2
    );
    let eggs = items
        .find(executor, eggs_id.clone())
        .await
        .expect("Failed to query the eggs")
        .expect("Detached items must survive");
    assert!(eggs.value("listId").is_null());
    assert_eq!(items.count(executor, &Filter::All).await.unwrap(), 3);
    assert_eq!(
        items
            .count(executor, &Filter::eq("label", "oat milk"))
            .await
            .unwrap(),
        1
    );

    // Include, both directions
    let loaded = lists
        .query()
        .include(["items"])
        .all(executor)
        .await
        .expect("Failed to load the lists");
    assert_eq!(loaded.len(), 1);
    let mut labels = loaded[0]
        .value("items")
        .as_list()
        .unwrap()
        .iter()
        .map(|v| v.as_map().unwrap().value("label").as_str().unwrap().to_owned())
        .collect::<Vec<_>>();
    labels.sort();
    assert_eq!(labels, ["bread", "oat milk"]);
    let loaded = items
        .query()
        .order("label", Order::Asc)
        .include(["list"])
        .all(executor)
        .await
        .expect("Failed to load the items");
    assert_eq!(loaded.len(), 3);
    for item in &loaded {
        let list = item.value("list");
        if item.value(ID) == &eggs_id {
            assert!(list.is_null(), "The eggs have no list anymore");
        } else {
            assert_eq!(list.as_map().unwrap().value("title"), &Value::from("Groceries"));
        }
    }

    // Dependent children go with their parent
    lists
        .destroy(executor, list)
        .await
        .expect("Failed to destroy the list");
    assert_eq!(
        items
            .count(executor, &Filter::eq("listId", list_id))
            .await
            .unwrap(),
        0
    );
    assert_eq!(items.count(executor, &Filter::All).await.unwrap(), 1);

    // Children of a non dependent relation are kept, detached
    let board = boards
        .save(
            executor,
            Record::from_json(json!({
                "title": "Sprint",
                "cards": [{ "label": "design" }, { "label": "build" }],
            }))
            .unwrap(),
        )
        .await
        .expect("Failed to save the board");
    let board_id = board.value(ID).clone();
    assert_eq!(
        cards
            .count(executor, &Filter::eq("boardId", board_id.clone()))
            .await
            .unwrap(),
        2
    );
    boards
        .destroy(executor, board)
        .await
        .expect("Failed to destroy the board");
    assert!(boards.find(executor, board_id.clone()).await.unwrap().is_none());
    assert_eq!(cards.count(executor, &Filter::All).await.unwrap(), 2);
    assert_eq!(
        cards
            .count(executor, &Filter::is_null("boardId"))
            .await
            .unwrap(),
        2
    );

    // An empty list detaches everything
    let board = boards
        .save(
            executor,
            Record::new().with("title", "Backlog").with(
                "cards",
                vec![Record::new().with("label", "triage")],
            ),
        )
        .await
        .expect("Failed to save the backlog");
    let board_id = board.value(ID).clone();
    let mut board = board;
    board.set("cards", Vec::<Record>::new());
    let board = boards
        .save(executor, board)
        .await
        .expect("Failed to empty the backlog");
    assert_eq!(board.value("cards"), &Value::List(Vec::new()));
    assert_eq!(
        cards
            .count(executor, &Filter::eq("boardId", board_id))
            .await
            .unwrap(),
        0
    );

    // A child listed twice is saved once
    let card = Record::new()
        .with(ID, Value::new_id())
        .with("label", "review");
    let card_id = card.value(ID).clone();
    let board = boards
        .save(
            executor,
            Record::new()
                .with("title", "Review")
                .with("cards", vec![card.clone(), card]),
        )
        .await
        .expect("Failed to save a board listing a card twice");
    assert_eq!(board.value("cards").as_list().map(<[Value]>::len), Some(1));
    let stored = cards
        .find(executor, card_id)
        .await
        .expect("Failed to query the card")
        .expect("The card must exist");
    assert_eq!(stored.value("boardId"), board.value(ID));
    assert_eq!(
        cards
            .count(executor, &Filter::eq("boardId", board.value(ID).clone()))
            .await
            .unwrap(),
        1
    );
}
