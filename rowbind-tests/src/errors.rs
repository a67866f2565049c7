use crate::recreate_table;
use rowbind::{
    ColumnDef, ColumnType, Error, Executor, OrmError, Record, Registry, RelationDecl, TableDef,
    Value,
};
use serde_json::json;

fn orm_error(error: &Error) -> &OrmError {
    error
        .downcast_ref::<OrmError>()
        .unwrap_or_else(|| panic!("Expected an engine error, found: {:#}", error))
}

pub async fn errors<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "shelves",
        [ColumnDef::new("label", ColumnType::Varchar)],
    )
    .await;
    recreate_table(
        executor,
        "books",
        [
            ColumnDef::new("title", ColumnType::Varchar),
            ColumnDef::new("shelfId", ColumnType::Uuid),
        ],
    )
    .await;
    let registry = Registry::builder()
        .table(TableDef::new("shelves").relation("books", RelationDecl::has_many("books")))
        .build()
        .expect("Failed to build the registry");
    let shelves = registry.table("shelves");

    // Unknown relation names
    let error = shelves
        .relation("magazines")
        .expect_err("An undeclared relation must fail");
    assert_eq!(
        orm_error(&error),
        &OrmError::UnknownRelationName {
            table: "shelves".into(),
            relation: "magazines".into(),
        }
    );
    shelves
        .save(executor, Record::new().with("label", "Fiction"))
        .await
        .expect("Failed to save the shelf");
    let error = shelves
        .query()
        .include(["magazines"])
        .all(executor)
        .await
        .expect_err("Including an undeclared relation must fail");
    assert!(matches!(
        orm_error(&error),
        OrmError::UnknownRelationName { relation, .. } if relation == "magazines"
    ));

    // Collections expect lists of records
    let error = shelves
        .save(
            executor,
            Record::new()
                .with("label", "Poetry")
                .with("books", "not a list"),
        )
        .await
        .expect_err("A scalar collection must fail");
    assert!(matches!(
        orm_error(&error),
        OrmError::InvalidRelationValue { relation, .. } if relation == "books"
    ));
    let error = shelves
        .save(
            executor,
            Record::new()
                .with("label", "Essays")
                .with("books", vec![Value::from(1), Value::from(2)]),
        )
        .await
        .expect_err("A list of scalars must fail");
    assert!(matches!(
        orm_error(&error),
        OrmError::InvalidRelationValue { .. }
    ));

    // Missing tables
    let ghosts = registry.table("ghosts");
    let error = ghosts
        .all(executor)
        .await
        .expect_err("Reading a missing table must fail");
    assert_eq!(orm_error(&error), &OrmError::NoSuchTable("ghosts".into()));
    let error = ghosts
        .schema(executor)
        .await
        .expect_err("The schema of a missing table must fail");
    assert_eq!(orm_error(&error), &OrmError::NoSuchTable("ghosts".into()));

    // Malformed declarations
    let error = Registry::builder()
        .table(TableDef::new("shelves").relation("books", RelationDecl::default()))
        .build()
        .err()
        .expect("A relation without kind must fail");
    assert_eq!(
        orm_error(&error),
        &OrmError::UnknownRelationKind {
            table: "shelves".into(),
            relation: "books".into(),
        }
    );
    let error = Registry::builder()
        .table(TableDef::new("shelves"))
        .table(TableDef::new("shelves"))
        .build()
        .err()
        .expect("Duplicated tables must fail");
    assert!(format!("{:#}", error).contains("shelves"));
    TableDef::new("shelves")
        .relations_from_json(json!({ "books": { "hasMany": "books", "color": "red" } }))
        .expect_err("Unknown relation options must fail");
}
