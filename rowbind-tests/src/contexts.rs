use crate::recreate_table;
use rowbind::{
    ColumnDef, ColumnType, ContextDef, Executor, ID, OrmError, Record, Registry, RelationDecl,
    TableDef, Value,
};
use serde_json::json;

fn keys(value: &Value) -> Vec<String> {
    value
        .as_map()
        .expect("A projected record must be a record")
        .keys()
        .cloned()
        .collect()
}

pub async fn contexts<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "people",
        [
            ColumnDef::new("firstName", ColumnType::Varchar),
            ColumnDef::new("lastName", ColumnType::Varchar),
            ColumnDef::new("email", ColumnType::Varchar),
        ],
    )
    .await;
    recreate_table(
        executor,
        "pets",
        [
            ColumnDef::new("name", ColumnType::Varchar),
            ColumnDef::new("species", ColumnType::Varchar),
            ColumnDef::new("chipNumber", ColumnType::Varchar),
            ColumnDef::new("personId", ColumnType::Uuid),
        ],
    )
    .await;
    let registry = Registry::builder()
        .table(
            TableDef::new("people")
                .relation("pets", RelationDecl::has_many("pets"))
                .context("simple", ContextDef::fields(["firstName", "lastName"]))
                .context("owner", ContextDef::fields(["firstName", "pets"]))
                .context("card", ContextDef::fields(["lastName", "pets"]))
                .context(
                    "greeting",
                    ContextDef::transform(|person| {
                        Record::new().with(
                            "greeting",
                            format!(
                                "Hello {} {}",
                                person.value("firstName").as_str().unwrap_or_default(),
                                person.value("lastName").as_str().unwrap_or_default(),
                            ),
                        )
                    }),
                ),
        )
        .table(
            TableDef::new("pets")
                .context("owner", ContextDef::fields(["name"]))
                .context("default", ContextDef::fields(["name", "species"])),
        )
        .build()
        .expect("Failed to build the registry");
    let people = registry.table("people");
    let pets = registry.table("pets");

    let person = Record::from_json(json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "pets": [{ "name": "Pascal", "species": "cat", "chipNumber": "981" }],
    }))
    .unwrap();
    let person = people
        .save(executor, person)
        .await
        .expect("Failed to save the person");
    let loaded = people
        .query()
        .where_eq(ID, person.value(ID).clone())
        .include(["pets"])
        .all(executor)
        .await
        .expect("Failed to load the person");
    let person = Value::Map(loaded.into_iter().next().expect("The person must exist"));

    // Field list
    let simple = people
        .with_context(&person, "simple")
        .expect("Failed to project with simple");
    assert_eq!(keys(&simple), ["firstName", "lastName"]);

    // Missing context
    let error = people
        .with_context(&person, "missing")
        .expect_err("A missing context must fail");
    assert_eq!(
        error.downcast_ref::<OrmError>(),
        Some(&OrmError::ContextNotFound {
            table: "people".into(),
            context: "missing".into(),
        })
    );

    // Nested through the same named context of the related table
    let owner = people
        .with_context(&person, "owner")
        .expect("Failed to project with owner");
    assert_eq!(keys(&owner), ["firstName", "pets"]);
    let pet = &owner.as_map().unwrap().value("pets").as_list().unwrap()[0];
    assert_eq!(keys(pet), ["name"]);

    // Nested through the default context of the related table
    let card = people
        .with_context(&person, "card")
        .expect("Failed to project with card");
    let pet = &card.as_map().unwrap().value("pets").as_list().unwrap()[0];
    assert_eq!(keys(pet), ["name", "species"]);

    // Default passthrough, default context
    let same = people
        .with_context(&person, "default")
        .expect("Failed to project with default");
    assert_eq!(same, person);
    let pet = person.as_map().unwrap().value("pets").as_list().unwrap()[0].clone();
    let projected = pets
        .with_context(&pet, "default")
        .expect("Failed to project the pet");
    assert_eq!(keys(&projected), ["name", "species"]);

    // Transform, lists
    let greeting = people
        .with_context(&person, "greeting")
        .expect("Failed to project with greeting");
    assert_eq!(
        greeting.as_map().unwrap().value("greeting"),
        &Value::from("Hello Ada Lovelace")
    );
    let many = people
        .with_context(&Value::List(vec![person.clone(), person.clone()]), "simple")
        .expect("Failed to project a list");
    assert_eq!(many.as_list().map(<[Value]>::len), Some(2));
    let inline = ContextDef::fields(["email"]);
    let email = people
        .with_context(&person, &inline)
        .expect("Failed to project with an inline context");
    assert_eq!(keys(&email), ["email"]);
}
