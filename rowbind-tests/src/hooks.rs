use crate::{recreate_table, silent_logs};
use rowbind::{
    Cancel, ColumnDef, ColumnType, Error, Executor, Filter, Hook, ID, Record, Registry,
    RelationDecl, TableDef, Value,
};
use std::sync::{Arc, Mutex};

fn trace(
    events: &Arc<Mutex<Vec<String>>>,
    hook: Hook,
) -> impl Fn(&mut Record) -> rowbind::Result<()> + Send + Sync + 'static {
    let events = events.clone();
    move |_| {
        events.lock().unwrap().push(format!("{:?}", hook));
        Ok(())
    }
}

pub async fn hooks<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "events",
        [
            ColumnDef::new("name", ColumnType::Varchar),
            ColumnDef::new("slug", ColumnType::Varchar),
        ],
    )
    .await;
    recreate_table(
        executor,
        "guests",
        [
            ColumnDef::new("name", ColumnType::Varchar),
            ColumnDef::new("eventId", ColumnType::Uuid),
        ],
    )
    .await;
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut table = TableDef::new("events").relation("guests", RelationDecl::has_many("guests"));
    for hook in [
        Hook::BeforeCreate,
        Hook::BeforeSave,
        Hook::AfterSave,
        Hook::AfterCreate,
        Hook::BeforeDestroy,
        Hook::AfterDestroy,
    ] {
        table = table.hook(hook, trace(&events, hook));
    }
    let table = table
        .hook(Hook::BeforeSave, |event| {
            let slug = match event.value("name") {
                Value::Varchar(name) => name.to_lowercase().replace(' ', "-"),
                _ => return Ok(()),
            };
            if slug == "forbidden" {
                return Err(Cancel::new("forbidden events are not saved").into());
            }
            if slug == "broken" {
                return Err(Error::msg("the slug service is down"));
            }
            event.set("slug", slug);
            Ok(())
        })
        .hook(Hook::BeforeDestroy, |event| {
            if event.value("name") == &Value::from("Locked") {
                return Err(Cancel::new("locked events stay").into());
            }
            Ok(())
        });
    let registry = Registry::builder()
        .table(table)
        .table(TableDef::new("audits").hook(Hook::AfterSave, |_| {
            Err(Error::msg("audit log unavailable"))
        }))
        .build()
        .expect("Failed to build the registry");
    let table = registry.table("events");
    let taken = || std::mem::take(&mut *events.lock().unwrap());

    // Create then destroy
    let event = table
        .create(executor, Record::new().with("name", "Launch Party"))
        .await
        .expect("Failed to create the event");
    assert_eq!(event.value("slug"), &Value::from("launch-party"));
    table
        .destroy(executor, event)
        .await
        .expect("Failed to destroy the event");
    assert_eq!(
        taken(),
        [
            "BeforeCreate",
            "BeforeSave",
            "AfterSave",
            "AfterCreate",
            "BeforeDestroy",
            "AfterDestroy",
        ]
    );

    // Updates skip the create hooks
    let event = table
        .create(executor, Record::new().with("name", "Meetup"))
        .await
        .expect("Failed to create the meetup");
    taken();
    let event = table
        .save(executor, event.with("name", "Meetup Two"))
        .await
        .expect("Failed to update the meetup");
    assert_eq!(event.value("slug"), &Value::from("meetup-two"));
    assert_eq!(taken(), ["BeforeSave", "AfterSave"]);

    // Cancelled save returns the input untouched, relations included
    let input = Record::new().with("name", "Forbidden").with(
        "guests",
        vec![Record::new().with("name", "Eve")],
    );
    let result = table
        .save(executor, input.clone())
        .await
        .expect("A cancelled save is not an error");
    assert_eq!(result, input);
    assert!(!result.has_id());
    assert_eq!(
        table
            .count(executor, &Filter::eq("name", "Forbidden"))
            .await
            .unwrap(),
        0
    );
    assert_eq!(executor.count("guests", &Filter::All).await.unwrap(), 0);
    taken();

    // Unrelated hook failures cancel as well
    let result;
    silent_logs! {
        result = table
            .save(executor, Record::new().with("name", "Broken"))
            .await
            .expect("A failing hook cancels the save");
    }
    assert!(!result.has_id());
    assert_eq!(
        table
            .count(executor, &Filter::eq("name", "Broken"))
            .await
            .unwrap(),
        0
    );
    taken();

    // Cancelled destroy keeps the row
    let locked = table
        .create(executor, Record::new().with("name", "Locked"))
        .await
        .expect("Failed to create the locked event");
    let kept = table
        .destroy(executor, locked.clone())
        .await
        .expect("A cancelled destroy is not an error");
    assert_eq!(kept, locked);
    assert!(
        table
            .find(executor, locked.value(ID).clone())
            .await
            .unwrap()
            .is_some()
    );
    assert!(!taken().contains(&"AfterDestroy".to_string()));

    // After hooks propagate their errors, the write already happened
    recreate_table(
        executor,
        "audits",
        [ColumnDef::new("action", ColumnType::Varchar)],
    )
    .await;
    let audits = registry.table("audits");
    let error = audits
        .save(executor, Record::new().with("action", "login"))
        .await
        .expect_err("The after save hook must fail the save");
    assert!(format!("{:#}", error).contains("audit log unavailable"));
    assert_eq!(audits.count(executor, &Filter::All).await.unwrap(), 1);
}
