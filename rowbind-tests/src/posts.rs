use crate::recreate_table;
use rowbind::{
    Cancel, ColumnDef, ColumnType, Executor, Filter, Hook, ID, Record, Registry, RelationDecl,
    TableDef, Value,
};

pub async fn posts<E: Executor>(executor: &E) {
    // Setup
    recreate_table(
        executor,
        "authors",
        [ColumnDef::new("name", ColumnType::Varchar)],
    )
    .await;
    recreate_table(
        executor,
        "posts",
        [
            ColumnDef::new("title", ColumnType::Varchar),
            ColumnDef::new("authorId", ColumnType::Uuid),
        ],
    )
    .await;
    recreate_table(
        executor,
        "blobs",
        [ColumnDef::new("bytes", ColumnType::Integer)],
    )
    .await;
    recreate_table(
        executor,
        "attachments",
        [
            ColumnDef::new("fileName", ColumnType::Varchar),
            ColumnDef::new("blobId", ColumnType::Uuid),
        ],
    )
    .await;
    let registry = Registry::builder()
        .table(TableDef::new("posts").relation("author", RelationDecl::belongs_to("authors")))
        .table(
            TableDef::new("authors")
                .relation("posts", RelationDecl::has_many("posts"))
                .hook(Hook::BeforeSave, |author| {
                    if author.value("name") == &Value::from("Rejected") {
                        return Err(Cancel::new("rejected authors are not saved").into());
                    }
                    Ok(())
                }),
        )
        .table(
            TableDef::new("attachments")
                .relation("blob", RelationDecl::belongs_to("blobs").dependent(true)),
        )
        .build()
        .expect("Failed to build the registry");
    let posts = registry.table("posts");
    let authors = registry.table("authors");
    let attachments = registry.table("attachments");
    let blobs = registry.table("blobs");
    assert_eq!(posts.relation("author").unwrap().key, "authorId");
    assert_eq!(authors.relation("posts").unwrap().key, "authorId");

    // The parent adopts the foreign key
    let post = posts
        .save(
            executor,
            Record::new()
                .with("title", "Notes on the engine")
                .with("author", Record::new().with("name", "Ada")),
        )
        .await
        .expect("Failed to save the post");
    let author = post
        .value("author")
        .as_map()
        .expect("The author must be a record")
        .clone();
    let author_id = author.id().cloned().expect("The author must have an id");
    assert_eq!(post.value("authorId"), &author_id);
    let stored = posts
        .find(executor, post.value(ID).clone())
        .await
        .expect("Failed to query the post")
        .expect("Failed to find the post");
    assert_eq!(stored.value("authorId"), &author_id);
    assert_eq!(authors.count(executor, &Filter::All).await.unwrap(), 1);

    // Several posts, one author
    let second = posts
        .save(
            executor,
            Record::new()
                .with("title", "Sketch of the engine")
                .with("author", author.clone()),
        )
        .await
        .expect("Failed to save the second post");
    assert_eq!(second.value("authorId"), &author_id);
    assert_eq!(authors.count(executor, &Filter::All).await.unwrap(), 1);
    let loaded = posts
        .query()
        .include(["author"])
        .all(executor)
        .await
        .expect("Failed to load the posts");
    assert_eq!(loaded.len(), 2);
    for post in &loaded {
        assert_eq!(
            post.value("author").as_map().unwrap().value("name"),
            &Value::from("Ada")
        );
    }
    let loaded = authors
        .query()
        .include(["posts"])
        .first(executor)
        .await
        .expect("Failed to load the author")
        .expect("Failed to find the author");
    assert_eq!(loaded.value("posts").as_list().map(<[Value]>::len), Some(2));

    // A cancelled target leaves the foreign key as it was
    let kept = posts
        .save(
            executor,
            second.with("author", Record::new().with("name", "Rejected")),
        )
        .await
        .expect("A cancelled target does not fail the save");
    assert_eq!(kept.value("authorId"), &author_id);
    assert!(!kept.value("author").as_map().unwrap().has_id());
    let stored = posts
        .find(executor, kept.value(ID).clone())
        .await
        .expect("Failed to query the post")
        .expect("Failed to find the post");
    assert_eq!(stored.value("authorId"), &author_id);
    assert_eq!(authors.count(executor, &Filter::All).await.unwrap(), 1);

    // Null clears the foreign key
    let mut post = post;
    post.set("author", Value::Null);
    let post = posts
        .save(executor, post)
        .await
        .expect("Failed to clear the author");
    assert!(post.value("authorId").is_null());
    let stored = posts
        .find(executor, post.value(ID).clone())
        .await
        .expect("Failed to query the post")
        .expect("Failed to find the post");
    assert!(stored.value("authorId").is_null());

    // A dependent target goes with the record pointing at it
    let attachment = attachments
        .save(
            executor,
            Record::new()
                .with("fileName", "engine.png")
                .with("blob", Record::new().with("bytes", 2048)),
        )
        .await
        .expect("Failed to save the attachment");
    let blob_id = attachment.value("blobId").clone();
    assert!(!blob_id.is_null());
    assert!(blobs.find(executor, blob_id.clone()).await.unwrap().is_some());
    let bare = Record::new().with(ID, attachment.value(ID).clone());
    attachments
        .destroy(executor, bare)
        .await
        .expect("Failed to destroy the attachment");
    assert!(blobs.find(executor, blob_id).await.unwrap().is_none());
    assert_eq!(attachments.count(executor, &Filter::All).await.unwrap(), 0);
}
