#[cfg(test)]
mod tests {
    use rowbind::{
        ContextDef, ContextSelector, OrmError, Record, Registry, RelationDecl, TableDef, Value,
    };
    use serde_json::json;

    fn registry() -> Registry {
        Registry::builder()
            .table(
                TableDef::new("users")
                    .relation("profile", RelationDecl::has_one("profiles"))
                    .relation("company", RelationDecl::belongs_to("companies"))
                    .context("default", ContextDef::fields(["name", "profile", "company"]))
                    .context("public", ContextDef::fields(["name", "profile"])),
            )
            .table(
                TableDef::new("profiles")
                    .context("public", ContextDef::fields(["bio"]))
                    .context("default", ContextDef::fields(["bio", "phone"])),
            )
            .table(TableDef::new("companies").context(
                "default",
                ContextDef::transform(|company| {
                    Record::new().with("label", company.value("name").clone())
                }),
            ))
            .build()
            .expect("Failed to build the registry")
    }

    fn user() -> Record {
        Record::from_json(json!({
            "id": 1,
            "name": "Ada",
            "password": "secret",
            "profile": { "bio": "Engines", "phone": "555", "pin": 1234 },
            "company": { "name": "Analytical", "vat": "IT0001" },
        }))
        .unwrap()
    }

    #[test]
    fn default_context() {
        let registry = registry();
        let users = registry.table("users");
        let projected = users
            .project(&user(), ContextSelector::Default)
            .expect("Failed to project the user");
        assert_eq!(
            projected.to_json(),
            json!({
                "name": "Ada",
                "profile": { "bio": "Engines", "phone": "555" },
                "company": { "label": "Analytical" },
            })
        );
    }

    #[test]
    fn named_context_cascades() {
        let registry = registry();
        let users = registry.table("users");
        let projected = users
            .with_context(&Value::Map(user()), "public")
            .expect("Failed to project the user");
        assert_eq!(
            projected.to_json(),
            json!({ "name": "Ada", "profile": { "bio": "Engines" } })
        );
    }

    #[test]
    fn missing_fields_are_skipped() {
        let registry = registry();
        let users = registry.table("users");
        let projected = users
            .project(&Record::new().with("name", "Grace"), "public".into())
            .expect("Failed to project the user");
        assert_eq!(projected.to_json(), json!({ "name": "Grace" }));
        let projected = users
            .with_context(
                &Value::Map(Record::new().with("profile", Value::Null)),
                "public",
            )
            .expect("Failed to project the user");
        assert_eq!(projected.to_json(), json!({ "profile": null }));
    }

    #[test]
    fn many_and_scalars() {
        let registry = registry();
        let users = registry.table("users");
        let projected = users
            .with_context_many(&[user(), user()], "public")
            .expect("Failed to project the users");
        assert_eq!(projected.len(), 2);
        assert!(projected.iter().all(|v| !v.contains_key("password")));
        assert_eq!(
            users.with_context(&Value::from(42), "public").unwrap(),
            Value::from(42)
        );
        let inline = ContextDef::fields(["password"]);
        let projected = users
            .project(&user(), ContextSelector::from(&inline))
            .expect("Failed to project the user");
        assert_eq!(projected.to_json(), json!({ "password": "secret" }));
    }

    #[test]
    fn unknown_context() {
        let registry = registry();
        let error = registry
            .table("profiles")
            .with_context(&Value::Map(user()), "internal")
            .expect_err("An unknown context must fail");
        assert!(matches!(
            error.downcast_ref::<OrmError>(),
            Some(OrmError::ContextNotFound { context, .. }) if context == "internal"
        ));
        let plain = registry
            .table("tags")
            .with_context(&Value::Map(user()), "default")
            .expect("A table without contexts passes records through");
        assert_eq!(plain, Value::Map(user()));
        assert!(!registry.table("tags").has_context("default"));
    }
}
