#[cfg(test)]
mod tests {
    use rowbind::{
        OrmError, Registry, RelationDecl, RelationKind, TableDef,
        inflect::{plural, singular},
    };
    use serde_json::json;

    #[test]
    fn inflection() {
        assert_eq!(singular("todos"), "todo");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("people"), "person");
        assert_eq!(singular("todoItems"), "todoItem");
        assert_eq!(singular("status"), "status");
        assert_eq!(plural("user"), "users");
        assert_eq!(plural("category"), "categories");
        assert_eq!(plural("person"), "people");
        assert_eq!(plural("projects"), "projects");
        assert_eq!(plural("day"), "days");
    }

    #[test]
    fn relation_defaults() {
        let registry = Registry::builder()
            .table(
                TableDef::new("users")
                    .relation("company", RelationDecl::belongs_to("companies"))
                    .relation("posts", RelationDecl::has_many("posts"))
                    .relation("profile", RelationDecl::has_one("profiles"))
                    .relation("projects", RelationDecl::has_and_belongs_to_many("")),
            )
            .build()
            .expect("Failed to build the registry");
        let users = registry.table("users");

        let company = users.relation("company").unwrap();
        assert_eq!(company.kind, RelationKind::BelongsTo);
        assert_eq!(company.table_name, "companies");
        assert_eq!(company.key, "companyId");
        assert!(company.through.is_none());
        assert!(!company.dependent);

        let posts = users.relation("posts").unwrap();
        assert_eq!(posts.kind, RelationKind::HasMany);
        assert_eq!(posts.key, "userId");

        let profile = users.relation("profile").unwrap();
        assert_eq!(profile.kind, RelationKind::HasOne);
        assert_eq!(profile.table_name, "profiles");
        assert_eq!(profile.key, "userId");

        let projects = users.relation("projects").unwrap();
        assert_eq!(projects.kind, RelationKind::HasAndBelongsToMany);
        assert_eq!(projects.table_name, "projects");
        assert_eq!(projects.key, "projectId");
        let through = projects.join_table().unwrap();
        assert_eq!(through.table_name, "projects_users");
        assert_eq!(through.source_key, "userId");
        assert!(company.join_table().is_err());

        assert_eq!(
            users.relations().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            ["company", "posts", "profile", "projects"]
        );
        assert_eq!(users.related(posts).name(), "posts");
    }

    #[test]
    fn relations_from_json() {
        let registry = Registry::builder()
            .table(
                TableDef::new("teams")
                    .relations_from_json(json!({
                        "members": {
                            "hasAndBelongsToMany": "people",
                            "through": "memberships",
                            "primaryKey": "groupId",
                            "foreignKey": "memberId",
                        },
                        "lead": { "belongsTo": "people", "dependent": true },
                        "boards": { "hasMany": "", "table": "kanban", "foreignKey": "ownerId" },
                    }))
                    .expect("Failed to read the relations"),
            )
            .build()
            .expect("Failed to build the registry");
        let teams = registry.table("teams");

        let members = teams.relation("members").unwrap();
        assert_eq!(members.table_name, "people");
        assert_eq!(members.key, "memberId");
        let through = members.join_table().unwrap();
        assert_eq!(through.table_name, "memberships");
        assert_eq!(through.source_key, "groupId");

        let lead = teams.relation("lead").unwrap();
        assert_eq!(lead.key, "leadId");
        assert!(lead.dependent);

        let boards = teams.relation("boards").unwrap();
        assert_eq!(boards.table_name, "kanban");
        assert_eq!(boards.key, "ownerId");
    }

    #[test]
    fn invalid_declarations() {
        assert!(
            TableDef::new("teams")
                .relations_from_json(json!(["members"]))
                .is_err()
        );
        let error = Registry::builder()
            .table(TableDef::new("teams").relation(
                "members",
                RelationDecl {
                    belongs_to: Some("people".into()),
                    ..RelationDecl::has_many("people")
                },
            ))
            .build()
            .err()
            .expect("Two kinds must fail");
        assert!(matches!(
            error.downcast_ref::<OrmError>(),
            Some(OrmError::UnknownRelationKind { .. })
        ));
    }

    #[test]
    fn undeclared_tables() {
        let registry = Registry::builder()
            .table(TableDef::new("teams"))
            .build()
            .expect("Failed to build the registry");
        let ghosts = registry.table("ghosts");
        assert_eq!(ghosts.name(), "ghosts");
        assert_eq!(ghosts.relations().count(), 0);
        assert_eq!(registry.table_names(), ["ghosts", "teams"]);
    }
}
