use crate::{
    Error, OrmError, Result,
    inflect::{plural, singular},
};
use serde::Deserialize;

/// Kind of association between two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The owner row carries the foreign key of one related row.
    BelongsTo,
    /// Related rows carry the owner identity in their foreign key.
    HasMany,
    /// Like `HasMany`, at most one related row per owner.
    HasOne,
    /// Rows of a join table link owners and related rows.
    HasAndBelongsToMany,
}

/// Join table of a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    pub table_name: String,
    /// Join table column holding the owner identity.
    pub source_key: String,
}

/// Canonical relation, built once per table out of a [`RelationDecl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDefinition {
    pub name: String,
    pub kind: RelationKind,
    /// Related table.
    pub table_name: String,
    /// Foreign key column: on the owner for `BelongsTo`, on the related table
    /// for `HasMany`/`HasOne`, on the join table for `HasAndBelongsToMany`.
    pub key: String,
    /// Present for `HasAndBelongsToMany` only.
    pub through: Option<JoinTable>,
    pub dependent: bool,
}

impl RelationDefinition {
    pub fn join_table(&self) -> Result<&JoinTable> {
        self.through.as_ref().ok_or_else(|| {
            Error::msg(format!(
                "Relation `{}` ({:?}) has no join table",
                self.name, self.kind
            ))
        })
    }
}

/// Relation shorthand as users write it.
///
/// Exactly one of the four kind fields must be present, its value names the
/// related table (an empty string means "same as the relation name"). The
/// other fields override the derived defaults. Deserializes from the camel
/// cased JSON form:
///
/// ```json
/// { "hasMany": "tasks", "foreignKey": "listId", "dependent": true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelationDecl {
    pub belongs_to: Option<String>,
    pub has_many: Option<String>,
    pub has_one: Option<String>,
    pub has_and_belongs_to_many: Option<String>,
    pub table: Option<String>,
    pub foreign_key: Option<String>,
    pub through: Option<String>,
    pub primary_key: Option<String>,
    #[serde(default)]
    pub dependent: bool,
}

impl RelationDecl {
    pub fn belongs_to(table: impl Into<String>) -> Self {
        Self {
            belongs_to: Some(table.into()),
            ..Default::default()
        }
    }

    pub fn has_many(table: impl Into<String>) -> Self {
        Self {
            has_many: Some(table.into()),
            ..Default::default()
        }
    }

    pub fn has_one(table: impl Into<String>) -> Self {
        Self {
            has_one: Some(table.into()),
            ..Default::default()
        }
    }

    pub fn has_and_belongs_to_many(table: impl Into<String>) -> Self {
        Self {
            has_and_belongs_to_many: Some(table.into()),
            ..Default::default()
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn foreign_key(mut self, key: impl Into<String>) -> Self {
        self.foreign_key = Some(key.into());
        self
    }

    pub fn through(mut self, table: impl Into<String>) -> Self {
        self.through = Some(table.into());
        self
    }

    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    pub fn dependent(mut self, dependent: bool) -> Self {
        self.dependent = dependent;
        self
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::new(e).context("Invalid relation declaration"))
    }

    /// Canonical definition of relation `name` owned by table `owner`.
    ///
    /// Defaults: `BelongsTo` key `<singular name>Id`; `HasMany`/`HasOne` key
    /// `<singular owner>Id`; `HasAndBelongsToMany` key `<singular name>Id`,
    /// source key `<singular owner>Id` and join table made of the plural owner
    /// and relation names, sorted and joined by `_`.
    pub fn normalize(&self, owner: &str, name: &str) -> Result<RelationDefinition> {
        let declared = [
            (RelationKind::BelongsTo, &self.belongs_to),
            (RelationKind::HasMany, &self.has_many),
            (RelationKind::HasOne, &self.has_one),
            (RelationKind::HasAndBelongsToMany, &self.has_and_belongs_to_many),
        ]
        .into_iter()
        .filter_map(|(kind, target)| target.as_ref().map(|v| (kind, v)))
        .collect::<Vec<_>>();
        let [(kind, target)] = declared[..] else {
            return Err(OrmError::UnknownRelationKind {
                table: owner.into(),
                relation: name.into(),
            }
            .into());
        };
        let table_name = self
            .table
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| Some(target.clone()).filter(|v| !v.is_empty()))
            .unwrap_or_else(|| name.to_owned());
        let key = self.foreign_key.clone().unwrap_or_else(|| match kind {
            RelationKind::BelongsTo | RelationKind::HasAndBelongsToMany => key_for(name),
            RelationKind::HasMany | RelationKind::HasOne => key_for(owner),
        });
        let through = (kind == RelationKind::HasAndBelongsToMany).then(|| JoinTable {
            table_name: self
                .through
                .clone()
                .unwrap_or_else(|| join_table_name(owner, name)),
            source_key: self.primary_key.clone().unwrap_or_else(|| key_for(owner)),
        });
        Ok(RelationDefinition {
            name: name.to_owned(),
            kind,
            table_name,
            key,
            through,
            dependent: self.dependent,
        })
    }
}

fn key_for(name: &str) -> String {
    format!("{}Id", singular(name))
}

fn join_table_name(owner: &str, relation: &str) -> String {
    let mut names = [plural(owner), plural(relation)];
    names.sort();
    names.join("_")
}

#[cfg(test)]
mod tests {
    use super::{JoinTable, RelationDecl, RelationKind};
    use crate::OrmError;

    #[test]
    fn defaults() {
        let relation = RelationDecl::has_many("tasks")
            .normalize("lists", "tasks")
            .unwrap();
        assert_eq!(relation.kind, RelationKind::HasMany);
        assert_eq!(relation.table_name, "tasks");
        assert_eq!(relation.key, "listId");
        assert_eq!(relation.through, None);
        assert!(!relation.dependent);

        let relation = RelationDecl::belongs_to("users")
            .normalize("posts", "author")
            .unwrap();
        assert_eq!(relation.table_name, "users");
        assert_eq!(relation.key, "authorId");

        let relation = RelationDecl::has_and_belongs_to_many("projects")
            .normalize("users", "projects")
            .unwrap();
        assert_eq!(relation.key, "projectId");
        assert_eq!(
            relation.through,
            Some(JoinTable {
                table_name: "projects_users".into(),
                source_key: "userId".into(),
            })
        );
    }

    #[test]
    fn overrides_win() {
        let relation = RelationDecl::has_and_belongs_to_many("")
            .table("labels")
            .foreign_key("labelRef")
            .through("tagging")
            .primary_key("ownerRef")
            .dependent(true)
            .normalize("articles", "tags")
            .unwrap();
        assert_eq!(relation.table_name, "labels");
        assert_eq!(relation.key, "labelRef");
        assert_eq!(relation.join_table().unwrap().table_name, "tagging");
        assert_eq!(relation.join_table().unwrap().source_key, "ownerRef");
        assert!(relation.dependent);
    }

    #[test]
    fn empty_target_is_the_relation_name() {
        let relation = RelationDecl::has_one("").normalize("users", "profile").unwrap();
        assert_eq!(relation.table_name, "profile");
        assert_eq!(relation.key, "userId");
    }

    #[test]
    fn unknown_kind() {
        let error = RelationDecl::default()
            .normalize("users", "things")
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<OrmError>(),
            Some(&OrmError::UnknownRelationKind {
                table: "users".into(),
                relation: "things".into()
            })
        );
        let mut ambiguous = RelationDecl::has_many("a");
        ambiguous.has_one = Some("b".into());
        assert!(ambiguous.normalize("users", "things").is_err());
    }
}
