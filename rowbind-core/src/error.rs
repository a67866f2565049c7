use thiserror::Error as ThisError;

/// Failures raised by the relational engine itself.
///
/// They travel inside [`crate::Error`]; inspect them with
/// `error.downcast_ref::<OrmError>()`. Storage errors coming from the executor
/// are propagated untouched and are not part of this taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum OrmError {
    #[error(
        "Relation `{relation}` of table `{table}` must declare exactly one of belongsTo, hasMany, hasOne, hasAndBelongsToMany"
    )]
    UnknownRelationKind { table: String, relation: String },
    #[error("Table `{table}` has no relation named `{relation}`")]
    UnknownRelationName { table: String, relation: String },
    #[error("Table `{table}` has no context named `{context}`")]
    ContextNotFound { table: String, context: String },
    #[error("Table `{0}` does not exist")]
    NoSuchTable(String),
    #[error("Relation `{relation}` of table `{table}` expects {expected}, found {found}")]
    InvalidRelationValue {
        table: String,
        relation: String,
        expected: &'static str,
        found: String,
    },
}
