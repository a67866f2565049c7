use std::borrow::Cow;

/// Storage type of a column, as reported by the executor's introspection.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Uuid,
    #[default]
    Varchar,
    Integer,
    Float,
    Boolean,
    Timestamp,
    /// Structured data stored as JSON text, decoded back on read.
    Json,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: Cow<'static, str>,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<Cow<'static, str>>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `id`, `createdAt` and `updatedAt` columns every mapped table carries.
    pub fn standard() -> [ColumnDef; 3] {
        [
            ColumnDef::new(crate::ID, ColumnType::Uuid).not_null(),
            ColumnDef::new(crate::CREATED_AT, ColumnType::Timestamp),
            ColumnDef::new(crate::UPDATED_AT, ColumnType::Timestamp),
        ]
    }
}
