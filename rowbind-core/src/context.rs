use crate::{OrmError, Record, Result, Table, Value};
use std::{fmt, sync::Arc};

/// Name of the context applied when none is requested.
pub const DEFAULT_CONTEXT: &str = "default";

/// A view of the records of a table.
#[derive(Clone)]
pub enum ContextDef {
    /// Keep only these fields, in this order. Relation fields are projected
    /// through the related table's context of the same name, or its default.
    Fields(Vec<String>),
    /// Build the output out of a copy of the record.
    Transform(Arc<dyn Fn(Record) -> Record + Send + Sync>),
}

impl ContextDef {
    pub fn fields<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        ContextDef::Fields(fields.into_iter().map(Into::into).collect())
    }

    pub fn transform(transform: impl Fn(Record) -> Record + Send + Sync + 'static) -> Self {
        ContextDef::Transform(Arc::new(transform))
    }
}

impl fmt::Debug for ContextDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextDef::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            ContextDef::Transform(..) => f.write_str("Transform(..)"),
        }
    }
}

/// Which context to project with.
#[derive(Debug, Clone, Copy, Default)]
pub enum ContextSelector<'a> {
    /// The `default` context, passthrough when the table has none.
    #[default]
    Default,
    /// A registered context, it must exist.
    Named(&'a str),
    /// A context given in place.
    Inline(&'a ContextDef),
}

impl<'a> From<&'a str> for ContextSelector<'a> {
    fn from(value: &'a str) -> Self {
        if value == DEFAULT_CONTEXT {
            ContextSelector::Default
        } else {
            ContextSelector::Named(value)
        }
    }
}

impl<'a> From<&'a ContextDef> for ContextSelector<'a> {
    fn from(value: &'a ContextDef) -> Self {
        ContextSelector::Inline(value)
    }
}

impl<'r> Table<'r> {
    pub fn has_context(&self, name: &str) -> bool {
        self.model.contexts.contains_key(name)
    }

    /// Project a record, or each record of a list, through a context.
    ///
    /// Values that are neither records nor lists are returned as they are.
    pub fn with_context<'s>(
        &self,
        value: &Value,
        selector: impl Into<ContextSelector<'s>>,
    ) -> Result<Value> {
        let selector = selector.into();
        Ok(match value {
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|v| self.with_context(v, selector))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(record) => Value::Map(self.project(record, selector)?),
            other => other.clone(),
        })
    }

    pub fn with_context_many<'s>(
        &self,
        records: &[Record],
        selector: impl Into<ContextSelector<'s>>,
    ) -> Result<Vec<Record>> {
        let selector = selector.into();
        records.iter().map(|r| self.project(r, selector)).collect()
    }

    pub fn project(&self, record: &Record, selector: ContextSelector<'_>) -> Result<Record> {
        let context = match selector {
            ContextSelector::Default => self.model.contexts.get(DEFAULT_CONTEXT),
            ContextSelector::Named(name) if name == DEFAULT_CONTEXT => {
                self.model.contexts.get(DEFAULT_CONTEXT)
            }
            ContextSelector::Named(name) => Some(self.model.contexts.get(name).ok_or_else(|| {
                OrmError::ContextNotFound {
                    table: self.name().into(),
                    context: name.into(),
                }
            })?),
            ContextSelector::Inline(context) => Some(context),
        };
        let Some(context) = context else {
            return Ok(record.clone());
        };
        match context {
            ContextDef::Transform(transform) => Ok(transform(record.clone())),
            ContextDef::Fields(fields) => {
                let mut result = Record::new();
                for field in fields {
                    let Some(value) = record.get(field) else {
                        continue;
                    };
                    let value = match self.model.relations.get(field) {
                        Some(relation) => {
                            let related = self.related(relation);
                            let nested = match selector {
                                ContextSelector::Named(name) if related.has_context(name) => {
                                    ContextSelector::Named(name)
                                }
                                _ => ContextSelector::Default,
                            };
                            related.with_context(value, nested)?
                        }
                        None => value.clone(),
                    };
                    result.insert(field.clone(), value);
                }
                Ok(result)
            }
        }
    }
}
