use crate::{
    ColumnDef, ContextDef, Error, Hook, Hooks, Record, RelationDecl, RelationDefinition, Result,
    Table,
};
use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    sync::{Arc, PoisonError, RwLock},
};
use tokio::sync::OnceCell;

/// Declaration of a mapped table: relations, contexts and hooks.
#[derive(Debug, Default)]
pub struct TableDef {
    name: String,
    relations: BTreeMap<String, RelationDecl>,
    contexts: HashMap<String, ContextDef>,
    hooks: Hooks,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn relation(mut self, name: impl Into<String>, relation: RelationDecl) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    /// Add the relations of a JSON object mapping each relation name to its shorthand.
    pub fn relations_from_json(mut self, relations: serde_json::Value) -> Result<Self> {
        let relations: BTreeMap<String, RelationDecl> = serde_json::from_value(relations)
            .map_err(|e| {
                Error::new(e).context(format!("Invalid relations for table `{}`", self.name))
            })?;
        self.relations.extend(relations);
        Ok(self)
    }

    pub fn context(mut self, name: impl Into<String>, context: ContextDef) -> Self {
        self.contexts.insert(name.into(), context);
        self
    }

    pub fn hook(
        mut self,
        hook: Hook,
        callback: impl Fn(&mut Record) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.register(hook, callback);
        self
    }
}

/// Built table definition, shared by every handle on the table.
#[derive(Debug)]
pub(crate) struct Model {
    pub(crate) name: String,
    pub(crate) relations: BTreeMap<String, RelationDefinition>,
    pub(crate) contexts: HashMap<String, ContextDef>,
    pub(crate) hooks: Hooks,
    pub(crate) schema: OnceCell<Arc<[ColumnDef]>>,
}

impl Model {
    fn build(def: TableDef) -> Result<Self> {
        let relations = def
            .relations
            .iter()
            .map(|(name, decl)| decl.normalize(&def.name, name).map(|v| (name.clone(), v)))
            .collect::<Result<_>>()?;
        Ok(Self {
            name: def.name,
            relations,
            contexts: def.contexts,
            hooks: def.hooks,
            schema: OnceCell::new(),
        })
    }

    fn empty(name: &str) -> Self {
        Self {
            name: name.into(),
            relations: Default::default(),
            contexts: Default::default(),
            hooks: Default::default(),
            schema: OnceCell::new(),
        }
    }
}

/// Lookup of table definitions by name.
///
/// Relations reference their target by name and resolve it here, so tables
/// referencing each other never own one another.
#[derive(Debug, Default)]
pub struct Registry {
    models: RwLock<HashMap<String, Arc<Model>>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Handle on table `name`. Tables not declared get an empty definition.
    pub fn table(&self, name: &str) -> Table<'_> {
        if let Some(model) = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Table::new(model.clone(), self);
        }
        let model = self
            .models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(Model::empty(name)))
            .clone();
        Table::new(model, self)
    }

    /// Names of the known tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tables: Vec<TableDef>,
}

impl RegistryBuilder {
    pub fn table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    /// Normalize every relation, fails on the first invalid declaration.
    pub fn build(self) -> Result<Registry> {
        let mut models = HashMap::new();
        for def in self.tables {
            let model = Model::build(def)?;
            match models.entry(model.name.clone()) {
                Entry::Occupied(..) => {
                    return Err(Error::msg(format!(
                        "Table `{}` is declared more than once",
                        model.name
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(model));
                }
            }
        }
        Ok(Registry {
            models: RwLock::new(models),
        })
    }
}
