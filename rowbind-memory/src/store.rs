use rowbind_core::{
    ColumnDef, ColumnType, Error, Filter, ID, Order, OrmError, Record, Result, RowsAffected,
    Select, Value,
};
use std::{
    cmp::Ordering,
    collections::{HashMap, hash_map::Entry},
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

#[derive(Default, Debug, Clone)]
pub(crate) struct MemoryTable {
    columns: Vec<ColumnDef>,
    rows: Vec<Record>,
}

impl MemoryTable {
    fn column(&self, table: &str, name: &str) -> Result<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::msg(format!("Table `{}` has no column `{}`", table, name)))
    }

    /// Check `row` against the columns, converting text to the column type when it parses.
    fn conform(&self, table: &str, row: Record) -> Result<Record> {
        let mut result = Record::new();
        for (name, value) in row {
            let column = self.column(table, &name)?;
            let value = coerce(column.column_type, value);
            if value.is_null() && !column.nullable {
                return Err(Error::msg(format!(
                    "Column `{}` of `{}` cannot be null",
                    name, table
                )));
            }
            result.insert(name, value);
        }
        Ok(result)
    }
}

fn coerce(column_type: ColumnType, value: Value) -> Value {
    match (column_type, value) {
        (ColumnType::Uuid, Value::Varchar(v)) => match Uuid::parse_str(&v) {
            Ok(uuid) => Value::Uuid(uuid),
            Err(..) => Value::Varchar(v),
        },
        (ColumnType::Timestamp, Value::Varchar(v)) => match OffsetDateTime::parse(&v, &Rfc3339) {
            Ok(timestamp) => Value::Timestamp(timestamp),
            Err(..) => Value::Varchar(v),
        },
        (ColumnType::Json, v @ (Value::List(..) | Value::Map(..))) => {
            Value::Varchar(v.to_json_text())
        }
        (ColumnType::Float, Value::Int64(v)) => Value::Float64(v as f64),
        (_, v) => v,
    }
}

/// Tables and their rows, in insertion order.
#[derive(Default, Debug, Clone)]
pub(crate) struct Store {
    tables: HashMap<String, MemoryTable>,
}

impl Store {
    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| OrmError::NoSuchTable(name.into()).into())
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemoryTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| OrmError::NoSuchTable(name.into()).into())
    }

    pub(crate) fn table_names(&self) -> Vec<String> {
        let mut names = self.tables.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub(crate) fn create_table(
        &mut self,
        name: &str,
        columns: &[ColumnDef],
        if_not_exists: bool,
    ) -> Result<()> {
        match self.tables.entry(name.to_owned()) {
            Entry::Occupied(..) if if_not_exists => Ok(()),
            Entry::Occupied(..) => Err(Error::msg(format!("Table `{}` already exists", name))),
            Entry::Vacant(entry) => {
                entry.insert(MemoryTable {
                    columns: columns.to_vec(),
                    rows: Vec::new(),
                });
                log::debug!("Created table `{}` with {} columns", name, columns.len());
                Ok(())
            }
        }
    }

    pub(crate) fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<()> {
        if self.tables.remove(name).is_none() && !if_exists {
            return Err(OrmError::NoSuchTable(name.into()).into());
        }
        Ok(())
    }

    pub(crate) fn columns(&self, name: &str) -> Result<Vec<ColumnDef>> {
        Ok(self.table(name)?.columns.clone())
    }

    pub(crate) fn select(&self, name: &str, select: &Select) -> Result<Vec<Record>> {
        let table = self.table(name)?;
        let mut rows = table
            .rows
            .iter()
            .filter(|row| select.filter.matches(row))
            .collect::<Vec<_>>();
        if !select.order.is_empty() {
            rows.sort_by(|a, b| {
                select
                    .order
                    .iter()
                    .map(|(field, order)| {
                        let ordering = a.value(field).compare(b.value(field));
                        match order {
                            Order::Asc => ordering,
                            Order::Desc => ordering.reverse(),
                        }
                    })
                    .find(|v| *v != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        let offset = select.offset.unwrap_or(0) as usize;
        let limit = select.limit.map_or(usize::MAX, |v| v as usize);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    pub(crate) fn count(&self, name: &str, filter: &Filter) -> Result<u64> {
        let table = self.table(name)?;
        Ok(table.rows.iter().filter(|row| filter.matches(row)).count() as u64)
    }

    pub(crate) fn insert(&mut self, name: &str, row: Record) -> Result<Record> {
        let table = self.table_mut(name)?;
        let mut row = table.conform(name, row)?;
        for column in &table.columns {
            if !row.contains_key(column.name()) {
                if !column.nullable {
                    return Err(Error::msg(format!(
                        "Column `{}` of `{}` cannot be null",
                        column.name(),
                        name
                    )));
                }
                row.insert(column.name().to_owned(), Value::Null);
            }
        }
        if let Some(id) = row.id()
            && table.rows.iter().any(|v| v.value(ID) == id)
        {
            return Err(Error::msg(format!(
                "Duplicate id {} in table `{}`",
                id, name
            )));
        }
        table.rows.push(row.clone());
        Ok(row)
    }

    pub(crate) fn update(
        &mut self,
        name: &str,
        filter: &Filter,
        changes: Record,
    ) -> Result<Vec<Record>> {
        let table = self.table_mut(name)?;
        let changes = table.conform(name, changes)?;
        let mut updated = Vec::new();
        for row in table.rows.iter_mut().filter(|row| filter.matches(row)) {
            row.extend(changes.iter().map(|(k, v)| (k.clone(), v.clone())));
            updated.push(row.clone());
        }
        Ok(updated)
    }

    pub(crate) fn delete(&mut self, name: &str, filter: &Filter) -> Result<RowsAffected> {
        let table = self.table_mut(name)?;
        let before = table.rows.len();
        table.rows.retain(|row| !filter.matches(row));
        Ok(RowsAffected {
            rows_affected: (before - table.rows.len()) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use rowbind_core::{ColumnDef, ColumnType, Filter, Order, OrmError, Record, Select, Value};

    fn store() -> Store {
        let mut store = Store::default();
        let mut columns = ColumnDef::standard().to_vec();
        columns.push(ColumnDef::new("name", ColumnType::Varchar));
        columns.push(ColumnDef::new("rank", ColumnType::Integer));
        store.create_table("items", &columns, false).unwrap();
        for (name, rank) in [("b", 2), ("a", 1), ("c", 3), ("d", 2)] {
            store
                .insert(
                    "items",
                    Record::new()
                        .with("id", Value::new_id())
                        .with("name", name)
                        .with("rank", rank),
                )
                .unwrap();
        }
        store
    }

    fn names(rows: &[Record]) -> Vec<&str> {
        rows.iter()
            .map(|r| r.value("name").as_str().unwrap())
            .collect()
    }

    #[test]
    fn select_orders_and_windows() {
        let store = store();
        let rows = store
            .select(
                "items",
                &Select::default()
                    .order_by("rank", Order::Desc)
                    .order_by("name", Order::Asc),
            )
            .unwrap();
        assert_eq!(names(&rows), ["c", "b", "d", "a"]);
        let rows = store
            .select(
                "items",
                &Select::default().order_by("name", Order::Asc).page(2, 3),
            )
            .unwrap();
        assert_eq!(names(&rows), ["d"]);
        let rows = store.select("items", &Select::default()).unwrap();
        assert_eq!(names(&rows), ["b", "a", "c", "d"]);
    }

    #[test]
    fn insert_fills_and_checks() {
        let mut store = store();
        let row = store
            .insert("items", Record::new().with("id", Value::new_id()))
            .unwrap();
        assert!(row.value("name").is_null());
        assert!(row.contains_key("createdAt"));
        assert!(
            store
                .insert("items", Record::new().with("id", Value::new_id()).with("color", "red"))
                .is_err()
        );
        assert!(store.insert("items", Record::new().with("name", "x")).is_err());
        let id = row.value("id").key();
        assert!(
            store
                .insert("items", Record::new().with("id", id.as_str()))
                .is_err(),
            "Duplicate id written as text must be detected"
        );
    }

    #[test]
    fn update_and_delete() {
        let mut store = store();
        let updated = store
            .update(
                "items",
                &Filter::eq("rank", 2),
                Record::new().with("name", "two"),
            )
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(store.count("items", &Filter::eq("name", "two")).unwrap(), 2);
        let deleted = store.delete("items", &Filter::gt("rank", 1)).unwrap();
        assert_eq!(deleted.rows_affected, 3);
        assert_eq!(store.count("items", &Filter::All).unwrap(), 1);
    }

    #[test]
    fn missing_table() {
        let store = Store::default();
        let error = store.columns("ghosts").unwrap_err();
        assert_eq!(
            error.downcast_ref::<OrmError>(),
            Some(&OrmError::NoSuchTable("ghosts".into()))
        );
    }
}
