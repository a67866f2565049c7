use crate::{Executor, Filter, Order, Record, Result, Select, Table, Value};
use std::mem;

/// Read builder on a table.
///
/// ```ignore
/// let page = users
///     .query()
///     .where_eq("active", true)
///     .order("lastName", Order::Asc)
///     .page(2, 20)
///     .include(["projects"])
///     .all(&connection)
///     .await?;
/// ```
#[derive(Clone)]
pub struct Query<'r> {
    table: Table<'r>,
    select: Select,
    include: Vec<String>,
}

impl<'r> Query<'r> {
    pub fn new(table: Table<'r>) -> Self {
        Self {
            table,
            select: Default::default(),
            include: Default::default(),
        }
    }

    pub fn where_filter(mut self, filter: Filter) -> Self {
        self.select.filter = mem::take(&mut self.select.filter).and(filter);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_filter(Filter::eq(field, value))
    }

    pub fn where_ne(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_filter(Filter::ne(field, value))
    }

    pub fn where_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.where_filter(Filter::is_in(field, values.into_iter().map(Into::into)))
    }

    pub fn where_not_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.where_filter(Filter::not_in(field, values.into_iter().map(Into::into)))
    }

    pub fn where_null(self, field: impl Into<String>) -> Self {
        self.where_filter(Filter::is_null(field))
    }

    pub fn order(mut self, field: impl Into<String>, order: Order) -> Self {
        self.select = self.select.order_by(field, order);
        self
    }

    /// Page `number`, starting from 1, of `size` rows.
    pub fn page(mut self, number: u64, size: u64) -> Self {
        self.select = self.select.page(number, size);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.select = self.select.offset(offset);
        self
    }

    /// Eager load these relations on the rows returned.
    pub fn include<S: Into<String>>(mut self, relations: impl IntoIterator<Item = S>) -> Self {
        self.include.extend(relations.into_iter().map(Into::into));
        self
    }

    pub fn select(&self) -> &Select {
        &self.select
    }

    pub async fn all<E: Executor>(&self, executor: &E) -> Result<Vec<Record>> {
        let rows = self.table.fetch_rows(executor, &self.select).await?;
        self.table.include(executor, rows, &self.include).await
    }

    pub async fn first<E: Executor>(&self, executor: &E) -> Result<Option<Record>> {
        let select = self.select.clone().limit(1);
        let rows = self.table.fetch_rows(executor, &select).await?;
        let rows = self.table.include(executor, rows, &self.include).await?;
        Ok(rows.into_iter().next())
    }

    /// Number of rows matching the filter, ignoring ordering and window.
    pub async fn count<E: Executor>(&self, executor: &E) -> Result<u64> {
        self.table.count(executor, &self.select.filter).await
    }
}
