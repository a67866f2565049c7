mod accounts;
mod contexts;
mod errors;
mod hooks;
mod lists;
mod posts;
mod projects;
mod todos;
#[cfg(not(feature = "disable-transactions"))]
mod transaction1;

use crate::{
    accounts::accounts,
    contexts::contexts,
    errors::errors,
    hooks::hooks,
    lists::lists,
    posts::posts,
    projects::projects,
    todos::{todos, todos_query},
};
use log::LevelFilter;
use rowbind::{ColumnDef, Connection, Executor};
use std::env;
#[cfg(not(feature = "disable-transactions"))]
use transaction1::transaction1;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests<C: Connection>(connection: C) {
    todos(&connection).await;
    todos_query(&connection).await;
    projects(&connection).await;
    lists(&connection).await;
    accounts(&connection).await;
    posts(&connection).await;
    hooks(&connection).await;
    contexts(&connection).await;
    errors(&connection).await;
    #[cfg(not(feature = "disable-transactions"))]
    transaction1(&connection).await;
}

/// Drop and create `table` with the standard columns followed by `columns`.
pub async fn recreate_table<E: Executor>(
    executor: &E,
    table: &str,
    columns: impl IntoIterator<Item = ColumnDef>,
) {
    executor
        .drop_table(table, true)
        .await
        .unwrap_or_else(|e| panic!("Failed to drop table `{}`: {:#}", table, e));
    let columns = ColumnDef::standard()
        .into_iter()
        .chain(columns)
        .collect::<Vec<_>>();
    executor
        .create_table(table, &columns, false)
        .await
        .unwrap_or_else(|e| panic!("Failed to create table `{}`: {:#}", table, e));
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
