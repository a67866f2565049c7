mod column;
mod connection;
mod context;
mod destroy;
mod eager;
mod error;
mod executor;
mod filter;
mod hooks;
pub mod inflect;
mod persist;
mod query;
mod record;
mod registry;
mod relation;
mod select;
mod table;
mod transaction;
mod value;

pub use ::anyhow::Context;
pub use column::*;
pub use connection::*;
pub use context::*;
pub use error::*;
pub use executor::*;
pub use filter::*;
pub use hooks::*;
pub use persist::SaveOptions;
pub use query::*;
pub use record::*;
pub use registry::*;
pub use relation::*;
pub use select::*;
pub use table::*;
pub use transaction::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
