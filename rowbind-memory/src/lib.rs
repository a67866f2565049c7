mod connection;
mod store;
mod transaction;

pub use connection::*;
pub use transaction::*;
