use crate::{Executor, Result, Transaction};
use std::future::Future;

pub trait Connection: Executor + Sized {
    /// Open a connection to the backend identified by `url`.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;

    /// Begin a transaction. Pass it wherever an executor is expected to scope
    /// the work to it, then `commit` or `rollback`.
    fn begin(&self) -> impl Future<Output = Result<impl Transaction<'_>>> + Send;
}
