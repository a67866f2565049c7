//! Binds plain structured records to relational rows.
//!
//! Declare tables and their relations once in a [`Registry`], then save,
//! destroy, query and project whole record graphs through any [`Executor`].
pub use rowbind_core::*;
