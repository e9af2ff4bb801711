//! Persistence layer: relational storage for chat entities.
//!
//! [`ChatStore`](sqlite::ChatStore) owns the SQLite connection pool and
//! exposes the create/read/update/delete/upsert operations the handlers
//! need. The realtime layer never touches this module.

pub mod sqlite;

pub use sqlite::ChatStore;
