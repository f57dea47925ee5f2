//! Database layer for the Q&A store.
//!
//! Handles the SQLite connection, schema creation, and row-to-mapping
//! translation.

mod connection;
pub mod schema;

pub use connection::{Connection, DbPath, FieldMap, DEFAULT_DB_FILE};
pub use schema::Schema;
