//! Database connection management.

use crate::error::{Error, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection as SqliteConnection, OptionalExtension, Params, Row};
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "questions.db";

/// A result row keyed by column name, with SQLite values translated to
/// native JSON numbers, strings and nulls.
pub type FieldMap = Map<String, Value>;

/// Path to the questions database file.
#[derive(Debug, Clone)]
pub struct DbPath {
    path: PathBuf,
}

impl DbPath {
    /// Create a DbPath from a string path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path as a reference.
    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

/// The store handle.
///
/// Constructed once by the caller and passed by reference into every record
/// operation. The wrapped `rusqlite::Connection` is not `Sync`, so a handle
/// can only be used from the thread that owns it; nothing here serializes
/// concurrent writers. Open one handle per thread if more are needed.
pub struct Connection {
    conn: SqliteConnection,
}

impl Connection {
    /// Open a connection to the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening store");
        let conn = SqliteConnection::open(path)?;
        Self::configure(conn)
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = SqliteConnection::open_in_memory()?;
        Self::configure(conn)
    }

    fn configure(conn: SqliteConnection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying SqliteConnection.
    pub fn as_conn(&self) -> &SqliteConnection {
        &self.conn
    }

    /// Run a statement and return every result row as a field mapping.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<Vec<FieldMap>> {
        debug!(%sql, "execute");
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut fields = FieldMap::new();
            for (idx, name) in names.iter().enumerate() {
                fields.insert(name.clone(), translate(row.get_ref(idx)?));
            }
            out.push(fields);
        }
        Ok(out)
    }

    /// Run a write statement and return the number of rows changed.
    pub fn execute_update<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        debug!(%sql, "execute_update");
        self.conn.execute(sql, params).map_err(Error::from)
    }

    /// Query multiple rows, mapping each one with `f`.
    pub fn query<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!(%sql, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, f)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Query at most one row. No match is `Ok(None)`.
    pub fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!(%sql, "query_row");
        self.conn
            .query_row(sql, params, f)
            .optional()
            .map_err(Error::from)
    }

    /// Get the id assigned by the last successful INSERT.
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Check if a table exists.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        Ok(stmt.exists([table_name])?)
    }
}

fn translate(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(b.to_vec()),
    }
}
