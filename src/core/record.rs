//! Data access shared by every record type.
//!
//! A record maps 1:1 to a table whose first column is an autoincrement `id`.
//! Implementors describe their table and columns; lookups, inserts and
//! updates are provided here once.

use crate::db::{Connection, FieldMap};
use crate::error::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{Row, params_from_iter};
use serde::de::DeserializeOwned;
use tracing::info;

/// A typed row of one table.
pub trait Record: Sized + DeserializeOwned {
    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    /// Backing table.
    const TABLE: &'static str;

    /// Every column except `id`, in the order `values` yields them.
    const COLUMNS: &'static [&'static str];

    /// Surrogate key, `None` until inserted.
    fn id(&self) -> Option<i64>;

    /// Record the key assigned by the store.
    fn assign_id(&mut self, id: i64);

    /// Id of a persisted record, `NotPersisted` otherwise.
    fn persisted_id(&self) -> Result<i64> {
        self.id().ok_or(Error::NotPersisted {
            entity: Self::ENTITY,
        })
    }

    /// Build a record from a row, reading columns by name.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Values for `COLUMNS`, in order.
    fn values(&self) -> Vec<Value>;

    /// Every row of the table, by id.
    fn all(conn: &Connection) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id",
            select_list::<Self>(),
            Self::TABLE
        );
        conn.query(&sql, [], Self::from_row)
    }

    /// Look up a row by primary key.
    fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            select_list::<Self>(),
            Self::TABLE
        );
        conn.query_row(&sql, [id], Self::from_row)
    }

    /// Build a record from a field mapping such as one returned by
    /// [`Connection::execute`]. Absent optional fields become `None`.
    fn from_fields(fields: FieldMap) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
    }

    /// Insert the record and store the new id on it.
    ///
    /// Fails with `AlreadyPersisted` without touching the store if the
    /// record already has an id.
    fn create(&mut self, conn: &Connection) -> Result<i64> {
        insert(conn, self)
    }

    /// Write the record's fields back to its row.
    fn update(&self, conn: &Connection) -> Result<()> {
        update_row(conn, self)
    }
}

/// INSERT used by [`Record::create`]; available to implementors that
/// override `create` to prepare fields first.
pub fn insert<R: Record>(conn: &Connection, record: &mut R) -> Result<i64> {
    if let Some(id) = record.id() {
        return Err(Error::AlreadyPersisted {
            entity: R::ENTITY,
            id,
        });
    }

    let placeholders = (1..=R::COLUMNS.len())
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        R::TABLE,
        R::COLUMNS.join(", ")
    );

    conn.execute_update(&sql, params_from_iter(record.values()))?;
    let id = conn.last_insert_id();
    record.assign_id(id);
    info!(entity = R::ENTITY, id = id, "created record");
    Ok(id)
}

/// UPDATE used by [`Record::update`]; available to implementors that
/// override `update` to check fields first.
pub fn update_row<R: Record>(conn: &Connection, record: &R) -> Result<()> {
    let id = record.persisted_id()?;

    let assignments = R::COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, col)| format!("{col} = ?{}", idx + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{}",
        R::TABLE,
        R::COLUMNS.len() + 1
    );

    let mut values = record.values();
    values.push(Value::Integer(id));
    let changed = conn.execute_update(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Err(Error::NotFound {
            entity: R::ENTITY,
            id,
        });
    }
    Ok(())
}

/// `id` followed by the record's columns, qualified with the table name so
/// the list can be used in joins.
pub fn select_list<R: Record>() -> String {
    std::iter::once("id")
        .chain(R::COLUMNS.iter().copied())
        .map(|col| format!("{}.{col}", R::TABLE))
        .collect::<Vec<_>>()
        .join(", ")
}
