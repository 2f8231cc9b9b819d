//! Table-level storage contract and its SQLite implementation.
//!
//! # Responsibility
//! - Define the `StorageEngine` calls consumed by the pet provider.
//! - Translate typed projections, field sets and selections into SQL.
//!
//! # Invariants
//! - The connection is opened on first use and reused for the handle lifetime.
//! - Column identifiers come only from typed `PetColumn`/`PetField` values.
//! - `insert` reports constraint failures as `Ok(None)`, never as a raw error.

use super::cursor::PetCursor;
use super::open::{open_db, open_db_in_memory};
use super::{DbError, DbResult};
use crate::model::pet::PetColumn;
use crate::model::values::{FieldValue, PetValues, Selection, SortOrder};
use log::{debug, error};
use once_cell::unsync::OnceCell;
use rusqlite::{params_from_iter, Connection};
use std::path::PathBuf;

/// Storage calls the pet provider depends on.
pub trait StorageEngine {
    /// Returns a connection for read paths. Idempotent.
    fn open_readable(&self) -> DbResult<&Connection>;
    /// Returns a connection for write paths. Idempotent.
    fn open_writable(&self) -> DbResult<&Connection>;

    /// Runs a query. An empty `projection` selects every column.
    fn query(
        &self,
        table: &str,
        projection: &[PetColumn],
        selection: &Selection,
        sort_order: &[SortOrder],
    ) -> DbResult<PetCursor>;

    /// Inserts one row, returning its row id or `None` when storage rejected it.
    fn insert(&self, table: &str, values: &PetValues) -> DbResult<Option<i64>>;

    /// Updates matching rows and returns how many changed.
    fn update(&self, table: &str, values: &PetValues, selection: &Selection) -> DbResult<usize>;

    /// Deletes matching rows and returns how many were removed.
    fn delete(&self, table: &str, selection: &Selection) -> DbResult<usize>;
}

/// Where a `SqliteStorage` keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    File(PathBuf),
    Memory,
}

/// SQLite-backed storage engine with a lazily opened connection.
pub struct SqliteStorage {
    target: StorageTarget,
    conn: OnceCell<Connection>,
}

impl SqliteStorage {
    pub fn new(target: StorageTarget) -> Self {
        Self {
            target,
            conn: OnceCell::new(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageTarget::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StorageTarget::Memory)
    }

    pub fn target(&self) -> &StorageTarget {
        &self.target
    }

    /// Whether the connection has been opened yet.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    fn connection(&self) -> DbResult<&Connection> {
        self.conn.get_or_try_init(|| match &self.target {
            StorageTarget::File(path) => open_db(path),
            StorageTarget::Memory => open_db_in_memory(),
        })
    }
}

impl StorageEngine for SqliteStorage {
    fn open_readable(&self) -> DbResult<&Connection> {
        self.connection()
    }

    fn open_writable(&self) -> DbResult<&Connection> {
        self.connection()
    }

    fn query(
        &self,
        table: &str,
        projection: &[PetColumn],
        selection: &Selection,
        sort_order: &[SortOrder],
    ) -> DbResult<PetCursor> {
        let conn = self.open_readable()?;
        let columns = if projection.is_empty() {
            PetColumn::ALL.to_vec()
        } else {
            projection.to_vec()
        };

        let column_list = columns
            .iter()
            .map(|column| column.column_name())
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {column_list} FROM {}", quote_ident(table));
        push_where(&mut sql, selection)?;
        if !sort_order.is_empty() {
            let terms = sort_order
                .iter()
                .map(|order| order.to_sql())
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms);
        }
        debug!("event=storage_query module=db status=start sql={sql}");

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(selection.args()))?;
        let mut fetched = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|index| row.get::<_, FieldValue>(index))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            fetched.push(values);
        }

        Ok(PetCursor::new(columns, fetched))
    }

    fn insert(&self, table: &str, values: &PetValues) -> DbResult<Option<i64>> {
        let conn = self.open_writable()?;
        let sql = if values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table))
        } else {
            let names = values
                .iter()
                .map(|(field, _)| field.column_name())
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = vec!["?"; values.len()].join(", ");
            format!(
                "INSERT INTO {} ({names}) VALUES ({placeholders})",
                quote_ident(table)
            )
        };

        match conn.execute(&sql, params_from_iter(values.iter().map(|(_, value)| value))) {
            Ok(_) => Ok(Some(conn.last_insert_rowid())),
            Err(err @ rusqlite::Error::SqliteFailure(..)) => {
                error!(
                    "event=storage_insert module=db status=error table={table} fields={} error={err}",
                    values.field_names()
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, table: &str, values: &PetValues, selection: &Selection) -> DbResult<usize> {
        if values.is_empty() {
            return Ok(0);
        }

        let conn = self.open_writable()?;
        let assignments = values
            .iter()
            .map(|(field, _)| format!("{} = ?", field.column_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {} SET {assignments}", quote_ident(table));
        push_where(&mut sql, selection)?;

        let params = values
            .iter()
            .map(|(_, value)| value)
            .chain(selection.args());
        let changed = conn.execute(&sql, params_from_iter(params))?;
        Ok(changed)
    }

    fn delete(&self, table: &str, selection: &Selection) -> DbResult<usize> {
        let conn = self.open_writable()?;
        let mut sql = format!("DELETE FROM {}", quote_ident(table));
        push_where(&mut sql, selection)?;

        let changed = conn.execute(&sql, params_from_iter(selection.args()))?;
        Ok(changed)
    }
}

/// Appends the selection's `WHERE` clause.
///
/// Arguments without a clause are rejected rather than bound to nothing.
fn push_where(sql: &mut String, selection: &Selection) -> DbResult<()> {
    match selection.clause() {
        Some(clause) if !clause.trim().is_empty() => {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
            Ok(())
        }
        _ if selection.args().is_empty() => Ok(()),
        _ => Err(DbError::InvalidData(format!(
            "selection binds {} argument(s) without a clause",
            selection.args().len()
        ))),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
