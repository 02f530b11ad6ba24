use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use crate::config::TableMode;
use crate::error::LoadError;
use crate::parser::SqlValue;
use crate::schema::TableSchema;
use crate::transform::RowSet;

/// Owns the destination database connection
pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Open (or create) the destination database.
    ///
    /// Foreign keys are declared but not enforced while loading; integrity
    /// follows from load order and is checked once before commit.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Ok(Self { conn })
    }

    /// Begin the single transaction that spans the whole load.
    ///
    /// Dropping it without `commit()` rolls every table back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin load transaction")
    }

    /// Refresh planner statistics after a committed load
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create (or reuse) the table according to `mode` and insert `rows`.
///
/// Returns the number of rows actually written. In append mode rows whose
/// key already exists are skipped.
pub fn materialize(
    conn: &Connection,
    schema: &TableSchema,
    rows: &RowSet,
    mode: TableMode,
    batch_size: usize,
) -> Result<u64> {
    let exists = table_exists(conn, schema.name)?;
    match mode {
        TableMode::Fail if exists => {
            return Err(LoadError::TableExists(schema.name.to_string()).into());
        }
        TableMode::Replace => {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", schema.name))
                .with_context(|| format!("Failed to drop table: {}", schema.name))?;
        }
        _ => {}
    }

    let append = mode == TableMode::Append;
    conn.execute(&generate_create_table(schema, append), [])
        .with_context(|| format!("Failed to create table: {}", schema.name))?;

    for index_sql in generate_indexes(schema, append) {
        conn.execute(&index_sql, [])
            .with_context(|| format!("Failed to create index for: {}", schema.name))?;
    }

    let order = schema
        .columns
        .iter()
        .map(|c| rows.column_index(c.name))
        .collect::<Result<Vec<_>, _>>()?;
    let insert_sql = generate_insert(schema, append);

    let mut written: u64 = 0;
    for batch in rows.rows().chunks(batch_size.max(1)) {
        written += insert_batch(conn, &insert_sql, &order, batch)
            .with_context(|| format!("Failed to insert into: {}", schema.name))?;
    }

    Ok(written)
}

/// Insert a batch of rows, binding columns in schema order
fn insert_batch(
    conn: &Connection,
    sql: &str,
    order: &[usize],
    batch: &[Vec<SqlValue>],
) -> Result<u64> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut written: u64 = 0;

    for row in batch {
        for (pos, &idx) in order.iter().enumerate() {
            row[idx].bind_to(pos + 1, &mut stmt)?;
        }
        written += stmt.raw_execute()? as u64;
    }

    Ok(written)
}

/// Fail if any declared foreign key value has no parent row
pub fn verify_foreign_keys(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
    let mut rows = stmt.query([])?;

    if let Some(row) = rows.next()? {
        let table: String = row.get(0)?;
        let rowid: Option<i64> = row.get(1)?;
        let parent: String = row.get(2)?;
        return Err(LoadError::ForeignKeyViolation {
            table,
            rowid: rowid.unwrap_or_default(),
            parent,
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{AREAS, LOCAIS};

    fn count_rows(conn: &Connection, table: &str) -> u64 {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        conn.query_row(&sql, [], |row| row.get::<_, i64>(0)).unwrap() as u64
    }

    fn areas(ids: &[i64]) -> RowSet {
        let mut rows = RowSet::new(["areaId", "nome"]);
        for id in ids {
            rows.push(vec![SqlValue::Integer(*id), SqlValue::Text(format!("area {}", id))]);
        }
        rows
    }

    #[test]
    fn test_replace_rebuilds_table() {
        let conn = Connection::open_in_memory().unwrap();
        materialize(&conn, &AREAS, &areas(&[1, 2, 3]), TableMode::Replace, 2).unwrap();
        let written = materialize(&conn, &AREAS, &areas(&[7]), TableMode::Replace, 2).unwrap();

        assert_eq!(written, 1);
        assert_eq!(count_rows(&conn, "areas"), 1);
    }

    #[test]
    fn test_append_skips_existing_keys() {
        let conn = Connection::open_in_memory().unwrap();
        materialize(&conn, &AREAS, &areas(&[1, 2]), TableMode::Replace, 10).unwrap();
        let written = materialize(&conn, &AREAS, &areas(&[2, 3]), TableMode::Append, 10).unwrap();

        assert_eq!(written, 1);
        assert_eq!(count_rows(&conn, "areas"), 3);
    }

    #[test]
    fn test_fail_mode_on_existing_table() {
        let conn = Connection::open_in_memory().unwrap();
        materialize(&conn, &AREAS, &areas(&[1]), TableMode::Fail, 10).unwrap();
        let err = materialize(&conn, &AREAS, &areas(&[1]), TableMode::Fail, 10).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::TableExists(t)) if t == "areas"
        ));
    }

    #[test]
    fn test_missing_row_column_is_error() {
        let conn = Connection::open_in_memory().unwrap();
        let rows = RowSet::new(["areaId"]);
        assert!(materialize(&conn, &AREAS, &rows, TableMode::Replace, 10).is_err());
    }

    #[test]
    fn test_foreign_key_check_finds_orphans() {
        let conn = Connection::open_in_memory().unwrap();
        // Loads run with enforcement off and check once before commit
        conn.execute_batch("PRAGMA foreign_keys = OFF").unwrap();
        materialize(&conn, &AREAS, &areas(&[1]), TableMode::Replace, 10).unwrap();

        let mut locais = RowSet::new(["localId", "areaId", "morada", "desc_local", "coordenadas"]);
        locais.push(vec![
            SqlValue::Integer(101),
            SqlValue::Integer(9),
            SqlValue::Null,
            SqlValue::Null,
            SqlValue::Null,
        ]);
        materialize(&conn, &LOCAIS, &locais, TableMode::Replace, 10).unwrap();

        let err = verify_foreign_keys(&conn).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::ForeignKeyViolation { table, parent, .. }) if table == "locais" && parent == "areas"
        ));
    }
}
