//! SQLite schema DDL for the catalog tables.

use rusqlite::Connection;

use crate::errors::CatalogResult;

/// Core DDL statements: 2 CREATE TABLE + 2 CREATE INDEX.
///
/// Executed with `CREATE … IF NOT EXISTS` so they are safe to replay on an
/// already-initialised database.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // ── tables (2) ──────────────────────────────────────────────────────
    "CREATE TABLE IF NOT EXISTS company (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS computer (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        introduced DATE,
        discontinued DATE,
        company_id INTEGER REFERENCES company(id)
    );",
    // ── indexes (2) ─────────────────────────────────────────────────────
    "CREATE INDEX IF NOT EXISTS idx_computer_name ON computer(name);",
    "CREATE INDEX IF NOT EXISTS idx_computer_company ON computer(company_id);",
];

/// Apply every statement in [`SCHEMA_STATEMENTS`].
pub fn create_schema(conn: &Connection) -> CatalogResult<()> {
    for stmt in SCHEMA_STATEMENTS {
        conn.execute_batch(stmt)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_statement_counts() {
        assert_eq!(SCHEMA_STATEMENTS.len(), 4);
    }

    #[test]
    fn create_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        create_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master \
                 WHERE type = 'table' AND name IN ('company', 'computer');",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn computer_id_is_assigned_when_omitted() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn.execute("INSERT INTO computer(id, name) VALUES (41, 'CM-5');", [])
            .unwrap();
        conn.execute("INSERT INTO computer(name) VALUES ('CM-200');", [])
            .unwrap();
        assert_eq!(conn.last_insert_rowid(), 42);
    }
}
