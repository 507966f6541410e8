use crate::db::migration_runner::MigrationRunner;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Result};
use std::sync::Mutex;

pub const IN_MEMORY: &str = ":memory:";

/// `casefold(text)`: Unicode lowercase, NULL passes through. SQLite's own
/// LIKE only folds ASCII.
fn register_casefold(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = if db_path == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(db_path)?
        };

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        register_casefold(&conn)?;

        if db_path != IN_MEMORY {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        let runner = MigrationRunner::new();

        log::info!("=== Starting catalog schema check ===");

        let current_version = runner.get_current_version(&conn)?;
        log::info!("Current schema version: {:?}", current_version);

        let applied = runner.run_pending_migrations(&conn, db_path)?;
        if applied > 0 {
            log::info!("Applied {} migrations", applied);
        } else {
            log::info!("Catalog schema is up to date");
        }

        runner.verify_migrations(&conn)?;

        if let Some(version) = runner.get_current_version(&conn)? {
            log::info!("Final schema version: {}", version);
        }

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    /// Fresh, fully migrated database that lives only as long as the handle.
    pub fn open_in_memory() -> Result<Self> {
        Self::new(IN_MEMORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database_has_catalog_tables() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn.lock().unwrap();

        for table in ["sets", "cards", "settings", "schema_migrations"] {
            let count: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_file_database_reopens_without_reapplying() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new(path).unwrap();
            let conn = db.conn.lock().unwrap();
            conn.execute("INSERT INTO sets (set_name) VALUES ('Genetic Apex')", [])
                .unwrap();
        }

        let db = Database::new(path).unwrap();
        let conn = db.conn.lock().unwrap();
        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM sets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
