// 🗄️ SQLite Entry Store
// Same contract as the CSV file, backed by one table in WAL mode

use crate::entry::GuessRecord;
use crate::error::{Result, TombolaError};
use crate::store::{lock, EntryStore};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub struct SqliteEntryStore {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteEntryStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| TombolaError::store(format!("opening {}", path.display()), e))?;
        Self::with_connection(conn, path.display().to_string())
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| TombolaError::store("opening in-memory database", e))?;
        Self::with_connection(conn, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, location: String) -> Result<Self> {
        setup_database(&conn)
            .map_err(|e| TombolaError::store(format!("preparing {}", location), e))?;
        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Autoincrement id keeps insertion order; no other identity is implied
    conn.execute(
        "CREATE TABLE IF NOT EXISTS guesses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            length TEXT NOT NULL,
            weight TEXT NOT NULL,
            gender TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl EntryStore for SqliteEntryStore {
    fn append(&self, record: &GuessRecord) -> Result<()> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO guesses (name, date_of_birth, length, weight, gender)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.name,
                record.date_of_birth,
                record.length,
                record.weight,
                record.gender,
            ],
        )
        .map_err(|e| TombolaError::store(format!("inserting into {}", self.location), e))?;

        Ok(())
    }

    fn read_all(&self) -> Result<Vec<GuessRecord>> {
        let conn = lock(&self.conn);
        let read_err = |e: rusqlite::Error| TombolaError::store(format!("reading {}", self.location), e);

        let mut stmt = conn
            .prepare(
                "SELECT name, date_of_birth, length, weight, gender
                 FROM guesses ORDER BY id",
            )
            .map_err(read_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(GuessRecord {
                    name: row.get(0)?,
                    date_of_birth: row.get(1)?,
                    length: row.get(2)?,
                    weight: row.get(3)?,
                    gender: row.get(4)?,
                })
            })
            .map_err(read_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(read_err)?);
        }

        Ok(records)
    }

    fn clear(&self) -> Result<()> {
        let conn = lock(&self.conn);
        let removed = conn
            .execute("DELETE FROM guesses", [])
            .map_err(|e| TombolaError::store(format!("clearing {}", self.location), e))?;

        info!(removed, location = %self.location, "guesses table cleared");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_append_and_read_in_order() {
        let store = SqliteEntryStore::open_in_memory().unwrap();
        let first = GuessRecord::new("Alice", "2024-01-01", "50.0", "3000", "F");
        let second = GuessRecord::new("Bob", "2024-01-02", "51", "3050", "M");

        store.append(&first).unwrap();
        store.append(&second).unwrap();

        assert_eq!(store.read_all().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_sqlite_clear_twice() {
        let store = SqliteEntryStore::open_in_memory().unwrap();
        store
            .append(&GuessRecord::new("Alice", "2024-01-01", "50", "3000", "F"))
            .unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_guesses_table_holds_only_entry_columns() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let mut stmt = conn.prepare("PRAGMA table_info(guesses)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(
            columns,
            vec!["id", "name", "date_of_birth", "length", "weight", "gender"]
        );
    }

    #[test]
    fn test_setup_database_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();
    }
}
