use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Result, params};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub struct Database {
    connection: Connection,
}

impl Database {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Database> {
        Self::init(Connection::open(db_path)?)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Database> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Database> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Database { connection: conn })
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.connection
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.connection.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_key_is_none() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get("notes").unwrap(), None);
    }

    #[test]
    fn set_replaces_previous_value() {
        let db = Database::in_memory().unwrap();
        db.set("notes", "[1]").unwrap();
        db.set("notes", "[2]").unwrap();
        assert_eq!(db.get("notes").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn values_survive_reopen() {
        let temp = NamedTempFile::new().unwrap();
        Database::new(temp.path()).unwrap().set("notes", "[]").unwrap();

        let db = Database::new(temp.path()).unwrap();
        assert_eq!(db.get("notes").unwrap().as_deref(), Some("[]"));
    }
}
