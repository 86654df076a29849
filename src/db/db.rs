use super::migrations::init_with_migrations;
use crate::error::Result;
use crate::libs::clock::{SharedClock, SystemClock};
use crate::libs::data_storage::DataStorage;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DB_FILE_NAME: &str = "orbita.db";

/// How long a writer waits for a competing immediate transaction.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open database connection plus the clock every write is stamped with.
pub struct Db {
    pub conn: Connection,
    pub clock: SharedClock,
}

impl Db {
    /// Opens the database in the application data directory.
    pub fn new() -> Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Self::open(db_file_path)
    }

    /// Opens (creating if needed) the database at `path` and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Db> {
        let mut conn = Self::connect(path)?;
        init_with_migrations(&mut conn)?;

        Ok(Db {
            conn,
            clock: Arc::new(SystemClock::default()),
        })
    }

    /// Opens the database at `path` without touching its schema.
    pub fn new_without_migrations(path: impl AsRef<Path>) -> Result<Connection> {
        Self::connect(path)
    }

    pub fn in_memory() -> Result<Db> {
        let mut conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        init_with_migrations(&mut conn)?;

        Ok(Db {
            conn,
            clock: Arc::new(SystemClock::default()),
        })
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    fn connect(path: impl AsRef<Path>) -> Result<Connection> {
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        Ok(conn)
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }
}
