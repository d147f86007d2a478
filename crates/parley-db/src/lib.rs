pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use parley_types::models::{Room, User};

/// Persistence behind the directory: save-one and find-all per collection.
///
/// Implementations are blocking; async callers should go through
/// `spawn_blocking`.
pub trait Store: Send + Sync {
    fn save_room(&self, room: &Room) -> Result<()>;

    fn save_user(&self, user: &User) -> Result<()>;

    /// All rooms, in the order they were first saved.
    fn find_all_rooms(&self) -> Result<Vec<Room>>;

    /// All users, in the order they were first saved.
    fn find_all_users(&self) -> Result<Vec<User>>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

impl Store for Database {
    fn save_room(&self, room: &Room) -> Result<()> {
        self.upsert_room(room)
    }

    fn save_user(&self, user: &User) -> Result<()> {
        self.upsert_user(user)
    }

    fn find_all_rooms(&self) -> Result<Vec<Room>> {
        self.all_rooms()
    }

    fn find_all_users(&self) -> Result<Vec<User>> {
        self.all_users()
    }
}
