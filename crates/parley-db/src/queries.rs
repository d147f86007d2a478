use crate::models::DocumentRow;
use crate::Database;
use anyhow::{Context, Result};
use parley_types::models::{Room, User};
use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;

const ROOMS: &str = "rooms";
const USERS: &str = "users";

impl Database {
    // -- Rooms --

    /// Insert or replace the stored document for `room`.
    pub fn upsert_room(&self, room: &Room) -> Result<()> {
        let body = encode(room)?;
        self.with_conn(|conn| upsert_document(conn, ROOMS, &room.id.to_string(), &body))
    }

    pub fn all_rooms(&self) -> Result<Vec<Room>> {
        let rows = self.with_conn(|conn| query_documents(conn, ROOMS))?;
        rows.iter().map(decode).collect()
    }

    // -- Users --

    pub fn upsert_user(&self, user: &User) -> Result<()> {
        let body = encode(user)?;
        self.with_conn(|conn| upsert_document(conn, USERS, &user.id.to_string(), &body))
    }

    pub fn all_users(&self) -> Result<Vec<User>> {
        let rows = self.with_conn(|conn| query_documents(conn, USERS))?;
        rows.iter().map(decode).collect()
    }
}

fn encode<T: Serialize>(entity: &T) -> Result<String> {
    serde_json::to_string(entity).context("failed to encode document")
}

fn decode<T: DeserializeOwned>(row: &DocumentRow) -> Result<T> {
    serde_json::from_str(&row.body)
        .with_context(|| format!("corrupt document '{}' (updated {})", row.id, row.updated_at))
}

// An upsert keeps the original rowid, so find-all preserves first-insert order.
fn upsert_document(conn: &Connection, table: &str, id: &str, body: &str) -> Result<()> {
    let sql = format!(
        "INSERT INTO {table} (id, body) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET body = excluded.body, updated_at = datetime('now')"
    );
    conn.execute(&sql, (id, body))?;
    Ok(())
}

fn query_documents(conn: &Connection, table: &str) -> Result<Vec<DocumentRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, body, updated_at FROM {table} ORDER BY rowid"
    ))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(DocumentRow {
                id: row.get(0)?,
                body: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
