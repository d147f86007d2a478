//! The directory service: sole owner of room and user state.
//!
//! All state lives behind one `RwLock`. Every check-then-mutate runs under the
//! write guard, and the store write happens before the change is committed to
//! memory, so a failed save leaves the directory exactly as it was.

pub mod error;
pub mod ids;

mod chat;
mod rooms;
mod users;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;
use uuid::Uuid;

use parley_db::Store;
use parley_types::models::{Room, User};

pub use error::{DirectoryError, DirectoryResult};
pub use users::AffinityUpdate;

pub struct Directory {
    store: Arc<dyn Store>,
    state: RwLock<DirectoryState>,
}

#[derive(Default)]
struct DirectoryState {
    rooms: HashMap<Uuid, Room>,
    /// Insertion order is preserved for `get_all_users`.
    users: Vec<User>,
}

impl DirectoryState {
    fn load(store: &dyn Store) -> DirectoryResult<Self> {
        let rooms = store.find_all_rooms().map_err(DirectoryError::Store)?;
        info!("Loaded {} room(s) from store", rooms.len());

        let users = store.find_all_users().map_err(DirectoryError::Store)?;
        info!("Loaded {} user(s) from store", users.len());

        Ok(Self {
            rooms: rooms.into_iter().map(|room| (room.id, room)).collect(),
            users,
        })
    }

    fn room(&self, room_id: &Uuid) -> DirectoryResult<&Room> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| DirectoryError::NotFound(format!("room {} does not exist", room_id)))
    }

    fn user_index(&self, user_id: &Uuid) -> DirectoryResult<usize> {
        self.users
            .iter()
            .position(|user| user.id == *user_id)
            .ok_or_else(|| DirectoryError::NotFound(format!("user {} does not exist", user_id)))
    }
}

impl Directory {
    /// Build a directory from everything currently in `store`.
    pub fn load(store: Arc<dyn Store>) -> DirectoryResult<Self> {
        let state = DirectoryState::load(store.as_ref())?;
        Ok(Self {
            store,
            state: RwLock::new(state),
        })
    }

    /// Replace all in-memory state with a fresh read of the store.
    ///
    /// Holds the write lock for the whole swap so no reader sees a partial
    /// state. If the store read fails the previous state is kept.
    pub fn reload(&self) -> DirectoryResult<()> {
        let mut state = self.write()?;
        *state = DirectoryState::load(self.store.as_ref())?;
        info!("Directory reloaded from store");
        Ok(())
    }

    fn read(&self) -> DirectoryResult<RwLockReadGuard<'_, DirectoryState>> {
        self.state
            .read()
            .map_err(|e| DirectoryError::Store(anyhow::anyhow!("directory lock poisoned: {}", e)))
    }

    fn write(&self) -> DirectoryResult<RwLockWriteGuard<'_, DirectoryState>> {
        self.state
            .write()
            .map_err(|e| DirectoryError::Store(anyhow::anyhow!("directory lock poisoned: {}", e)))
    }

    /// Apply `f` to a copy of the room, persist the copy, then commit it.
    fn mutate_room<F>(&self, room_id: Uuid, f: F) -> DirectoryResult<Room>
    where
        F: FnOnce(&mut Room) -> DirectoryResult<()>,
    {
        let mut state = self.write()?;
        let mut updated = state.room(&room_id)?.clone();
        f(&mut updated)?;

        self.store.save_room(&updated).map_err(DirectoryError::Store)?;
        state.rooms.insert(room_id, updated.clone());
        Ok(updated)
    }
}
