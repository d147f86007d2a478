use std::collections::BTreeSet;

use tracing::{info, warn};
use uuid::Uuid;

use parley_types::models::User;

use crate::error::{DirectoryError, DirectoryResult};
use crate::ids::{parse_id, require_non_empty};
use crate::Directory;

/// Outcome of a favourite or closed-room change.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityUpdate {
    pub user_id: Uuid,
    pub room_id: Uuid,
    /// The user's full list after the change
    pub rooms: Vec<Uuid>,
}

impl Directory {
    pub fn add_user(&self, full_name: &str) -> DirectoryResult<User> {
        let full_name = require_non_empty("fullName", full_name)?;
        let user = User::new(full_name);

        let mut state = self.write()?;
        self.store.save_user(&user).map_err(DirectoryError::Store)?;
        state.users.push(user.clone());

        info!("User '{}' ({}) added", user.full_name, user.id);
        Ok(user)
    }

    /// Snapshot of all users in creation order.
    pub fn get_all_users(&self) -> DirectoryResult<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    /// Ids of every room listing `user_id` as a member, sorted.
    pub fn get_rooms_with_membership(&self, user_id: &str) -> DirectoryResult<Vec<Uuid>> {
        let user_id = parse_id("userId", user_id)?;
        let mut rooms: Vec<Uuid> = self
            .read()?
            .rooms
            .values()
            .filter(|room| room.is_member(&user_id))
            .map(|room| room.id)
            .collect();
        rooms.sort();
        Ok(rooms)
    }

    /// Add a room to the user's favourites.
    pub fn add_to_favourites(&self, user_id: &str, room_id: &str) -> DirectoryResult<AffinityUpdate> {
        self.update_affinity(user_id, room_id, "favourite", |user| &mut user.favourite_rooms)
    }

    /// Add a room to the user's closed rooms.
    pub fn close_room(&self, user_id: &str, room_id: &str) -> DirectoryResult<AffinityUpdate> {
        self.update_affinity(user_id, room_id, "closed", |user| &mut user.closed_rooms)
    }

    fn update_affinity<F>(
        &self,
        user_id: &str,
        room_id: &str,
        label: &str,
        list: F,
    ) -> DirectoryResult<AffinityUpdate>
    where
        F: Fn(&mut User) -> &mut BTreeSet<Uuid>,
    {
        let user_id = parse_id("userId", user_id)?;
        let room_id = parse_id("roomId", room_id)?;

        let mut state = self.write()?;
        let index = state.user_index(&user_id)?;
        state.room(&room_id)?;

        let mut updated = state.users[index].clone();
        if !list(&mut updated).insert(room_id) {
            warn!("Room {} is already {} for user {}", room_id, label, user_id);
            return Err(DirectoryError::Conflict(format!(
                "room {} is already {} for user {}",
                room_id, label, user_id
            )));
        }

        self.store.save_user(&updated).map_err(DirectoryError::Store)?;
        let rooms = list(&mut updated).iter().copied().collect();
        state.users[index] = updated;

        info!("Room {} marked {} for user {}", room_id, label, user_id);
        Ok(AffinityUpdate {
            user_id,
            room_id,
            rooms,
        })
    }
}
