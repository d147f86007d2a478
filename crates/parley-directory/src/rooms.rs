use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};
use uuid::Uuid;

use parley_types::models::{Activity, ActivityKind, Room};

use crate::error::{DirectoryError, DirectoryResult};
use crate::ids::{parse_id, require_non_empty};
use crate::Directory;

/// Which of a room's two identity sets an operation targets.
#[derive(Debug, Clone, Copy)]
enum Roster {
    Members,
    Administrators,
}

impl Roster {
    fn set_mut(self, room: &mut Room) -> &mut BTreeSet<Uuid> {
        match self {
            Roster::Members => &mut room.members,
            Roster::Administrators => &mut room.administrators,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Roster::Members => "a member",
            Roster::Administrators => "an administrator",
        }
    }

    fn added(self) -> ActivityKind {
        match self {
            Roster::Members => ActivityKind::AddMember,
            Roster::Administrators => ActivityKind::AddAdmin,
        }
    }

    fn removed(self) -> ActivityKind {
        match self {
            Roster::Members => ActivityKind::RemoveMember,
            Roster::Administrators => ActivityKind::RemoveAdmin,
        }
    }
}

fn require_administrator(room: &Room, instigator_id: &Uuid) -> DirectoryResult<()> {
    if room.is_administrator(instigator_id) {
        return Ok(());
    }
    warn!(
        "Instigator {} is not an administrator of room {}",
        instigator_id, room.id
    );
    Err(DirectoryError::Unauthorized(format!(
        "{} is not an administrator of room {}",
        instigator_id, room.id
    )))
}

impl Directory {
    // -- Lifecycle --

    /// Create a room owned (and administered) by an existing user.
    ///
    /// `requested_id` lets the caller choose the room id; reusing an existing
    /// one is a conflict. Without it a fresh id is generated.
    pub fn add_room(
        &self,
        name: &str,
        owner_id: &str,
        requested_id: Option<&str>,
    ) -> DirectoryResult<Room> {
        let name = require_non_empty("name", name)?;
        let owner_id = parse_id("ownerId", owner_id)?;
        let room_id = match requested_id {
            Some(raw) => parse_id("id", raw)?,
            None => Uuid::new_v4(),
        };

        let mut state = self.write()?;
        if state.rooms.contains_key(&room_id) {
            warn!("Room {} already exists", room_id);
            return Err(DirectoryError::Conflict(format!(
                "room {} already exists",
                room_id
            )));
        }
        if let Err(e) = state.user_index(&owner_id) {
            warn!("Room owner {} does not exist", owner_id);
            return Err(e);
        }

        let room = Room::new(room_id, name, owner_id);
        self.store.save_room(&room).map_err(DirectoryError::Store)?;
        state.rooms.insert(room_id, room.clone());

        info!("Room '{}' ({}) created by {}", room.name, room.id, owner_id);
        Ok(room)
    }

    /// Mark a room invalid. Idempotent; the room stays readable.
    ///
    /// Returns the parsed room and instigator ids.
    pub fn deactivate_room(
        &self,
        room_id: &str,
        instigator_id: &str,
    ) -> DirectoryResult<(Uuid, Uuid)> {
        let room_id = parse_id("roomId", room_id)?;
        let instigator_id = parse_id("instigatorId", instigator_id)?;

        self.mutate_room(room_id, |room| {
            room.valid = false;
            Ok(())
        })?;

        info!("Room {} deactivated by {}", room_id, instigator_id);
        Ok((room_id, instigator_id))
    }

    // -- Reads --

    pub fn get_room(&self, room_id: &str) -> DirectoryResult<Room> {
        let room_id = parse_id("roomId", room_id)?;
        debug!("Fetching room {}", room_id);
        Ok(self.read()?.room(&room_id)?.clone())
    }

    /// Snapshot of every room's id and name.
    pub fn get_all_rooms(&self) -> DirectoryResult<BTreeMap<Uuid, String>> {
        Ok(self
            .read()?
            .rooms
            .values()
            .map(|room| (room.id, room.name.clone()))
            .collect())
    }

    pub fn get_members(&self, room_id: &str) -> DirectoryResult<Vec<Uuid>> {
        let room_id = parse_id("roomId", room_id)?;
        Ok(self.read()?.room(&room_id)?.members.iter().copied().collect())
    }

    pub fn get_administrators(&self, room_id: &str) -> DirectoryResult<Vec<Uuid>> {
        let room_id = parse_id("roomId", room_id)?;
        Ok(self
            .read()?
            .room(&room_id)?
            .administrators
            .iter()
            .copied()
            .collect())
    }

    /// A malformed id and an unknown room stay distinguishable:
    /// `InvalidArgument` and `NotFound` respectively.
    pub fn get_member_count(&self, room_id: &str) -> DirectoryResult<usize> {
        let room_id = parse_id("roomId", room_id)?;
        Ok(self.read()?.room(&room_id)?.members.len())
    }

    /// Pure membership check; never fails.
    pub fn is_valid_administrator(&self, room_id: &str, user_id: &str) -> bool {
        let (Ok(room_id), Ok(user_id)) = (parse_id("roomId", room_id), parse_id("userId", user_id))
        else {
            return false;
        };
        let Ok(state) = self.read() else {
            return false;
        };
        state
            .rooms
            .get(&room_id)
            .is_some_and(|room| room.is_administrator(&user_id))
    }

    // -- Membership --

    pub fn add_member(
        &self,
        room_id: &str,
        new_member_id: &str,
        instigator_id: &str,
    ) -> DirectoryResult<Room> {
        let room_id = parse_id("roomId", room_id)?;
        let member_id = parse_id("newMemberId", new_member_id)?;
        let instigator_id = parse_id("instigatorId", instigator_id)?;
        self.grant(Roster::Members, room_id, member_id, instigator_id)
    }

    pub fn remove_member(
        &self,
        room_id: &str,
        member_id: &str,
        instigator_id: &str,
    ) -> DirectoryResult<Room> {
        let room_id = parse_id("roomId", room_id)?;
        let member_id = parse_id("memberId", member_id)?;
        let instigator_id = parse_id("instigatorId", instigator_id)?;
        self.revoke(Roster::Members, room_id, member_id, instigator_id)
    }

    pub fn add_admin(
        &self,
        room_id: &str,
        new_admin_id: &str,
        instigator_id: &str,
    ) -> DirectoryResult<Room> {
        let room_id = parse_id("roomId", room_id)?;
        let admin_id = parse_id("newAdminId", new_admin_id)?;
        let instigator_id = parse_id("instigatorId", instigator_id)?;
        self.grant(Roster::Administrators, room_id, admin_id, instigator_id)
    }

    /// Removing the last administrator is allowed and leaves the room
    /// without anyone able to manage it.
    pub fn remove_admin(
        &self,
        room_id: &str,
        admin_id: &str,
        instigator_id: &str,
    ) -> DirectoryResult<Room> {
        let room_id = parse_id("roomId", room_id)?;
        let admin_id = parse_id("adminId", admin_id)?;
        let instigator_id = parse_id("instigatorId", instigator_id)?;
        self.revoke(Roster::Administrators, room_id, admin_id, instigator_id)
    }

    fn grant(
        &self,
        roster: Roster,
        room_id: Uuid,
        target_id: Uuid,
        instigator_id: Uuid,
    ) -> DirectoryResult<Room> {
        let room = self.mutate_room(room_id, |room| {
            require_administrator(room, &instigator_id)?;
            if !roster.set_mut(room).insert(target_id) {
                warn!(
                    "Room {} already has {} {}",
                    room_id,
                    roster.label(),
                    target_id
                );
                return Err(DirectoryError::Conflict(format!(
                    "{} is already {} of room {}",
                    target_id,
                    roster.label(),
                    room_id
                )));
            }
            room.activities
                .push(Activity::new(roster.added(), target_id, instigator_id));
            Ok(())
        })?;

        info!(
            "Added {} {} to room {} (by {})",
            roster.label(),
            target_id,
            room_id,
            instigator_id
        );
        Ok(room)
    }

    fn revoke(
        &self,
        roster: Roster,
        room_id: Uuid,
        target_id: Uuid,
        instigator_id: Uuid,
    ) -> DirectoryResult<Room> {
        let room = self.mutate_room(room_id, |room| {
            require_administrator(room, &instigator_id)?;
            if !roster.set_mut(room).remove(&target_id) {
                warn!(
                    "{} is not {} of room {}",
                    target_id,
                    roster.label(),
                    room_id
                );
                return Err(DirectoryError::NotFound(format!(
                    "{} is not {} of room {}",
                    target_id,
                    roster.label(),
                    room_id
                )));
            }
            room.activities
                .push(Activity::new(roster.removed(), target_id, instigator_id));
            Ok(())
        })?;

        info!(
            "Removed {} {} from room {} (by {})",
            roster.label(),
            target_id,
            room_id,
            instigator_id
        );
        Ok(room)
    }
}
