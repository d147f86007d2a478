use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ChatMessage;

/// Notifications pushed to every live socket after a directory mutation succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all_fields = "camelCase")]
pub enum DirectoryEvent {
    /// A room was created
    RoomCreated { room_id: Uuid, name: String, owner_id: Uuid },

    /// A room was deactivated; it stays readable
    RoomDeactivated { room_id: Uuid, instigator_id: Uuid },

    /// A user was registered
    UserAdded { user_id: Uuid, full_name: String },

    MemberAdded { room_id: Uuid, user_id: Uuid, instigator_id: Uuid },

    MemberRemoved { room_id: Uuid, user_id: Uuid, instigator_id: Uuid },

    AdminAdded { room_id: Uuid, user_id: Uuid, instigator_id: Uuid },

    AdminRemoved { room_id: Uuid, user_id: Uuid, instigator_id: Uuid },

    /// A chat message was appended to a room's conversation
    ChatPosted { message: ChatMessage },

    /// A user marked a room as a favourite
    FavouriteAdded { user_id: Uuid, room_id: Uuid },

    /// A user closed a room
    RoomClosed { user_id: Uuid, room_id: Uuid },
}
