use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Identifiers arrive as raw strings so that a malformed id is reported by the
// directory as an invalid argument rather than rejected by the extractor.

// -- Rooms --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddRoomRequest {
    pub name: String,
    pub owner_id: String,
    /// Optional caller-chosen id; a collision is reported as a conflict.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuery {
    pub room_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateRoomQuery {
    pub room_id: String,
    pub instigator_id: String,
}

/// Half-open `[startOffset, endOffset)` window over a room's conversation or activity log.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub room_id: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

// -- Membership --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberQuery {
    pub room_id: String,
    pub new_member_id: String,
    pub instigator_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberQuery {
    pub room_id: String,
    pub member_id: String,
    pub instigator_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAdminQuery {
    pub room_id: String,
    pub new_admin_id: String,
    pub instigator_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAdminQuery {
    pub room_id: String,
    pub admin_id: String,
    pub instigator_id: String,
}

// -- Chat --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddChatRequest {
    pub author_id: String,
    pub room_id: String,
    pub content: String,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserQuery {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoomQuery {
    pub user_id: String,
    pub room_id: String,
}

// -- Errors --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
