use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named chat space. Rooms are never deleted; deactivation only clears `valid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub members: BTreeSet<Uuid>,
    pub administrators: BTreeSet<Uuid>,
    pub conversation: Vec<ChatMessage>,
    pub activities: Vec<Activity>,
    pub valid: bool,
}

impl Room {
    /// Creates a valid room whose owner is its first administrator.
    pub fn new(id: Uuid, name: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id,
            members: BTreeSet::new(),
            administrators: BTreeSet::from([owner_id]),
            conversation: Vec::new(),
            activities: Vec::new(),
            valid: true,
        }
    }

    pub fn is_administrator(&self, user_id: &Uuid) -> bool {
        self.administrators.contains(user_id)
    }

    pub fn is_member(&self, user_id: &Uuid) -> bool {
        self.members.contains(user_id)
    }

    /// Members and administrators may both post to the conversation.
    pub fn can_post(&self, user_id: &Uuid) -> bool {
        self.is_member(user_id) || self.is_administrator(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub is_active: bool,
    pub is_valid: bool,
    pub favourite_rooms: BTreeSet<Uuid>,
    pub closed_rooms: BTreeSet<Uuid>,
}

impl User {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            is_active: true,
            is_valid: true,
            favourite_rooms: BTreeSet::new(),
            closed_rooms: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub author_id: Uuid,
    pub room_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    AddMember,
    RemoveMember,
    AddAdmin,
    RemoveAdmin,
}

/// Audit record of a membership or administrator change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub kind: ActivityKind,
    /// The user acted upon.
    pub third_party_id: Uuid,
    /// The administrator who acted.
    pub instigator_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    pub fn new(kind: ActivityKind, third_party_id: Uuid, instigator_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            third_party_id,
            instigator_id,
            timestamp: Utc::now(),
        }
    }
}
