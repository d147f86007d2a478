use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use parley_types::models::{Activity, ChatMessage};

use crate::error::{DirectoryError, DirectoryResult};
use crate::ids::parse_id;
use crate::Directory;

/// Clip the half-open window `[start, end)` to `items`. Out of range yields
/// an empty slice, never an error.
fn window<T: Clone>(items: &[T], start: usize, end: usize) -> Vec<T> {
    let end = end.min(items.len());
    let start = start.min(end);
    items[start..end].to_vec()
}

fn check_offsets(start: usize, end: usize) -> DirectoryResult<()> {
    if start > end {
        return Err(DirectoryError::InvalidArgument(format!(
            "start offset {} cannot be greater than end offset {}",
            start, end
        )));
    }
    Ok(())
}

impl Directory {
    /// Append a message to a room's conversation and return the whole
    /// conversation. The author must currently be a member or administrator.
    pub fn add_chat(
        &self,
        author_id: &str,
        room_id: &str,
        content: &str,
    ) -> DirectoryResult<Vec<ChatMessage>> {
        if content.trim().is_empty() {
            return Err(DirectoryError::InvalidArgument(
                "chat message content cannot be empty".into(),
            ));
        }
        let author_id = parse_id("authorId", author_id)?;
        let room_id = parse_id("roomId", room_id)?;

        let room = self.mutate_room(room_id, |room| {
            if !room.can_post(&author_id) {
                warn!(
                    "Author {} is not a member or administrator of room {}",
                    author_id, room_id
                );
                return Err(DirectoryError::Unauthorized(format!(
                    "{} is not a member or administrator of room {}",
                    author_id, room_id
                )));
            }
            room.conversation.push(ChatMessage {
                id: Uuid::new_v4(),
                author_id,
                room_id,
                timestamp: Utc::now(),
                content: content.to_string(),
            });
            Ok(())
        })?;

        info!("Chat message from {} added to room {}", author_id, room_id);
        Ok(room.conversation)
    }

    pub fn get_conversation(
        &self,
        room_id: &str,
        start_offset: usize,
        end_offset: usize,
    ) -> DirectoryResult<Vec<ChatMessage>> {
        let room_id = parse_id("roomId", room_id)?;
        check_offsets(start_offset, end_offset)?;

        debug!(
            "Conversation of room {} [{}, {})",
            room_id, start_offset, end_offset
        );
        let state = self.read()?;
        Ok(window(&state.room(&room_id)?.conversation, start_offset, end_offset))
    }

    /// The room's audit trail, windowed like `get_conversation`.
    pub fn get_activities(
        &self,
        room_id: &str,
        start_offset: usize,
        end_offset: usize,
    ) -> DirectoryResult<Vec<Activity>> {
        let room_id = parse_id("roomId", room_id)?;
        check_offsets(start_offset, end_offset)?;

        let state = self.read()?;
        Ok(window(&state.room(&room_id)?.activities, start_offset, end_offset))
    }
}
