use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::{debug, error};

use parley_types::api::{AddChatRequest, RangeQuery};
use parley_types::events::DirectoryEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Post a message and return the room's whole conversation.
pub async fn add_chat(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AddChatRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Received chat from {} for room {}", req.author_id, req.room_id);
    let conversation = state
        .call(move |d| d.add_chat(&req.author_id, &req.room_id, &req.content))
        .await?;

    match conversation.last() {
        Some(message) => {
            state
                .publish(DirectoryEvent::ChatPosted {
                    message: message.clone(),
                })
                .await;
        }
        None => error!("Conversation empty right after a successful post"),
    }

    Ok(Json(conversation))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<RangeQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state
        .call(move |d| d.get_conversation(&query.room_id, query.start_offset, query.end_offset))
        .await?;
    Ok(Json(messages))
}

pub async fn get_activities(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<RangeQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let activities = state
        .call(move |d| d.get_activities(&query.room_id, query.start_offset, query.end_offset))
        .await?;
    Ok(Json(activities))
}
