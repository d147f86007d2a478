use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::{error, info};
use uuid::Uuid;

use parley_types::api::{
    AddAdminQuery, AddMemberQuery, AddRoomRequest, DeactivateRoomQuery, RemoveAdminQuery,
    RemoveMemberQuery, RoomQuery, RoomSummary,
};
use parley_types::events::DirectoryEvent;
use parley_types::models::Room;

use crate::error::ApiError;
use crate::state::AppState;

type ApiQuery<T> = WithRejection<Query<T>, ApiError>;

pub async fn add_room(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AddRoomRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received request to add room '{}'", req.name);
    let room = state
        .call(move |d| d.add_room(&req.name, &req.owner_id, req.id.as_deref()))
        .await?;

    state
        .publish(DirectoryEvent::RoomCreated {
            room_id: room.id,
            name: room.name.clone(),
            owner_id: room.owner_id,
        })
        .await;

    Ok(Json(room))
}

pub async fn get_room(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<RoomQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state.call(move |d| d.get_room(&query.room_id)).await?;
    Ok(Json(room))
}

pub async fn get_all_rooms(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rooms = state.call(|d| d.get_all_rooms()).await?;
    let summaries: Vec<RoomSummary> = rooms
        .into_iter()
        .map(|(id, name)| RoomSummary { id, name })
        .collect();
    Ok(Json(summaries))
}

pub async fn deactivate_room(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<DeactivateRoomQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received request to deactivate room {}", query.room_id);
    let (room_id, instigator_id) = state
        .call(move |d| d.deactivate_room(&query.room_id, &query.instigator_id))
        .await?;

    state
        .publish(DirectoryEvent::RoomDeactivated {
            room_id,
            instigator_id,
        })
        .await;

    Ok(format!("Deactivated room with ID: {}", room_id))
}

pub async fn get_members(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<RoomQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let members = state.call(move |d| d.get_members(&query.room_id)).await?;
    Ok(Json(members))
}

pub async fn get_administrators(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<RoomQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let admins = state
        .call(move |d| d.get_administrators(&query.room_id))
        .await?;
    Ok(Json(admins))
}

pub async fn get_member_count(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<RoomQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .call(move |d| d.get_member_count(&query.room_id))
        .await?;
    Ok(Json(count))
}

// -- Membership --

/// Publish a roster change from the audit entry the directory just recorded.
async fn publish_roster_change<F>(state: &AppState, room: &Room, event: F)
where
    F: FnOnce(Uuid, Uuid, Uuid) -> DirectoryEvent,
{
    match room.activities.last() {
        Some(activity) => {
            state
                .publish(event(room.id, activity.third_party_id, activity.instigator_id))
                .await;
        }
        None => error!("Room {} has no activity right after a roster change", room.id),
    }
}

pub async fn add_member(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<AddMemberQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Received request from {} to add member {} to room {}",
        query.instigator_id, query.new_member_id, query.room_id
    );
    let room = state
        .call(move |d| d.add_member(&query.room_id, &query.new_member_id, &query.instigator_id))
        .await?;

    publish_roster_change(&state, &room, |room_id, user_id, instigator_id| {
        DirectoryEvent::MemberAdded {
            room_id,
            user_id,
            instigator_id,
        }
    })
    .await;

    Ok(Json(room))
}

pub async fn remove_member(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<RemoveMemberQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Received request from {} to remove member {} from room {}",
        query.instigator_id, query.member_id, query.room_id
    );
    let room = state
        .call(move |d| d.remove_member(&query.room_id, &query.member_id, &query.instigator_id))
        .await?;

    publish_roster_change(&state, &room, |room_id, user_id, instigator_id| {
        DirectoryEvent::MemberRemoved {
            room_id,
            user_id,
            instigator_id,
        }
    })
    .await;

    Ok(match room.activities.last() {
        Some(activity) => format!(
            "Successfully removed member with ID: {} from room with ID: {}",
            activity.third_party_id, room.id
        ),
        None => format!("Successfully removed member from room with ID: {}", room.id),
    })
}

pub async fn add_admin(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<AddAdminQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Received request from {} to add admin {} to room {}",
        query.instigator_id, query.new_admin_id, query.room_id
    );
    let room = state
        .call(move |d| d.add_admin(&query.room_id, &query.new_admin_id, &query.instigator_id))
        .await?;

    publish_roster_change(&state, &room, |room_id, user_id, instigator_id| {
        DirectoryEvent::AdminAdded {
            room_id,
            user_id,
            instigator_id,
        }
    })
    .await;

    Ok(Json(room))
}

pub async fn remove_admin(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<RemoveAdminQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "Received request from {} to remove admin {} from room {}",
        query.instigator_id, query.admin_id, query.room_id
    );
    let room = state
        .call(move |d| d.remove_admin(&query.room_id, &query.admin_id, &query.instigator_id))
        .await?;

    publish_roster_change(&state, &room, |room_id, user_id, instigator_id| {
        DirectoryEvent::AdminRemoved {
            room_id,
            user_id,
            instigator_id,
        }
    })
    .await;

    Ok(match room.activities.last() {
        Some(activity) => format!(
            "Successfully removed admin with ID: {} from room with ID: {}",
            activity.third_party_id, room.id
        ),
        None => format!("Successfully removed admin from room with ID: {}", room.id),
    })
}
