use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use parley_types::api::{AddUserQuery, UserQuery, UserRoomQuery};
use parley_types::events::DirectoryEvent;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_all_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.call(|d| d.get_all_users()).await?;
    Ok(Json(users))
}

pub async fn add_user(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AddUserQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received request to add user '{}'", query.full_name);
    let user = state.call(move |d| d.add_user(&query.full_name)).await?;

    state
        .publish(DirectoryEvent::UserAdded {
            user_id: user.id,
            full_name: user.full_name.clone(),
        })
        .await;

    Ok(Json(user))
}

pub async fn rooms_with_membership(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let rooms = state
        .call(move |d| d.get_rooms_with_membership(&query.user_id))
        .await?;
    Ok(Json(rooms))
}

pub async fn add_to_favourites(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<UserRoomQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let update = state
        .call(move |d| d.add_to_favourites(&query.user_id, &query.room_id))
        .await?;

    state
        .publish(DirectoryEvent::FavouriteAdded {
            user_id: update.user_id,
            room_id: update.room_id,
        })
        .await;

    Ok(Json(update.rooms))
}

pub async fn close_room(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<UserRoomQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let update = state
        .call(move |d| d.close_room(&query.user_id, &query.room_id))
        .await?;

    state
        .publish(DirectoryEvent::RoomClosed {
            user_id: update.user_id,
            room_id: update.room_id,
        })
        .await;

    Ok(Json(update.rooms))
}
