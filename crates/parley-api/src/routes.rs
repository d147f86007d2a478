use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;
use crate::{chat, rooms, system, users};

/// All directory routes. The socket route and middleware are layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/heartbeat", get(system::heartbeat))
        .route("/reload", get(system::reload))
        // Rooms
        .route("/addRoom", post(rooms::add_room))
        .route("/room", get(rooms::get_room))
        .route("/rooms", get(rooms::get_all_rooms))
        .route("/deactivateRoom", put(rooms::deactivate_room))
        .route("/members", get(rooms::get_members))
        .route("/admins", get(rooms::get_administrators))
        .route("/memberCount", get(rooms::get_member_count))
        .route("/addMember", post(rooms::add_member))
        .route("/removeMember", delete(rooms::remove_member))
        .route("/addAdmin", post(rooms::add_admin))
        .route("/removeAdmin", delete(rooms::remove_admin))
        // Chat
        .route("/addChat", post(chat::add_chat))
        .route("/conversation", get(chat::get_conversation))
        .route("/activities", get(chat::get_activities))
        // Users
        .route("/users", get(users::get_all_users))
        .route("/addUser", post(users::add_user))
        .route("/roomsWithMembership", get(users::rooms_with_membership))
        .route("/addToFavourites", put(users::add_to_favourites))
        .route("/closeRoom", put(users::close_room))
        .with_state(state)
}
