//! Drives the router in-process against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use parley_api::{AppStateInner, router};
use parley_db::Database;
use parley_directory::Directory;
use parley_gateway::{Broadcaster, Session};

struct Harness {
    app: Router,
    broadcaster: Broadcaster,
}

impl Harness {
    fn new() -> Self {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let directory = Arc::new(Directory::load(db).unwrap());
        let broadcaster = Broadcaster::new();
        let app = router(AppStateInner::new(directory, broadcaster.clone()));
        Self { app, broadcaster }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    async fn add_user(&self, name: &str) -> String {
        let (status, user) = self
            .send(Method::POST, &format!("/addUser?fullName={}", name), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        user["id"].as_str().unwrap().to_string()
    }

    async fn add_room(&self, name: &str, owner: &str) -> String {
        let (status, room) = self
            .send(
                Method::POST,
                "/addRoom",
                Some(serde_json::json!({ "name": name, "ownerId": owner })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        room["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn heartbeat_answers() {
    let h = Harness::new();
    let (status, body) = h.send(Method::GET, "/heartbeat", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("I am here!".into()));
}

#[tokio::test]
async fn room_lifecycle_over_http() {
    let h = Harness::new();
    let owner = h.add_user("Owner").await;
    let member = h.add_user("Member").await;
    let room = h.add_room("general", &owner).await;

    let (status, admins) = h.send(Method::GET, &format!("/admins?roomId={}", room), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admins, serde_json::json!([owner]));

    let uri = format!(
        "/addMember?roomId={}&newMemberId={}&instigatorId={}",
        room, member, owner
    );
    let (status, body) = h.send(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"], serde_json::json!([member]));
    assert_eq!(body["activities"][0]["kind"], "ADD_MEMBER");

    let (status, body) = h.send(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already"));

    let (_, count) = h
        .send(Method::GET, &format!("/memberCount?roomId={}", room), None)
        .await;
    assert_eq!(count, 1);

    let uri = format!(
        "/removeMember?roomId={}&memberId={}&instigatorId={}",
        room, member, member
    );
    let (status, _) = h.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(
            Method::PUT,
            &format!("/deactivateRoom?roomId={}&instigatorId={}", room, owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = h.send(Method::GET, &format!("/room?roomId={}", room), None).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["name"], "general");

    let (_, rooms) = h.send(Method::GET, "/rooms", None).await;
    assert_eq!(rooms, serde_json::json!([{ "id": room, "name": "general" }]));
}

#[tokio::test]
async fn errors_map_to_statuses() {
    let h = Harness::new();
    let owner = h.add_user("Owner").await;
    let room = h.add_room("general", &owner).await;

    let (status, body) = h.send(Method::GET, "/memberCount?roomId=not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let missing = uuid::Uuid::new_v4();
    let (status, _) = h
        .send(Method::GET, &format!("/memberCount?roomId={}", missing), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .send(
            Method::GET,
            &format!("/conversation?roomId={}&startOffset=5&endOffset=1", room),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing query parameter is rejected with the same error body shape.
    let (status, body) = h.send(Method::GET, "/room", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = h.send(Method::POST, "/addUser?fullName=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .send(
            Method::POST,
            "/addRoom",
            Some(serde_json::json!({ "name": "dup", "ownerId": owner, "id": room })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn chat_is_members_only_and_clipped() {
    let h = Harness::new();
    let owner = h.add_user("Owner").await;
    let room = h.add_room("general", &owner).await;
    let stranger = uuid::Uuid::new_v4().to_string();

    for content in ["one", "two", "three"] {
        let (status, _) = h
            .send(
                Method::POST,
                "/addChat",
                Some(serde_json::json!({ "authorId": owner, "roomId": room, "content": content })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = h
        .send(
            Method::POST,
            "/addChat",
            Some(serde_json::json!({ "authorId": stranger, "roomId": room, "content": "hi" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, tail) = h
        .send(
            Method::GET,
            &format!("/conversation?roomId={}&startOffset=1&endOffset=100", room),
            None,
        )
        .await;
    let contents: Vec<_> = tail
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["two", "three"]);
}

#[tokio::test]
async fn favourites_and_membership_lookup() {
    let h = Harness::new();
    let owner = h.add_user("Owner").await;
    let member = h.add_user("Member").await;
    let room = h.add_room("general", &owner).await;

    h.send(
        Method::POST,
        &format!(
            "/addMember?roomId={}&newMemberId={}&instigatorId={}",
            room, member, owner
        ),
        None,
    )
    .await;

    let (_, rooms) = h
        .send(Method::GET, &format!("/roomsWithMembership?userId={}", member), None)
        .await;
    assert_eq!(rooms, serde_json::json!([room]));

    let uri = format!("/addToFavourites?userId={}&roomId={}", member, room);
    let (status, favourites) = h.send(Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(favourites, serde_json::json!([room]));
    let (status, _) = h.send(Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, users) = h.send(Method::GET, "/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert_eq!(users[1]["favouriteRooms"], serde_json::json!([room]));
}

#[tokio::test]
async fn mutations_are_broadcast() {
    let h = Harness::new();
    let (session, mut rx) = Session::new();
    h.broadcaster.connect(session).await;

    let owner = h.add_user("Owner").await;
    let event: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "UserAdded");
    assert_eq!(event["data"]["userId"], owner.as_str());

    let room = h.add_room("general", &owner).await;
    let event: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "RoomCreated");
    assert_eq!(event["data"]["roomId"], room.as_str());

    let (status, _) = h
        .send(
            Method::PUT,
            &format!("/addToFavourites?userId={}&roomId={}", owner, room),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let event: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "FavouriteAdded");
    assert_eq!(event["data"]["userId"], owner.as_str());
    assert_eq!(event["data"]["roomId"], room.as_str());

    let (status, _) = h
        .send(
            Method::PUT,
            &format!("/closeRoom?userId={}&roomId={}", owner, room),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let event: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "RoomClosed");
    assert_eq!(event["data"]["userId"], owner.as_str());
    assert_eq!(event["data"]["roomId"], room.as_str());

    let member = uuid::Uuid::new_v4().to_string();
    h.send(
        Method::POST,
        &format!(
            "/addMember?roomId={}&newMemberId={}&instigatorId={}",
            room, member, owner
        ),
        None,
    )
    .await;
    let event: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "MemberAdded");
    assert_eq!(event["data"]["userId"], member.as_str());
    assert_eq!(event["data"]["instigatorId"], owner.as_str());

    // Reads and rejected mutations publish nothing.
    h.send(Method::GET, "/rooms", None).await;
    h.send(Method::POST, "/addUser?fullName=", None).await;
    h.send(
        Method::PUT,
        &format!("/closeRoom?userId={}&roomId={}", owner, room),
        None,
    )
    .await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn admin_roster_over_http() {
    let h = Harness::new();
    let owner = h.add_user("Owner").await;
    let room = h.add_room("general", &owner).await;
    let deputy = h.add_user("Deputy").await;
    let member = h.add_user("Member").await;

    let add_admin = format!(
        "/addAdmin?roomId={}&newAdminId={}&instigatorId={}",
        room, deputy, owner
    );
    let (status, body) = h.send(Method::POST, &add_admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activities"][0]["kind"], "ADD_ADMIN");

    let (status, body) = h.send(Method::POST, &add_admin, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("already an administrator"));

    h.send(
        Method::POST,
        &format!(
            "/addMember?roomId={}&newMemberId={}&instigatorId={}",
            room, member, deputy
        ),
        None,
    )
    .await;
    let (_, members) = h.send(Method::GET, &format!("/members?roomId={}", room), None).await;
    assert_eq!(members, serde_json::json!([member]));

    // A plain member may not change the admin roster.
    let (status, _) = h
        .send(
            Method::POST,
            &format!(
                "/addAdmin?roomId={}&newAdminId={}&instigatorId={}",
                room, member, member
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h
        .send(
            Method::DELETE,
            &format!(
                "/removeAdmin?roomId={}&adminId={}&instigatorId={}",
                room, owner, member
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(
            Method::DELETE,
            &format!(
                "/removeAdmin?roomId={}&adminId={}&instigatorId={}",
                room, member, owner
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .send(
            Method::DELETE,
            &format!(
                "/removeAdmin?roomId={}&adminId={}&instigatorId={}",
                room, deputy, owner
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, admins) = h.send(Method::GET, &format!("/admins?roomId={}", room), None).await;
    assert_eq!(admins, serde_json::json!([owner]));

    let (status, activities) = h
        .send(
            Method::GET,
            &format!("/activities?roomId={}&startOffset=0&endOffset=10", room),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<_> = activities
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["ADD_ADMIN", "ADD_MEMBER", "REMOVE_ADMIN"]);

    let (status, _) = h
        .send(
            Method::GET,
            &format!("/activities?roomId={}&startOffset=3&endOffset=1", room),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn close_room_over_http() {
    let h = Harness::new();
    let owner = h.add_user("Owner").await;
    let room = h.add_room("general", &owner).await;

    let uri = format!("/closeRoom?userId={}&roomId={}", owner, room);
    let (status, closed) = h.send(Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed, serde_json::json!([room]));

    let (status, _) = h.send(Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = h
        .send(
            Method::PUT,
            &format!("/closeRoom?userId={}&roomId={}", uuid::Uuid::new_v4(), room),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, users) = h.send(Method::GET, "/users", None).await;
    assert_eq!(users[0]["closedRooms"], serde_json::json!([room]));
}

#[tokio::test]
async fn reload_keeps_persisted_state() {
    let h = Harness::new();
    let owner = h.add_user("Owner").await;
    h.add_room("general", &owner).await;

    let (status, _) = h.send(Method::GET, "/reload", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, rooms) = h.send(Method::GET, "/rooms", None).await;
    assert_eq!(rooms.as_array().unwrap().len(), 1);
}
