pub mod config;

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    http::{HeaderMap, Method, StatusCode, header::{CONTENT_TYPE, ORIGIN}},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use parley_api::AppState;
use parley_gateway::{Broadcaster, connection};

use crate::config::{AllowedOrigins, ServerConfig};

#[derive(Clone)]
struct SocketState {
    broadcaster: Broadcaster,
    origins: Arc<AllowedOrigins>,
}

/// The full application: directory routes, the socket route, CORS and tracing.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let socket_state = SocketState {
        broadcaster: state.broadcaster.clone(),
        origins: Arc::new(config.allowed_origins.clone()),
    };

    let ws_route = Router::new()
        .route(&config.socket_path, get(ws_upgrade))
        .with_state(socket_state);

    let allow_origin = match &config.allowed_origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(list) => AllowOrigin::list(list.clone()),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .merge(parley_api::router(state))
        .merge(ws_route)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn ws_upgrade(
    State(state): State<SocketState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let origin = headers.get(ORIGIN);
    if !state.origins.permits(origin) {
        warn!("Rejected socket upgrade from origin {:?}", origin);
        return StatusCode::FORBIDDEN.into_response();
    }
    ws.on_upgrade(move |socket| connection::handle_connection(socket, state.broadcaster))
}
