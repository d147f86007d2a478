use axum::extract::State;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn heartbeat() -> &'static str {
    "I am here!"
}

/// Replace in-memory state with what the store holds.
pub async fn reload(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    info!("Received request to reload from store");
    state.call(|d| d.reload()).await?;
    Ok("Successfully reloaded data from store.")
}
