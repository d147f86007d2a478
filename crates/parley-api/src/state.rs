use std::sync::Arc;

use tracing::error;

use parley_directory::{Directory, DirectoryResult};
use parley_gateway::Broadcaster;
use parley_types::events::DirectoryEvent;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub directory: Arc<Directory>,
    pub broadcaster: Broadcaster,
}

impl AppStateInner {
    pub fn new(directory: Arc<Directory>, broadcaster: Broadcaster) -> AppState {
        Arc::new(Self {
            directory,
            broadcaster,
        })
    }

    /// Run a directory call off the async runtime; the store does blocking I/O.
    pub async fn call<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Directory) -> DirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let directory = self.directory.clone();
        let result = tokio::task::spawn_blocking(move || f(&directory))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Join(e)
            })?;
        Ok(result?)
    }

    /// Push an event to every connected socket.
    pub async fn publish(&self, event: DirectoryEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => {
                self.broadcaster.broadcast(&json).await;
            }
            Err(e) => error!("Failed to serialize {:?}: {}", event, e),
        }
    }
}
