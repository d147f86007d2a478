pub mod chat;
pub mod error;
pub mod rooms;
pub mod routes;
pub mod state;
pub mod system;
pub mod users;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
