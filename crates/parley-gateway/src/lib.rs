pub mod broadcaster;
pub mod connection;

pub use broadcaster::{Broadcaster, Session, SessionClosed};
