//! Session lifecycle: per-game state and the event dispatcher.

mod manager;
mod state;

pub use manager::SessionManager;
pub use state::{GameMode, Session};
