//! Wire-level contract between the engine and its clients.

mod event;
mod response;

pub use event::GameEvent;
pub use response::{GameResponse, LearnStatus};
