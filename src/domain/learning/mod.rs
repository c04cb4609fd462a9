//! Permanent knowledge extension after a wrong guess.

mod engine;
mod state;

pub use engine::LearningEngine;
pub use state::FillingState;
