//! Bounded sub-search between a rejected first guess and a second guess.

mod engine;
mod state;

pub use engine::RefinementEngine;
pub use state::RefinementState;
