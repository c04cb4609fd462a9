//! Primary tree walk toward a first guess.

mod engine;

pub use engine::TraversalEngine;
