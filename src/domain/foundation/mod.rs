//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the guessing-game domain.

mod answer;
mod errors;
mod ids;
mod timestamp;

pub use answer::Answer;
pub use errors::{EngineError, ErrorCode, ValidationError};
pub use ids::{NodeId, SessionId};
pub use timestamp::Timestamp;
