//! Domain layer containing the game engine and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `knowledge` - Decision tree, attribute schema, and dataset persistence
//! - `traversal` - Primary question walk toward a first guess
//! - `refinement` - Bounded sub-search after a rejected first guess
//! - `learning` - Tree mutation: question splits and attribute filling
//! - `session` - Per-game state and the event dispatcher
//! - `protocol` - Wire-level events and responses

pub mod foundation;
pub mod knowledge;
pub mod learning;
pub mod protocol;
pub mod refinement;
pub mod session;
pub mod traversal;
