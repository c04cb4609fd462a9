//! Critter Oracle - a "20 questions" guessing game engine.
//!
//! A binary decision tree of yes/no questions is walked until the
//! engine commits to a guess. A rejected guess triggers a bounded
//! refinement search over similar entities; if that also fails, the
//! engine learns: it splits the wrong leaf on a player-supplied
//! question, or interviews the player to build a brand-new entity.
//!
//! The [`domain::session::SessionManager`] is the single entry point:
//! it owns every live game and dispatches [`domain::protocol::GameEvent`]s
//! to the traversal, refinement, and learning engines, all of which
//! share one [`domain::knowledge::SharedKnowledge`] store.

pub mod config;
pub mod domain;

pub use domain::foundation::{Answer, EngineError, ErrorCode, SessionId};
pub use domain::knowledge::{Dataset, KnowledgeStore, SharedKnowledge};
pub use domain::protocol::{GameEvent, GameResponse, LearnStatus};
pub use domain::session::SessionManager;
