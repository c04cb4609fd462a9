//! Normal guessing: walk the tree from the root to a first guess.

use crate::domain::foundation::{Answer, EngineError};
use crate::domain::knowledge::{Node, SharedKnowledge};
use crate::domain::protocol::GameResponse;
use crate::domain::session::{GameMode, Session};

/// Drives the primary question/answer walk.
///
/// Holds only a handle to the shared knowledge store; all per-game
/// state lives in the `Session`.
#[derive(Debug, Clone)]
pub struct TraversalEngine {
    knowledge: SharedKnowledge,
}

impl TraversalEngine {
    pub fn new(knowledge: SharedKnowledge) -> Self {
        Self { knowledge }
    }

    /// Resets the session to the root and returns the first prompt:
    /// the root question, or an immediate guess for a single-leaf tree.
    pub fn start(&self, session: &mut Session) -> Result<GameResponse, EngineError> {
        let store = self.knowledge.read();
        session.restart(store.root());
        self.prompt(&store.node(session.current())?.clone(), session)
    }

    /// Descends to the child selected by the answer and returns the
    /// child's prompt. The session is only mutated once the child is
    /// known to resolve, so a corrupt reference leaves the game at its
    /// last good position.
    ///
    /// # Errors
    ///
    /// - `WrongMode` outside traversal, or when a guess is pending
    /// - `CorruptTree` if the selected child does not resolve
    pub fn answer(&self, session: &mut Session, answer: Answer) -> Result<GameResponse, EngineError> {
        if session.mode() != GameMode::Traversing {
            return Err(EngineError::wrong_mode("answer", session.mode()));
        }

        let store = self.knowledge.read();
        let node = store.node(session.current())?.clone();
        let (attribute, child) = match &node {
            Node::Question { attribute, yes, no, .. } => {
                let child = match answer {
                    Answer::Yes => *yes,
                    Answer::No => *no,
                };
                (attribute.clone(), child)
            }
            Node::Leaf(_) => {
                return Err(EngineError::WrongMode {
                    operation: "answer".to_string(),
                    mode: "AwaitingGuessVerdict".to_string(),
                });
            }
        };

        let child_node = store
            .node(child)
            .map_err(|_| EngineError::CorruptTree(child))?
            .clone();

        session.advance_to(child, attribute, answer);
        self.prompt(&child_node, session)
    }

    /// Pops one step of history and re-presents the prior prompt.
    ///
    /// # Errors
    ///
    /// - `WrongMode` outside traversal
    /// - `NoHistory` at the root
    pub fn back(&self, session: &mut Session) -> Result<GameResponse, EngineError> {
        if session.mode() != GameMode::Traversing {
            return Err(EngineError::wrong_mode("go back", session.mode()));
        }
        session.go_back()?;
        let store = self.knowledge.read();
        self.prompt(&store.node(session.current())?.clone(), session)
    }

    fn prompt(&self, node: &Node, session: &mut Session) -> Result<GameResponse, EngineError> {
        match node {
            Node::Question { text, .. } => {
                Ok(GameResponse::question(text, false, session.can_go_back()))
            }
            Node::Leaf(entity) => {
                session.record_first_guess(entity.name());
                tracing::debug!(session = %session.id(), guess = entity.name(), "first guess");
                Ok(GameResponse::guess(
                    entity.name(),
                    false,
                    false,
                    session.can_go_back(),
                ))
            }
        }
    }
}
