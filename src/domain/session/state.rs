//! One in-progress game: position, history, mode, and sub-dialogue state.

use crate::domain::foundation::{Answer, EngineError, NodeId, SessionId, Timestamp};
use crate::domain::learning::FillingState;
use crate::domain::refinement::RefinementState;

/// What kind of event the session currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Walking the tree toward a first guess.
    Traversing,
    /// Secondary search after a rejected first guess.
    Refining,
    /// Collecting the attribute vector for a brand-new entity.
    FillingAttributes,
    /// Terminal; only a restart is meaningful.
    Done,
}

/// The full mutable state of one game.
///
/// Owned exclusively by the `SessionManager` for the lifetime of the
/// game. Holds node identifiers into the shared knowledge store, never
/// node data, so a learning mutation in another session cannot leave
/// this one holding a stale copy.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    mode: GameMode,
    current: NodeId,
    history: Vec<NodeId>,
    answered: Vec<(String, Answer)>,
    first_guess: Option<String>,
    refinement: Option<RefinementState>,
    filling: Option<FillingState>,
    created_at: Timestamp,
    last_active_at: Timestamp,
}

impl Session {
    /// Creates a fresh session positioned at the tree root.
    pub fn new(root: NodeId) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            mode: GameMode::Traversing,
            current: root,
            history: Vec::new(),
            answered: Vec::new(),
            first_guess: None,
            refinement: None,
            filling: None,
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn first_guess(&self) -> Option<&str> {
        self.first_guess.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_active_at(&self) -> Timestamp {
        self.last_active_at
    }

    /// Marks the session as active now.
    pub fn touch(&mut self) {
        self.last_active_at = Timestamp::now();
    }

    /// Seconds since the last event, as seen from `now`.
    pub fn seconds_idle(&self, now: Timestamp) -> i64 {
        now.duration_since(&self.last_active_at).num_seconds()
    }

    /// Resets to the root for a new game, keeping the session id.
    pub fn restart(&mut self, root: NodeId) {
        self.mode = GameMode::Traversing;
        self.current = root;
        self.history.clear();
        self.answered.clear();
        self.first_guess = None;
        self.refinement = None;
        self.filling = None;
        self.touch();
    }

    /// Descends to a child node, remembering the answer given at the
    /// current question so it can be undone and replayed later.
    pub fn advance_to(&mut self, next: NodeId, attribute: impl Into<String>, answer: Answer) {
        self.history.push(self.current);
        self.answered.push((attribute.into(), answer));
        self.current = next;
    }

    /// Pops one step of history.
    ///
    /// # Errors
    ///
    /// - `NoHistory` at the root
    pub fn go_back(&mut self) -> Result<(), EngineError> {
        let prior = self.history.pop().ok_or(EngineError::NoHistory)?;
        self.answered.pop();
        self.current = prior;
        Ok(())
    }

    /// The attributes answered on the path from the root, in order.
    pub fn answered(&self) -> &[(String, Answer)] {
        &self.answered
    }

    /// Returns the answer recorded for an attribute on the current path.
    pub fn answered_value(&self, attribute: &str) -> Option<Answer> {
        self.answered
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .map(|(_, answer)| *answer)
    }

    /// Remembers the entity named by the first guess of this game.
    pub fn record_first_guess(&mut self, name: impl Into<String>) {
        if self.first_guess.is_none() {
            self.first_guess = Some(name.into());
        }
    }

    /// Enters refinement mode with a fresh sub-search state.
    pub fn begin_refining(&mut self, state: RefinementState) {
        self.mode = GameMode::Refining;
        self.refinement = Some(state);
    }

    pub fn refinement(&self) -> Option<&RefinementState> {
        self.refinement.as_ref()
    }

    pub fn refinement_mut(&mut self) -> Option<&mut RefinementState> {
        self.refinement.as_mut()
    }

    /// Enters attribute-filling mode with a fresh draft.
    pub fn begin_filling(&mut self, state: FillingState) {
        self.mode = GameMode::FillingAttributes;
        self.filling = Some(state);
    }

    pub fn filling(&self) -> Option<&FillingState> {
        self.filling.as_ref()
    }

    pub fn filling_mut(&mut self) -> Option<&mut FillingState> {
        self.filling.as_mut()
    }

    pub fn take_filling(&mut self) -> Option<FillingState> {
        self.filling.take()
    }

    /// Ends the game. Sub-dialogue state is dropped.
    pub fn finish(&mut self) {
        self.mode = GameMode::Done;
        self.refinement = None;
        self.filling = None;
    }
}
