//! Owns live sessions and routes each event to the right engine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use crate::config::EngineConfig;
use crate::domain::foundation::{EngineError, SessionId, Timestamp};
use crate::domain::knowledge::{Dataset, SharedKnowledge};
use crate::domain::learning::LearningEngine;
use crate::domain::protocol::{GameEvent, GameResponse};
use crate::domain::refinement::RefinementEngine;
use crate::domain::traversal::TraversalEngine;

use super::state::Session;

/// Front door of the engine: one instance per process, holding every
/// in-flight game.
///
/// Sessions are independent; the knowledge store is the only state
/// they share. A session abandoned by its client holds no lock and is
/// reclaimed by `reclaim_idle`, so abandonment never blocks learning
/// elsewhere.
pub struct SessionManager {
    knowledge: SharedKnowledge,
    sessions: RwLock<HashMap<SessionId, Session>>,
    traversal: TraversalEngine,
    refinement: RefinementEngine,
    learning: LearningEngine,
}

impl SessionManager {
    pub fn new(
        knowledge: SharedKnowledge,
        max_refine_questions: usize,
        dataset_path: Option<PathBuf>,
    ) -> Self {
        Self {
            traversal: TraversalEngine::new(knowledge.clone()),
            refinement: RefinementEngine::new(knowledge.clone(), max_refine_questions),
            learning: LearningEngine::new(knowledge.clone(), dataset_path),
            sessions: RwLock::new(HashMap::new()),
            knowledge,
        }
    }

    /// Builds a manager wired from configuration: the knowledge store
    /// is loaded from the configured dataset path (starter fallback
    /// when absent) and the same path receives every learned mutation.
    pub fn from_config(config: &EngineConfig) -> Self {
        let dataset = match &config.dataset_path {
            Some(path) => Dataset::load(path),
            None => Dataset::fallback(),
        };
        Self::new(
            SharedKnowledge::from_dataset(dataset),
            config.max_refine_questions,
            config.dataset_path.clone(),
        )
    }

    /// Creates a session and returns its id with the opening prompt.
    pub fn start_session(&self) -> (SessionId, GameResponse) {
        let mut session = Session::new(self.knowledge.read().root());
        let response = match self.traversal.start(&mut session) {
            Ok(response) => response,
            Err(err) => err.into(),
        };
        let id = session.id();
        self.sessions_mut().insert(id, session);
        tracing::debug!(session = %id, "session started");
        (id, response)
    }

    /// Routes one client event to its engine. Errors come back as
    /// `{error}` responses with the session left unmutated by the
    /// failed operation.
    pub fn dispatch(&self, id: SessionId, event: GameEvent) -> GameResponse {
        let mut sessions = self.sessions_mut();
        let session = match sessions.get_mut(&id) {
            Some(session) => session,
            None => return EngineError::SessionNotFound(id).into(),
        };
        session.touch();

        let result = match event {
            GameEvent::Start => self.traversal.start(session),
            GameEvent::Answer { answer } => self.traversal.answer(session, answer),
            GameEvent::Back => self.traversal.back(session),
            GameEvent::StartRefining => self.refinement.start(session),
            GameEvent::RefineAnswer { answer } => self.refinement.answer(session, answer),
            GameEvent::RefineBack => self.refinement.back(session),
            GameEvent::Learn {
                wrong_guess,
                correct_answer,
                new_question,
                new_question_answer,
            } => self.learning.learn(
                session,
                &wrong_guess,
                &correct_answer,
                new_question.as_deref(),
                new_question_answer,
            ),
            GameEvent::AttributeAnswer { answer } => {
                self.learning.attribute_answer(session, answer)
            }
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(session = %id, %err, "event rejected");
                err.into()
            }
        }
    }

    /// Discards a session. Returns false if it was already gone.
    pub fn end_session(&self, id: SessionId) -> bool {
        match self.sessions_mut().remove(&id) {
            Some(session) => {
                let lifetime = Timestamp::now()
                    .duration_since(&session.created_at())
                    .num_seconds();
                tracing::debug!(session = %id, lifetime_secs = lifetime, "session ended");
                true
            }
            None => false,
        }
    }

    /// Drops sessions idle for at least `max_idle_secs`. Returns how
    /// many were reclaimed.
    pub fn reclaim_idle(&self, max_idle_secs: i64) -> usize {
        let now = Timestamp::now();
        let mut sessions = self.sessions_mut();
        let before = sessions.len();
        sessions.retain(|_, session| session.seconds_idle(now) < max_idle_secs);
        let reclaimed = before - sessions.len();
        if reclaimed > 0 {
            tracing::debug!(reclaimed, "idle sessions dropped");
        }
        reclaimed
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn knowledge(&self) -> &SharedKnowledge {
        &self.knowledge
    }

    fn sessions_mut(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
