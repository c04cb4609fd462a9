//! Secondary search after a rejected first guess.
//!
//! Refinement never restarts traversal from the root: facts the player
//! already confirmed stay confirmed. It ranks the remaining leaves by
//! similarity to the rejected guess and either asks a clarifying
//! question that separates the top candidates, or commits to a second
//! guess. The store is never mutated here.

use crate::domain::foundation::{Answer, EngineError};
use crate::domain::knowledge::{Entity, SharedKnowledge};
use crate::domain::protocol::GameResponse;
use crate::domain::session::{GameMode, Session};

use super::state::RefinementState;

enum Step {
    Ask { attribute: String, question: String },
    Guess(String),
}

/// Drives the bounded sub-search between the first and second guess.
#[derive(Debug, Clone)]
pub struct RefinementEngine {
    knowledge: SharedKnowledge,
    max_questions: usize,
}

impl RefinementEngine {
    pub fn new(knowledge: SharedKnowledge, max_questions: usize) -> Self {
        Self {
            knowledge,
            max_questions,
        }
    }

    /// Starts refining against the session's rejected first guess.
    ///
    /// # Errors
    ///
    /// - `WrongMode` if no first guess has been made yet
    /// - `UnknownEntity` if the guessed entity is gone from the store
    /// - `NoCandidates` when the guess was the only known entity
    pub fn start(&self, session: &mut Session) -> Result<GameResponse, EngineError> {
        if session.mode() != GameMode::Traversing {
            return Err(EngineError::wrong_mode("start refining", session.mode()));
        }
        let first_guess = session
            .first_guess()
            .ok_or_else(|| EngineError::WrongMode {
                operation: "start refining".to_string(),
                mode: "NoGuessYet".to_string(),
            })?
            .to_string();

        let (rejected, snapshot) = {
            let store = self.knowledge.read();
            let rejected = store
                .entity(&first_guess)
                .cloned()
                .ok_or_else(|| EngineError::unknown_entity(&first_guess))?;
            let snapshot: Vec<Entity> = store
                .entities()
                .iter()
                .filter(|e| !e.is_named(&first_guess))
                .cloned()
                .collect();
            (rejected, snapshot)
        };
        if snapshot.is_empty() {
            return Err(EngineError::NoCandidates);
        }

        tracing::debug!(
            session = %session.id(),
            rejected = %first_guess,
            candidates = snapshot.len(),
            "refinement started"
        );
        session.begin_refining(RefinementState::new(rejected, snapshot));
        self.next_prompt(session)
    }

    /// Applies an answer to the pending refinement question.
    ///
    /// # Errors
    ///
    /// - `WrongMode` outside refinement, or after the second guess
    pub fn answer(&self, session: &mut Session, answer: Answer) -> Result<GameResponse, EngineError> {
        if session.mode() != GameMode::Refining {
            return Err(EngineError::wrong_mode("refine answer", session.mode()));
        }
        let state = session
            .refinement_mut()
            .ok_or_else(|| EngineError::wrong_mode("refine answer", GameMode::Refining))?;
        let attribute = state.take_pending().ok_or(EngineError::WrongMode {
            operation: "refine answer".to_string(),
            mode: "AwaitingGuessVerdict".to_string(),
        })?;
        state.record(attribute, answer);
        self.next_prompt(session)
    }

    /// Undoes the last refinement filter step.
    ///
    /// # Errors
    ///
    /// - `WrongMode` outside refinement
    /// - `NoHistory` before any refinement answer
    pub fn back(&self, session: &mut Session) -> Result<GameResponse, EngineError> {
        if session.mode() != GameMode::Refining {
            return Err(EngineError::wrong_mode("refine back", session.mode()));
        }
        session
            .refinement_mut()
            .ok_or_else(|| EngineError::wrong_mode("refine back", GameMode::Refining))?
            .undo()?;
        self.next_prompt(session)
    }

    /// Decides the next step from the current candidate ranking: a
    /// clarifying question built from the first schema attribute on
    /// which the top two candidates disagree (and that has not been
    /// asked in either phase of this game), or a second guess once the
    /// candidates cannot be narrowed further or the question budget is
    /// spent. An answer that empties the candidate set also forces the
    /// second guess, taken from the pre-filter ranking.
    fn next_prompt(&self, session: &mut Session) -> Result<GameResponse, EngineError> {
        let schema = self.knowledge.read().schema().clone();
        let already_answered: Vec<String> = session
            .answered()
            .iter()
            .map(|(attr, _)| attr.clone())
            .collect();
        let state = session
            .refinement_mut()
            .ok_or_else(|| EngineError::wrong_mode("refine", GameMode::Refining))?;

        let step = {
            let over_filtered = state.candidates().is_empty();
            let ranked = state.ranked(&schema);
            if ranked.is_empty() {
                return Err(EngineError::NoCandidates);
            }
            if over_filtered
                || ranked.len() == 1
                || state.questions_asked() >= self.max_questions
            {
                Step::Guess(ranked[0].name().to_string())
            } else {
                let clarifying = schema.iter().find(|attr| {
                    !already_answered
                        .iter()
                        .any(|a| a.eq_ignore_ascii_case(attr.name()))
                        && !state.has_asked(attr.name())
                        && ranked[0].value_or_default(attr.name())
                            != ranked[1].value_or_default(attr.name())
                });
                match clarifying {
                    Some(attr) => Step::Ask {
                        attribute: attr.name().to_string(),
                        question: attr.question().to_string(),
                    },
                    None => Step::Guess(ranked[0].name().to_string()),
                }
            }
        };

        match step {
            Step::Ask {
                attribute,
                question,
            } => {
                let can_go_back = state.can_undo();
                state.set_pending(attribute);
                Ok(GameResponse::question(question, true, can_go_back))
            }
            Step::Guess(name) => {
                tracing::debug!(guess = %name, "second guess");
                state.set_second_guess(name.clone());
                let can_go_back = state.can_undo();
                Ok(GameResponse::guess(name, true, true, can_go_back))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::NodeId;
    use crate::domain::knowledge::{AttributeSchema, Dataset};

    fn dataset(rows: &[(&str, &[(&str, bool)])], attrs: &[&str]) -> Dataset {
        let schema = AttributeSchema::from_names(attrs.iter().copied()).unwrap();
        let entities = rows
            .iter()
            .map(|(name, values)| {
                let mut e = Entity::new(*name).unwrap();
                for (attr, v) in values.iter() {
                    e.set_attribute(*attr, *v);
                }
                e
            })
            .collect();
        Dataset::new(schema, entities)
    }

    fn session_with_guess(knowledge: &SharedKnowledge, guess: &str) -> Session {
        let mut session = Session::new(knowledge.read().root());
        session.record_first_guess(guess);
        session
    }

    #[test]
    fn sole_remaining_candidate_is_guessed_directly() {
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("CanBark", true)]),
                ("Cat", &[("CanBark", false)]),
            ],
            &["CanBark"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");

        let response = engine.start(&mut session).unwrap();
        match response {
            GameResponse::Guess {
                character,
                is_second_guess,
                is_refining,
                ..
            } => {
                assert_eq!(character, "Cat");
                assert!(is_second_guess);
                assert!(is_refining);
            }
            other => panic!("expected a second guess, got {:?}", other),
        }
    }

    #[test]
    fn start_without_a_first_guess_is_rejected() {
        let knowledge = SharedKnowledge::from_dataset(Dataset::fallback());
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = Session::new(knowledge.read().root());
        assert!(matches!(
            engine.start(&mut session),
            Err(EngineError::WrongMode { .. })
        ));
    }

    #[test]
    fn single_entity_store_has_no_candidates() {
        let knowledge =
            SharedKnowledge::from_dataset(dataset(&[("Dog", &[])], &["IsMammal"]));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");
        assert!(matches!(
            engine.start(&mut session),
            Err(EngineError::NoCandidates)
        ));
    }

    #[test]
    fn clarifying_question_separates_the_top_candidates() {
        // Cat and Lion both agree with Dog on IsMammal but differ from
        // each other on IsPet, the first discriminating attribute.
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("IsMammal", true), ("IsPet", true)]),
                ("Cat", &[("IsMammal", true), ("IsPet", true)]),
                ("Lion", &[("IsMammal", true), ("IsPet", false)]),
            ],
            &["IsMammal", "IsPet"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");

        let response = engine.start(&mut session).unwrap();
        match response {
            GameResponse::Question {
                question,
                is_refining,
                can_go_back,
                ..
            } => {
                assert_eq!(question, "Is it a pet?");
                assert!(is_refining);
                assert!(!can_go_back);
            }
            other => panic!("expected a question, got {:?}", other),
        }

        let response = engine.answer(&mut session, Answer::No).unwrap();
        match response {
            GameResponse::Guess { character, .. } => assert_eq!(character, "Lion"),
            other => panic!("expected a second guess, got {:?}", other),
        }
    }

    #[test]
    fn attributes_answered_during_traversal_are_not_re_asked() {
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("IsMammal", true), ("IsPet", true)]),
                ("Cat", &[("IsMammal", true), ("IsPet", true)]),
                ("Lion", &[("IsMammal", true), ("IsPet", false)]),
            ],
            &["IsMammal", "IsPet"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");
        session.advance_to(NodeId::from_raw(1), "IsPet", Answer::Yes);

        // IsPet is off the table, and no other attribute separates the
        // candidates, so refinement guesses the best-ranked directly.
        let response = engine.start(&mut session).unwrap();
        assert!(matches!(response, GameResponse::Guess { .. }));
    }

    #[test]
    fn question_budget_forces_a_guess() {
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("IsMammal", true)]),
                ("Cat", &[("IsMammal", true), ("IsPet", true)]),
                ("Lion", &[("IsMammal", true), ("IsLarge", true)]),
            ],
            &["IsMammal", "IsPet", "IsLarge"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 0);
        let mut session = session_with_guess(&knowledge, "Dog");

        let response = engine.start(&mut session).unwrap();
        assert!(matches!(
            response,
            GameResponse::Guess {
                is_second_guess: true,
                ..
            }
        ));
    }

    #[test]
    fn emptying_answer_forces_a_guess_from_the_pre_filter_set() {
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("IsMammal", true), ("IsPet", true)]),
                ("Cat", &[("IsMammal", true), ("IsPet", true)]),
                ("Lion", &[("IsMammal", true), ("IsPet", false)]),
            ],
            &["IsMammal", "IsPet"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");

        // Pending question after start is IsPet. A recorded answer no
        // candidate satisfies leaves the pending filter with nothing to
        // keep, whatever the player says next.
        engine.start(&mut session).unwrap();
        session
            .refinement_mut()
            .unwrap()
            .record("IsMammal", Answer::No);

        let response = engine.answer(&mut session, Answer::Yes).unwrap();
        match response {
            GameResponse::Guess {
                character,
                is_second_guess,
                ..
            } => {
                // Cat outranks Lion against the rejected Dog.
                assert_eq!(character, "Cat");
                assert!(is_second_guess);
            }
            other => panic!("expected a second guess, got {:?}", other),
        }
    }

    #[test]
    fn back_restores_the_previous_refinement_question() {
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("IsMammal", true), ("IsPet", true)]),
                ("Cat", &[("IsMammal", true), ("IsPet", true)]),
                ("Lion", &[("IsMammal", true), ("IsPet", false)]),
            ],
            &["IsMammal", "IsPet"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");

        let first = engine.start(&mut session).unwrap();
        engine.answer(&mut session, Answer::No).unwrap();
        let restored = engine.back(&mut session).unwrap();
        assert_eq!(first, restored);
    }

    #[test]
    fn back_before_any_answer_reports_no_history() {
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("IsMammal", true), ("IsPet", true)]),
                ("Cat", &[("IsMammal", true), ("IsPet", true)]),
                ("Lion", &[("IsMammal", true), ("IsPet", false)]),
            ],
            &["IsMammal", "IsPet"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");
        engine.start(&mut session).unwrap();
        assert!(matches!(
            engine.back(&mut session),
            Err(EngineError::NoHistory)
        ));
    }

    #[test]
    fn answering_after_the_second_guess_is_rejected() {
        let knowledge = SharedKnowledge::from_dataset(dataset(
            &[
                ("Dog", &[("CanBark", true)]),
                ("Cat", &[("CanBark", false)]),
            ],
            &["CanBark"],
        ));
        let engine = RefinementEngine::new(knowledge.clone(), 8);
        let mut session = session_with_guess(&knowledge, "Dog");
        engine.start(&mut session).unwrap();
        assert!(matches!(
            engine.answer(&mut session, Answer::Yes),
            Err(EngineError::WrongMode { .. })
        ));
    }
}
