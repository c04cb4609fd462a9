//! Online learning: the only writer of the knowledge store.
//!
//! Two protocols, selected by whether the correct entity already has a
//! vector. A known entity is separated from the wrong guess with one
//! player-supplied question; an unknown one first goes through the
//! attribute-filling dialogue so a complete vector exists before the
//! tree is touched. Every mutation happens under one write guard, so a
//! concurrently traversing session sees either the old leaf or the
//! finished split, never an intermediate shape.

use std::path::PathBuf;

use crate::domain::foundation::{Answer, EngineError, NodeId, ValidationError};
use crate::domain::knowledge::{
    Attribute, Entity, KnowledgeStore, Node, SharedKnowledge,
};
use crate::domain::protocol::{GameResponse, LearnStatus};
use crate::domain::session::{GameMode, Session};

use super::state::FillingState;

/// Mutates the knowledge store when the player corrects a wrong guess.
#[derive(Debug, Clone)]
pub struct LearningEngine {
    knowledge: SharedKnowledge,
    dataset_path: Option<PathBuf>,
}

impl LearningEngine {
    /// A `dataset_path` of `None` keeps learned knowledge in memory
    /// only; otherwise every successful mutation rewrites the file.
    pub fn new(knowledge: SharedKnowledge, dataset_path: Option<PathBuf>) -> Self {
        Self {
            knowledge,
            dataset_path,
        }
    }

    /// Handles a correction form.
    ///
    /// With a distinguishing question, an unknown correct entity splits
    /// the wrong guess's leaf, while a known one has the answered fact
    /// recorded on its row and the tree rebuilt around it. Without a
    /// question, a known correct entity is rejected (the question is
    /// genuinely required) and an unknown one starts the
    /// attribute-filling dialogue.
    ///
    /// # Errors
    ///
    /// - `Validation` on blank names or a question without an answer
    /// - `SameEntity` when the correction names the rejected guess
    /// - `UnknownEntity` when the wrong guess has no leaf
    /// - `AmbiguousQuestion` when a required question is missing
    pub fn learn(
        &self,
        session: &mut Session,
        wrong_guess: &str,
        correct_answer: &str,
        new_question: Option<&str>,
        new_question_answer: Option<Answer>,
    ) -> Result<GameResponse, EngineError> {
        let wrong_guess = wrong_guess.trim();
        let correct = correct_answer.trim();
        if wrong_guess.is_empty() {
            return Err(ValidationError::empty_field("wrong_guess").into());
        }
        if correct.is_empty() {
            return Err(ValidationError::empty_field("correct_answer").into());
        }
        if wrong_guess.eq_ignore_ascii_case(correct) {
            return Err(EngineError::same_entity(correct));
        }

        let question = new_question.map(str::trim).filter(|q| !q.is_empty());
        match question {
            Some(question) => {
                let answer = new_question_answer
                    .ok_or_else(|| ValidationError::empty_field("new_question_answer"))?;
                self.learn_with_question(session, wrong_guess, correct, question, answer)
            }
            None => self.learn_without_question(session, wrong_guess, correct),
        }
    }

    /// Records one answer of the attribute-filling dialogue.
    ///
    /// When the cursor exhausts the schema the draft is committed: the
    /// first attribute differing from the wrong guess becomes the split
    /// question. If the completed vector is identical to the wrong
    /// guess's, the engine keeps the draft and asks the caller for an
    /// ad-hoc distinguishing question instead of failing.
    ///
    /// # Errors
    ///
    /// - `WrongMode` outside the filling dialogue
    pub fn attribute_answer(
        &self,
        session: &mut Session,
        answer: Answer,
    ) -> Result<GameResponse, EngineError> {
        if session.mode() != GameMode::FillingAttributes {
            return Err(EngineError::wrong_mode("record attribute", session.mode()));
        }
        let schema = self.knowledge.read().schema().clone();
        let filling = session
            .filling_mut()
            .ok_or_else(|| EngineError::wrong_mode("record attribute", GameMode::FillingAttributes))?;

        if let Some(attr) = schema.at(filling.cursor()) {
            filling.record_and_advance(attr.name(), answer.is_yes());
        }
        if let Some(next) = schema.at(filling.cursor()) {
            return Ok(GameResponse::filling(next.question()));
        }

        // Vector complete: find something that separates it from the
        // wrong guess.
        let wrong_guess = filling.wrong_guess().to_string();
        let draft = filling.draft().clone();
        let separating = {
            let store = self.knowledge.read();
            let wrong = store
                .entity(&wrong_guess)
                .cloned()
                .ok_or_else(|| EngineError::unknown_entity(&wrong_guess))?;
            schema
                .iter()
                .find(|attr| {
                    draft.value_or_default(attr.name()) != wrong.value_or_default(attr.name())
                })
                .map(|attr| attr.name().to_string())
        };

        match separating {
            Some(attribute) => {
                let name = draft.name().to_string();
                let correct_side = Answer::from_bool(draft.value_or_default(&attribute));
                {
                    let mut store = self.knowledge.write();
                    split_leaf(&mut store, &wrong_guess, draft, &attribute, correct_side)?;
                    self.persist(&store);
                }
                session.finish();
                tracing::info!(entity = %name, "new entity learned via attribute filling");
                Ok(GameResponse::learned(LearnStatus::Done, Some(name)))
            }
            None => {
                // Draft stays on the session; the follow-up learn call
                // carries the distinguishing question.
                Ok(GameResponse::learned(LearnStatus::AskDistinguishing, None))
            }
        }
    }

    fn learn_with_question(
        &self,
        session: &mut Session,
        wrong_guess: &str,
        correct: &str,
        question: &str,
        answer: Answer,
    ) -> Result<GameResponse, EngineError> {
        let derived = Attribute::from_question(question)?;
        let committed_via_filling;

        {
            let mut store = self.knowledge.write();
            if store.find_leaf(wrong_guess).is_none() {
                return Err(EngineError::unknown_entity(wrong_guess));
            }

            if store.entity(correct).is_some() {
                // The player's animal is already known but the search
                // missed it. Record the distinguishing fact on its row
                // and rebuild so the next game can reach it.
                let attribute = ensure_attribute(&mut store, derived)?;
                store.set_entity_attribute(correct, &attribute, answer.is_yes())?;
                store.rebuild();
                self.persist(&store);
                drop(store);
                session.finish();
                tracing::info!(entity = %correct, question = %question, "known entity corrected");
                return Ok(GameResponse::learned(LearnStatus::Ok, None));
            }

            // Only claim the retained filling draft once the guards
            // have passed, so a failed learn keeps it for a retry.
            let draft = if session
                .filling()
                .map_or(false, |f| f.draft().is_named(correct))
            {
                session.take_filling()
            } else {
                None
            };
            committed_via_filling = draft.is_some();

            let attribute = ensure_attribute(&mut store, derived)?;

            let mut entity = match draft {
                Some(filling) => filling.into_draft(),
                None => {
                    // No collected vector: start from what the wrong
                    // guess looks like and overlay the facts the player
                    // confirmed during traversal and refinement.
                    let mut entity = Entity::new(correct)?;
                    if let Some(wrong) = store.entity(wrong_guess) {
                        for (attr, value) in wrong.attributes() {
                            entity.set_attribute(attr.clone(), *value);
                        }
                    }
                    for (attr, given) in session.answered() {
                        entity.set_attribute(attr.clone(), given.is_yes());
                    }
                    if let Some(refinement) = session.refinement() {
                        for (attr, given) in refinement.answers() {
                            entity.set_attribute(attr.clone(), given.is_yes());
                        }
                    }
                    entity
                }
            };
            entity.set_attribute(&attribute, answer.is_yes());

            split_leaf(&mut store, wrong_guess, entity, &attribute, answer)?;
            self.persist(&store);
        }

        session.finish();
        tracing::info!(entity = %correct, question = %question, "knowledge extended");
        if committed_via_filling {
            Ok(GameResponse::learned(
                LearnStatus::Done,
                Some(correct.to_string()),
            ))
        } else {
            Ok(GameResponse::learned(LearnStatus::Ok, None))
        }
    }

    fn learn_without_question(
        &self,
        session: &mut Session,
        wrong_guess: &str,
        correct: &str,
    ) -> Result<GameResponse, EngineError> {
        let first_question = {
            let store = self.knowledge.read();
            if store.find_leaf(wrong_guess).is_none() {
                return Err(EngineError::unknown_entity(wrong_guess));
            }
            if store.entity(correct).is_some() {
                // A known entity needs a distinguishing question; there
                // is nothing to fill.
                return Err(EngineError::AmbiguousQuestion);
            }
            store
                .schema()
                .at(0)
                .map(|attr| attr.question().to_string())
        };
        let first_question = first_question.ok_or(EngineError::AmbiguousQuestion)?;

        session.begin_filling(FillingState::new(wrong_guess, correct)?);
        tracing::debug!(entity = %correct, "attribute filling started");
        Ok(GameResponse::filling(first_question))
    }

    fn persist(&self, store: &KnowledgeStore) {
        if let Some(path) = &self.dataset_path {
            if let Err(err) = store.to_dataset().save(path) {
                tracing::warn!(%err, path = %path.display(), "dataset not persisted");
            }
        }
    }
}

/// Resolves a derived attribute against the schema, appending it when
/// new. Pre-existing attributes keep their recorded values everywhere;
/// a fresh one defaults to false for every known entity.
fn ensure_attribute(
    store: &mut KnowledgeStore,
    derived: Attribute,
) -> Result<String, EngineError> {
    match store.schema().get(derived.name()) {
        Some(existing) => Ok(existing.name().to_string()),
        None => {
            let name = derived.name().to_string();
            store.add_attribute(derived)?;
            Ok(name)
        }
    }
}

/// Splits the wrong guess's leaf into a question node whose children
/// are the preserved old leaf and a newly appended leaf for `correct`.
/// Answering `correct_side` at the new question reaches the new entity.
///
/// Nothing is mutated unless every fallible step succeeds: the append
/// runs before any node is rewritten.
fn split_leaf(
    store: &mut KnowledgeStore,
    wrong_guess: &str,
    correct: Entity,
    attribute: &str,
    correct_side: Answer,
) -> Result<NodeId, EngineError> {
    let leaf_id = store
        .find_leaf(wrong_guess)
        .ok_or_else(|| EngineError::unknown_entity(wrong_guess))?;
    let old_entity = store
        .node(leaf_id)?
        .as_leaf()
        .cloned()
        .ok_or(EngineError::CorruptTree(leaf_id))?;

    let new_leaf = store.append_leaf(correct)?;
    let preserved = store.insert_node(Node::Leaf(old_entity));
    let text = store
        .schema()
        .get(attribute)
        .map(|a| a.question().to_string())
        .unwrap_or_else(|| format!("{}?", attribute));
    let (yes, no) = match correct_side {
        Answer::Yes => (new_leaf, preserved),
        Answer::No => (preserved, new_leaf),
    };
    store.replace_node(
        leaf_id,
        Node::Question {
            attribute: attribute.to_string(),
            text,
            yes,
            no,
        },
    )?;
    Ok(new_leaf)
}
