//! Per-session state of the refinement sub-search.

use crate::domain::foundation::{Answer, EngineError};
use crate::domain::knowledge::{AttributeSchema, Entity};

/// The cursor of one refinement search.
///
/// `snapshot` is the candidate set captured when refinement started,
/// minus the rejected guess. It is a copy of the leaves at that moment:
/// concurrent learning in other sessions can make it slightly stale but
/// never corrupt it.
#[derive(Debug, Clone)]
pub struct RefinementState {
    rejected: Entity,
    snapshot: Vec<Entity>,
    asked: Vec<(String, Answer)>,
    pending: Option<String>,
    second_guess: Option<String>,
}

impl RefinementState {
    pub fn new(rejected: Entity, snapshot: Vec<Entity>) -> Self {
        Self {
            rejected,
            snapshot,
            asked: Vec::new(),
            pending: None,
            second_guess: None,
        }
    }

    pub fn rejected(&self) -> &Entity {
        &self.rejected
    }

    pub fn questions_asked(&self) -> usize {
        self.asked.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.asked.is_empty()
    }

    /// The attribute whose question is currently awaiting an answer.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn set_pending(&mut self, attribute: impl Into<String>) {
        self.pending = Some(attribute.into());
    }

    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    pub fn second_guess(&self) -> Option<&str> {
        self.second_guess.as_deref()
    }

    pub fn set_second_guess(&mut self, name: impl Into<String>) {
        self.second_guess = Some(name.into());
    }

    /// Records an answered refinement question.
    pub fn record(&mut self, attribute: impl Into<String>, answer: Answer) {
        self.asked.push((attribute.into(), answer));
    }

    /// Undoes the last filter step.
    ///
    /// # Errors
    ///
    /// - `NoHistory` if nothing has been answered yet
    pub fn undo(&mut self) -> Result<(), EngineError> {
        if self.asked.pop().is_none() {
            return Err(EngineError::NoHistory);
        }
        self.pending = None;
        self.second_guess = None;
        Ok(())
    }

    pub fn has_asked(&self, attribute: &str) -> bool {
        self.asked
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(attribute))
    }

    /// The refinement answers given so far, in question order.
    pub fn answers(&self) -> &[(String, Answer)] {
        &self.asked
    }

    /// Snapshot entities consistent with every answer given so far.
    pub fn candidates(&self) -> Vec<&Entity> {
        self.candidates_under(&self.asked)
    }

    fn candidates_under(&self, asked: &[(String, Answer)]) -> Vec<&Entity> {
        self.snapshot
            .iter()
            .filter(|entity| {
                asked
                    .iter()
                    .all(|(attr, answer)| entity.value_or_default(attr) == answer.as_bool())
            })
            .collect()
    }

    /// Candidates ranked by agreement with the rejected guess, highest
    /// first; ties keep snapshot order. When the latest answer emptied
    /// the set, ranking falls back to the candidates as they stood
    /// before that answer, so a second guess is always possible.
    pub fn ranked(&self, schema: &AttributeSchema) -> Vec<&Entity> {
        let mut candidates = self.candidates();
        let mut keep = self.asked.len();
        while candidates.is_empty() && keep > 0 {
            keep -= 1;
            candidates = self.candidates_under(&self.asked[..keep]);
        }
        candidates.sort_by_key(|entity| {
            std::cmp::Reverse(entity.agreement_with(&self.rejected, schema))
        });
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, values: &[(&str, bool)]) -> Entity {
        let mut e = Entity::new(name).unwrap();
        for (attr, v) in values {
            e.set_attribute(*attr, *v);
        }
        e
    }

    fn schema() -> AttributeSchema {
        AttributeSchema::from_names(["IsMammal", "CanFly", "HasFur"]).unwrap()
    }

    fn state() -> RefinementState {
        RefinementState::new(
            entity("Dog", &[("IsMammal", true), ("HasFur", true)]),
            vec![
                entity("Eagle", &[("CanFly", true)]),
                entity("Cat", &[("IsMammal", true), ("HasFur", true)]),
                entity("Bat", &[("IsMammal", true), ("CanFly", true), ("HasFur", true)]),
            ],
        )
    }

    #[test]
    fn candidates_shrink_with_each_answer() {
        let mut state = state();
        assert_eq!(state.candidates().len(), 3);

        state.record("IsMammal", Answer::Yes);
        let names: Vec<&str> = state.candidates().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Cat", "Bat"]);

        state.record("CanFly", Answer::No);
        let names: Vec<&str> = state.candidates().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Cat"]);
    }

    #[test]
    fn undo_restores_the_previous_candidate_set() {
        let mut state = state();
        state.record("IsMammal", Answer::Yes);
        state.record("CanFly", Answer::No);
        state.undo().unwrap();
        assert_eq!(state.candidates().len(), 2);
    }

    #[test]
    fn undo_with_no_answers_reports_no_history() {
        let mut state = state();
        assert!(matches!(state.undo(), Err(EngineError::NoHistory)));
    }

    #[test]
    fn ranking_prefers_entities_closest_to_the_rejected_guess() {
        let state = state();
        let ranked: Vec<&str> = state.ranked(&schema()).iter().map(|e| e.name()).collect();
        // Cat agrees with Dog on all three attributes, Bat on two,
        // Eagle on none.
        assert_eq!(ranked, vec!["Cat", "Bat", "Eagle"]);
    }

    #[test]
    fn ranking_ties_keep_snapshot_order() {
        let state = RefinementState::new(
            entity("Dog", &[("IsMammal", true)]),
            vec![
                entity("Lion", &[("IsMammal", true)]),
                entity("Cat", &[("IsMammal", true)]),
            ],
        );
        let ranked: Vec<&str> = state.ranked(&schema()).iter().map(|e| e.name()).collect();
        assert_eq!(ranked, vec!["Lion", "Cat"]);
    }

    #[test]
    fn over_filtered_set_ranks_the_pre_filter_candidates() {
        let mut state = state();
        state.record("IsMammal", Answer::Yes);
        state.record("IsMammal", Answer::No);
        assert!(state.candidates().is_empty());

        // The emptying answer is discarded for ranking purposes; the
        // survivors of the first filter remain, closest to Dog first.
        let ranked: Vec<&str> = state.ranked(&schema()).iter().map(|e| e.name()).collect();
        assert_eq!(ranked, vec!["Cat", "Bat"]);
    }
}
