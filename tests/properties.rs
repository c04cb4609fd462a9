//! Property tests for traversal invariants.

use proptest::prelude::*;

use critter_oracle::domain::knowledge::Dataset;
use critter_oracle::{Answer, GameEvent, GameResponse, SessionManager, SharedKnowledge};

fn starter_manager() -> SessionManager {
    SessionManager::new(SharedKnowledge::from_dataset(Dataset::fallback()), 8, None)
}

proptest! {
    // The history stack is a true inverse: after any answer sequence,
    // going back replays the exact prompts in reverse order.
    #[test]
    fn back_unwinds_any_answer_path(answers in proptest::collection::vec(any::<bool>(), 1..16)) {
        let manager = starter_manager();
        let (id, mut prompt) = manager.start_session();
        let mut trail: Vec<GameResponse> = Vec::new();

        for &yes in &answers {
            if matches!(prompt, GameResponse::Guess { .. }) {
                break;
            }
            let next = manager.dispatch(id, GameEvent::Answer { answer: Answer::from_bool(yes) });
            let rejected = matches!(next, GameResponse::Error { .. });
            prop_assert!(!rejected, "unexpected {:?}", next);
            trail.push(prompt);
            prompt = next;
        }

        while let Some(expected) = trail.pop() {
            let restored = manager.dispatch(id, GameEvent::Back);
            prop_assert_eq!(&restored, &expected);
        }

        // Fully unwound: the next back reports the empty history.
        let at_root = manager.dispatch(id, GameEvent::Back);
        let is_error = matches!(at_root, GameResponse::Error { .. });
        prop_assert!(is_error, "expected an error at the root, got {:?}", at_root);
    }

    // Any answer path terminates in a guess naming a known entity.
    #[test]
    fn every_path_ends_at_a_known_entity(answers in proptest::collection::vec(any::<bool>(), 0..32)) {
        let manager = starter_manager();
        let (id, mut prompt) = manager.start_session();

        for &yes in &answers {
            if let GameResponse::Guess { ref character, .. } = prompt {
                prop_assert!(manager.knowledge().read().entity(character).is_some());
                return Ok(());
            }
            prompt = manager.dispatch(id, GameEvent::Answer { answer: Answer::from_bool(yes) });
        }
    }
}
