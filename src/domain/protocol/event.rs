//! Player-originated events driving a game session.

use serde::Deserialize;

use crate::domain::foundation::Answer;

/// Everything a player can do to a session.
///
/// `Learn` carries the correction form: which guess was wrong, what the
/// player was actually thinking of, and optionally a distinguishing
/// question with its answer for the new entity. Without the question the
/// engine falls back to the attribute-filling dialogue, driven by
/// `AttributeAnswer` events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Start,
    Answer {
        answer: Answer,
    },
    Back,
    StartRefining,
    RefineAnswer {
        answer: Answer,
    },
    RefineBack,
    Learn {
        wrong_guess: String,
        correct_answer: String,
        #[serde(default)]
        new_question: Option<String>,
        #[serde(default)]
        new_question_answer: Option<Answer>,
    },
    AttributeAnswer {
        answer: Answer,
    },
}
