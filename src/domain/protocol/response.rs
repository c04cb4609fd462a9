//! Engine responses, shaped for direct serialization to a client.

use serde::Serialize;

use crate::domain::foundation::{EngineError, ErrorCode};

/// Outcome of a learning event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnStatus {
    /// The knowledge base was updated in one step.
    Ok,
    /// The attribute-filling dialogue could not separate the new entity
    /// from the wrong guess; a distinguishing question is required.
    AskDistinguishing,
    /// The attribute-filling dialogue finished and the entity was added.
    Done,
}

/// What the engine tells the player after each event.
///
/// Serialized untagged: each variant's field set is the wire contract,
/// so a client can branch on `is_guess` / `is_filling` / `status` /
/// `error` without a discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GameResponse {
    Question {
        is_guess: bool,
        question: String,
        is_refining: bool,
        can_go_back: bool,
    },
    Guess {
        is_guess: bool,
        character: String,
        is_second_guess: bool,
        is_refining: bool,
        can_go_back: bool,
    },
    Filling {
        is_filling: bool,
        question: String,
    },
    Learned {
        status: LearnStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        animal_added: Option<String>,
    },
    Error {
        error: String,
        code: ErrorCode,
    },
}

impl GameResponse {
    pub fn question(text: impl Into<String>, is_refining: bool, can_go_back: bool) -> Self {
        GameResponse::Question {
            is_guess: false,
            question: text.into(),
            is_refining,
            can_go_back,
        }
    }

    pub fn guess(
        character: impl Into<String>,
        is_second_guess: bool,
        is_refining: bool,
        can_go_back: bool,
    ) -> Self {
        GameResponse::Guess {
            is_guess: true,
            character: character.into(),
            is_second_guess,
            is_refining,
            can_go_back,
        }
    }

    pub fn filling(question: impl Into<String>) -> Self {
        GameResponse::Filling {
            is_filling: true,
            question: question.into(),
        }
    }

    pub fn learned(status: LearnStatus, animal_added: Option<String>) -> Self {
        GameResponse::Learned {
            status,
            animal_added,
        }
    }
}

impl From<EngineError> for GameResponse {
    fn from(err: EngineError) -> Self {
        GameResponse::Error {
            error: err.message(),
            code: err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_serializes_with_flag_fields() {
        let json =
            serde_json::to_value(GameResponse::question("Is it a mammal?", false, true)).unwrap();
        assert_eq!(json["is_guess"], false);
        assert_eq!(json["question"], "Is it a mammal?");
        assert_eq!(json["is_refining"], false);
        assert_eq!(json["can_go_back"], true);
    }

    #[test]
    fn guess_serializes_character() {
        let json = serde_json::to_value(GameResponse::guess("Dog", false, false, true)).unwrap();
        assert_eq!(json["is_guess"], true);
        assert_eq!(json["character"], "Dog");
        assert_eq!(json["is_second_guess"], false);
    }

    #[test]
    fn learned_omits_absent_animal() {
        let json = serde_json::to_value(GameResponse::learned(LearnStatus::Ok, None)).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.get("animal_added").is_none());
    }

    #[test]
    fn learned_includes_added_animal() {
        let json =
            serde_json::to_value(GameResponse::learned(LearnStatus::Done, Some("Wolf".into())))
                .unwrap();
        assert_eq!(json["status"], "done");
        assert_eq!(json["animal_added"], "Wolf");
    }

    #[test]
    fn error_carries_code_and_message() {
        let json =
            serde_json::to_value(GameResponse::from(EngineError::NoCandidates)).unwrap();
        assert_eq!(json["code"], "NO_CANDIDATES");
        assert!(json["error"].as_str().unwrap().contains("candidate"));
    }
}
