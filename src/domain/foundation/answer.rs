//! Yes/no answer value object.
//!
//! Every client decision in the protocol is a plain yes or no. Parsing is
//! lenient about case and surrounding whitespace because the answer arrives
//! as free text from the transport layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// A yes/no answer to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// Returns true for `Yes`.
    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Yes)
    }

    /// Returns the boolean attribute value this answer asserts.
    pub fn as_bool(&self) -> bool {
        self.is_yes()
    }

    /// Creates an answer from a boolean attribute value.
    pub fn from_bool(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "yes"),
            Answer::No => write!(f, "no"),
        }
    }
}

impl FromStr for Answer {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            "" => Err(ValidationError::empty_field("answer")),
            other => Err(ValidationError::invalid_format(
                "answer",
                format!("expected 'yes' or 'no', got '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_yes_and_no() {
        assert_eq!("yes".parse::<Answer>().unwrap(), Answer::Yes);
        assert_eq!("no".parse::<Answer>().unwrap(), Answer::No);
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!("  YES ".parse::<Answer>().unwrap(), Answer::Yes);
        assert_eq!("No\n".parse::<Answer>().unwrap(), Answer::No);
    }

    #[test]
    fn rejects_empty_input() {
        let result = "   ".parse::<Answer>();
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn rejects_unknown_input() {
        let result = "maybe".parse::<Answer>();
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn bool_round_trip() {
        assert!(Answer::from_bool(true).as_bool());
        assert!(!Answer::from_bool(false).as_bool());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Answer::Yes).unwrap(), "\"yes\"");
        assert_eq!(serde_json::to_string(&Answer::No).unwrap(), "\"no\"");
    }
}
