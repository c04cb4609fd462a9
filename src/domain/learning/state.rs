//! Draft state of the attribute-filling sub-dialogue.

use crate::domain::foundation::ValidationError;
use crate::domain::knowledge::Entity;

/// Cursor over the schema while a brand-new entity's attribute vector
/// is collected one yes/no answer at a time.
#[derive(Debug, Clone)]
pub struct FillingState {
    wrong_guess: String,
    draft: Entity,
    cursor: usize,
}

impl FillingState {
    /// Starts a draft for a new entity.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if either name is blank
    pub fn new(
        wrong_guess: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let wrong_guess = wrong_guess.into().trim().to_string();
        if wrong_guess.is_empty() {
            return Err(ValidationError::empty_field("wrong_guess"));
        }
        Ok(Self {
            wrong_guess,
            draft: Entity::new(entity_name)?,
            cursor: 0,
        })
    }

    pub fn wrong_guess(&self) -> &str {
        &self.wrong_guess
    }

    pub fn entity_name(&self) -> &str {
        self.draft.name()
    }

    /// Index of the next schema attribute to ask about.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn draft(&self) -> &Entity {
        &self.draft
    }

    /// Records the value for the current attribute and advances.
    pub fn record_and_advance(&mut self, attribute: impl Into<String>, value: bool) {
        self.draft.set_attribute(attribute, value);
        self.cursor += 1;
    }

    /// Consumes the state into the completed draft entity.
    pub fn into_draft(self) -> Entity {
        self.draft
    }
}
