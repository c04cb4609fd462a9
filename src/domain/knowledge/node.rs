//! Tree nodes and guessable entities.
//!
//! A node is either a question with two children or a leaf holding one
//! entity. The variant is matched exhaustively at every consumption site;
//! there is no "maybe a child" state. A dangling child id is a data
//! integrity fault surfaced as `CorruptTree` by the engines.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Answer, NodeId, ValidationError};

use super::schema::AttributeSchema;

/// A guessable entity and its boolean attribute vector.
///
/// Attributes missing from the map are treated as `false`, matching the
/// zero-fill the original dataset applied to unknown cells. A fully
/// learned entity has an explicit value for every schema attribute; only
/// a draft under construction may be partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    attributes: BTreeMap<String, bool>,
}

impl Entity {
    /// Creates an entity with an empty attribute vector.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("entity"));
        }
        Ok(Self {
            name,
            attributes: BTreeMap::new(),
        })
    }

    /// Creates an entity with the given attribute vector.
    pub fn with_attributes(
        name: impl Into<String>,
        attributes: BTreeMap<String, bool>,
    ) -> Result<Self, ValidationError> {
        let mut entity = Self::new(name)?;
        entity.attributes = attributes;
        Ok(entity)
    }

    /// Returns the entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this entity's name matches, case-insensitively.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    /// Returns the recorded value for an attribute, if any.
    pub fn attribute(&self, name: &str) -> Option<bool> {
        self.attributes.get(name).copied()
    }

    /// Returns the attribute value, defaulting missing entries to false.
    pub fn value_or_default(&self, name: &str) -> bool {
        self.attributes.get(name).copied().unwrap_or(false)
    }

    /// Records an attribute value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: bool) {
        self.attributes.insert(name.into(), value);
    }

    /// Returns the full attribute map.
    pub fn attributes(&self) -> &BTreeMap<String, bool> {
        &self.attributes
    }

    /// Counts the schema attributes on which this entity agrees with
    /// another, missing values defaulting to false on both sides.
    pub fn agreement_with(&self, other: &Entity, schema: &AttributeSchema) -> usize {
        schema
            .iter()
            .filter(|attr| {
                self.value_or_default(attr.name()) == other.value_or_default(attr.name())
            })
            .count()
    }
}

/// A node in the knowledge tree: an internal yes/no question or a
/// terminal guessable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Question {
        /// Schema attribute this question asks about.
        attribute: String,
        /// Question text shown to the player.
        text: String,
        /// Child for a "yes" answer.
        yes: NodeId,
        /// Child for a "no" answer.
        no: NodeId,
    },
    Leaf(Entity),
}

impl Node {
    /// Returns true for leaf nodes.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the entity if this is a leaf.
    pub fn as_leaf(&self) -> Option<&Entity> {
        match self {
            Node::Leaf(entity) => Some(entity),
            Node::Question { .. } => None,
        }
    }

    /// Returns the child selected by an answer, for question nodes.
    pub fn child(&self, answer: Answer) -> Option<NodeId> {
        match self {
            Node::Question { yes, no, .. } => Some(match answer {
                Answer::Yes => *yes,
                Answer::No => *no,
            }),
            Node::Leaf(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> AttributeSchema {
        AttributeSchema::from_names(["IsMammal", "CanFly", "HasFur"]).unwrap()
    }

    #[test]
    fn entity_rejects_blank_name() {
        assert!(Entity::new("   ").is_err());
    }

    #[test]
    fn entity_name_is_trimmed() {
        let entity = Entity::new("  Dog ").unwrap();
        assert_eq!(entity.name(), "Dog");
    }

    #[test]
    fn is_named_matches_case_insensitively() {
        let entity = Entity::new("Dog").unwrap();
        assert!(entity.is_named("dog"));
        assert!(entity.is_named(" DOG "));
        assert!(!entity.is_named("Cat"));
    }

    #[test]
    fn missing_attribute_defaults_to_false() {
        let entity = Entity::new("Dog").unwrap();
        assert_eq!(entity.attribute("IsMammal"), None);
        assert!(!entity.value_or_default("IsMammal"));
    }

    #[test]
    fn set_attribute_records_value() {
        let mut entity = Entity::new("Dog").unwrap();
        entity.set_attribute("IsMammal", true);
        assert_eq!(entity.attribute("IsMammal"), Some(true));
    }

    #[test]
    fn agreement_counts_matching_schema_attributes() {
        let mut dog = Entity::new("Dog").unwrap();
        dog.set_attribute("IsMammal", true);
        dog.set_attribute("CanFly", false);
        dog.set_attribute("HasFur", true);

        let mut bat = Entity::new("Bat").unwrap();
        bat.set_attribute("IsMammal", true);
        bat.set_attribute("CanFly", true);
        bat.set_attribute("HasFur", true);

        assert_eq!(dog.agreement_with(&bat, &schema()), 2);
    }

    #[test]
    fn agreement_defaults_missing_values_to_false() {
        let dog = Entity::new("Dog").unwrap();
        let mut bat = Entity::new("Bat").unwrap();
        bat.set_attribute("CanFly", true);

        // Both default IsMammal and HasFur to false; CanFly differs.
        assert_eq!(dog.agreement_with(&bat, &schema()), 2);
    }

    #[test]
    fn question_child_follows_answer() {
        let node = Node::Question {
            attribute: "IsMammal".to_string(),
            text: "Is it a mammal?".to_string(),
            yes: NodeId::from_raw(1),
            no: NodeId::from_raw(2),
        };
        assert_eq!(node.child(Answer::Yes), Some(NodeId::from_raw(1)));
        assert_eq!(node.child(Answer::No), Some(NodeId::from_raw(2)));
    }

    #[test]
    fn leaf_has_no_children() {
        let node = Node::Leaf(Entity::new("Dog").unwrap());
        assert!(node.is_leaf());
        assert_eq!(node.child(Answer::Yes), None);
        assert_eq!(node.as_leaf().unwrap().name(), "Dog");
    }
}
