//! Attribute schema: the ordered vocabulary of yes/no properties.
//!
//! Attribute names are CamelCase machine names (`IsMammal`, `HasFur`);
//! each carries the question text shown to the player. Insertion order is
//! significant: it drives the order in which a new entity is interrogated
//! during attribute filling, and it is the deterministic tie-break for
//! every ranking in the engine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EngineError, ValidationError};

/// Phrase substitutions applied when rendering an attribute name as a
/// question (`IsFoundInAfrica` -> "Is it found in Africa?").
const PHRASE_FIXUPS: &[(&str, &str)] = &[
    ("BeDomesticated", "be domesticated"),
    ("FoundInAfrica", "found in Africa"),
    ("Carnivore", "carnivorous"),
    ("Herbivore", "herbivorous"),
    ("Mammal", "a mammal"),
    ("Pet", "a pet"),
];

/// A single yes/no attribute: machine name plus rendered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    question: String,
}

impl Attribute {
    /// Creates an attribute from its CamelCase machine name, synthesizing
    /// the question text from the `Is`/`Can`/`Has` prefix convention.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("attribute"));
        }
        let question = synthesize_question(&name);
        Ok(Self { name, question })
    }

    /// Creates an attribute from free-text question wording, deriving the
    /// machine name from the `is it` / `can it` / `does it have` patterns
    /// (or a CamelCase sanitization of the words when none matches).
    /// The player's wording is kept as the question text.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the question is blank
    /// - `InvalidFormat` if no attribute name can be derived
    pub fn from_question(question: &str) -> Result<Self, ValidationError> {
        let trimmed = question.trim().trim_end_matches('?').trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("question"));
        }

        let lower = trimmed.to_lowercase();
        let name = if let Some(rest) = lower.strip_prefix("is it ") {
            format!("Is{}", camel_case(rest))
        } else if let Some(rest) = lower.strip_prefix("can it ") {
            format!("Can{}", camel_case(rest))
        } else if let Some(rest) = lower.strip_prefix("does it have ") {
            format!("Has{}", camel_case(rest))
        } else {
            camel_case(&lower)
        };
        if name.is_empty() || name == "Is" || name == "Can" || name == "Has" {
            return Err(ValidationError::invalid_format(
                "question",
                "no attribute name could be derived",
            ));
        }

        Ok(Self {
            name,
            question: format!("{}?", trimmed),
        })
    }

    /// Returns the machine name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the question text shown to the player.
    pub fn question(&self) -> &str {
        &self.question
    }
}

/// Renders an attribute machine name as player-facing question text.
fn synthesize_question(name: &str) -> String {
    let (prefix, rest) = if let Some(rest) = name.strip_prefix("Is") {
        ("Is it", rest)
    } else if let Some(rest) = name.strip_prefix("Can") {
        ("Can it", rest)
    } else if let Some(rest) = name.strip_prefix("Has") {
        ("Does it have", rest)
    } else {
        ("Is it", name)
    };

    let phrase = PHRASE_FIXUPS
        .iter()
        .find(|(from, _)| *from == rest)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| split_camel_words(rest));

    format!("{} {}?", prefix, phrase)
}

/// Splits `FoundInAfrica` into `found in africa`-style lowercase words.
fn split_camel_words(camel: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for ch in camel.chars() {
        if ch.is_uppercase() || words.is_empty() {
            words.push(String::new());
        }
        if let Some(word) = words.last_mut() {
            word.extend(ch.to_lowercase());
        }
    }
    words.join(" ")
}

/// Joins free-text words into a CamelCase name, skipping a leading
/// article and any non-alphanumeric characters.
fn camel_case(words: &str) -> String {
    words
        .split_whitespace()
        .enumerate()
        .filter(|(i, w)| !(*i == 0 && (*w == "a" || *w == "an" || *w == "the")))
        .map(|(_, w)| {
            let clean: String = w.chars().filter(|c| c.is_alphanumeric()).collect();
            let mut chars = clean.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Ordered collection of attributes shared by all entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSchema {
    attributes: Vec<Attribute>,
}

impl AttributeSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schema from machine names, preserving order.
    ///
    /// # Errors
    ///
    /// - `EmptyField` on a blank name
    pub fn from_names<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::new();
        for name in names {
            let attr = Attribute::new(name)?;
            if schema.get(attr.name()).is_some() {
                return Err(ValidationError::invalid_format(
                    "attribute",
                    format!("duplicate attribute '{}'", attr.name()),
                ));
            }
            schema.attributes.push(attr);
        }
        Ok(schema)
    }

    /// Appends an attribute at the end of the schema.
    ///
    /// # Errors
    ///
    /// - `AttributeExists` on a case-insensitive name collision
    pub fn add(&mut self, attribute: Attribute) -> Result<(), EngineError> {
        if self.get(attribute.name()).is_some() {
            return Err(EngineError::AttributeExists(attribute.name().to_string()));
        }
        self.attributes.push(attribute);
        Ok(())
    }

    /// Looks up an attribute by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Returns the attribute at a schema position.
    pub fn at(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Iterates attributes in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
