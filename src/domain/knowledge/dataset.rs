//! Dataset persistence: the schema plus every known entity.
//!
//! The on-disk shape is plain JSON. Loading falls back to a built-in
//! starter dataset when the file is missing or unreadable, so a fresh
//! deployment always has something to play against; saving rewrites the
//! whole file after each successful learning mutation.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::foundation::EngineError;

use super::node::Entity;
use super::schema::AttributeSchema;

/// Starter knowledge: 8 animals over 13 attributes.
/// Row order is significant: it is the canonical tie-break order.
const STARTER_ATTRIBUTES: [&str; 13] = [
    "IsMammal",
    "CanFly",
    "IsAquatic",
    "IsPet",
    "IsCarnivore",
    "IsFoundInAfrica",
    "IsLarge",
    "HasFur",
    "CanBeDomesticated",
    "IsDangerous",
    "IsHerbivore",
    "HasWings",
    "IsNocturnal",
];

const STARTER_ANIMALS: [(&str, [u8; 13]); 8] = [
    ("Dog", [1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0]),
    ("Cat", [1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1]),
    ("Lion", [1, 0, 0, 0, 1, 1, 1, 1, 0, 1, 0, 0, 1]),
    ("Eagle", [0, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 0]),
    ("Shark", [0, 0, 1, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0]),
    ("Elephant", [1, 0, 0, 0, 0, 1, 1, 0, 0, 0, 1, 0, 0]),
    ("Frog", [0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1]),
    ("Bat", [1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1]),
];

static FALLBACK: Lazy<Dataset> = Lazy::new(|| {
    let schema = AttributeSchema::from_names(STARTER_ATTRIBUTES)
        .expect("starter attribute names are valid");
    let entities = STARTER_ANIMALS
        .iter()
        .map(|(name, row)| {
            let attributes: BTreeMap<String, bool> = STARTER_ATTRIBUTES
                .iter()
                .zip(row.iter())
                .map(|(attr, v)| ((*attr).to_string(), *v == 1))
                .collect();
            Entity::with_attributes(*name, attributes).expect("starter animal names are valid")
        })
        .collect();
    Dataset { schema, entities }
});

/// Serializable container for everything the engine must persist between
/// process restarts: the attribute schema and the entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    schema: AttributeSchema,
    entities: Vec<Entity>,
}

impl Dataset {
    /// Creates a dataset from parts, dropping entities whose name
    /// collides case-insensitively with an earlier one (first wins).
    pub fn new(schema: AttributeSchema, entities: Vec<Entity>) -> Self {
        let mut deduped: Vec<Entity> = Vec::with_capacity(entities.len());
        for entity in entities {
            if !deduped.iter().any(|e| e.is_named(entity.name())) {
                deduped.push(entity);
            }
        }
        Self {
            schema,
            entities: deduped,
        }
    }

    /// Returns the built-in starter dataset.
    pub fn fallback() -> Self {
        FALLBACK.clone()
    }

    /// Loads a dataset from a JSON file, falling back to the starter
    /// dataset if the file is missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(dataset) => {
                tracing::info!(path = %path.display(), entities = dataset.entities.len(), "dataset loaded");
                dataset
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "falling back to starter dataset");
                Self::fallback()
            }
        }
    }

    /// Loads a dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// - `DatasetIo` if the file cannot be read or parsed
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path.as_ref())
            .map_err(|e| EngineError::dataset_io(e.to_string()))?;
        let parsed: Dataset =
            serde_json::from_str(&raw).map_err(|e| EngineError::dataset_io(e.to_string()))?;
        Ok(Self::new(parsed.schema, parsed.entities))
    }

    /// Writes the dataset to a JSON file.
    ///
    /// # Errors
    ///
    /// - `DatasetIo` if the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::dataset_io(e.to_string()))?;
        fs::write(path.as_ref(), json).map_err(|e| EngineError::dataset_io(e.to_string()))
    }

    /// Returns the attribute schema.
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Returns the entities in canonical order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Consumes the dataset into its parts.
    pub fn into_parts(self) -> (AttributeSchema, Vec<Entity>) {
        (self.schema, self.entities)
    }
}
