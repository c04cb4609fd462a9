//! Knowledge base: attribute schema, entity registry, and decision tree.

mod builder;
mod dataset;
mod node;
mod schema;
mod store;

pub use dataset::Dataset;
pub use node::{Entity, Node};
pub use schema::{Attribute, AttributeSchema};
pub use store::{KnowledgeStore, SharedKnowledge};
