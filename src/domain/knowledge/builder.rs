//! Initial tree construction from a dataset.
//!
//! Greedy recursive partitioning: at each step the splitter picks the
//! attribute whose yes/no partition of the remaining entities is most
//! even (smallest larger half), breaking ties by schema order. The result
//! is deterministic for a given dataset.

use super::node::Entity;
use super::schema::AttributeSchema;

/// A freshly built subtree, not yet flattened into the node arena.
#[derive(Debug, Clone)]
pub(crate) enum BuiltNode {
    Question {
        attribute: String,
        yes: Box<BuiltNode>,
        no: Box<BuiltNode>,
    },
    Leaf(Entity),
}

/// Builds a decision tree over the given entities.
///
/// A single entity becomes a leaf. A set that no attribute can separate
/// collapses to a leaf of its first entity in dataset order; the rest
/// are indistinguishable with the current schema and stay reachable only
/// through learning.
pub(crate) fn build_tree(schema: &AttributeSchema, entities: &[Entity]) -> BuiltNode {
    if entities.len() <= 1 {
        let entity = entities
            .first()
            .cloned()
            .unwrap_or_else(|| Entity::new("Unknown").expect("constant name is valid"));
        return BuiltNode::Leaf(entity);
    }

    match best_split(schema, entities) {
        Some(attribute) => {
            let (yes, no): (Vec<Entity>, Vec<Entity>) = entities
                .iter()
                .cloned()
                .partition(|e| e.value_or_default(&attribute));
            BuiltNode::Question {
                attribute,
                yes: Box::new(build_tree(schema, &yes)),
                no: Box::new(build_tree(schema, &no)),
            }
        }
        None => BuiltNode::Leaf(entities[0].clone()),
    }
}

/// Picks the attribute that bisects the entity set most evenly.
///
/// Only attributes that actually split the set (both partitions
/// non-empty) qualify; ties keep the earliest attribute in schema order.
fn best_split(schema: &AttributeSchema, entities: &[Entity]) -> Option<String> {
    let mut best: Option<(usize, String)> = None;
    for attr in schema.iter() {
        let yes = entities
            .iter()
            .filter(|e| e.value_or_default(attr.name()))
            .count();
        let no = entities.len() - yes;
        if yes == 0 || no == 0 {
            continue;
        }
        let score = yes.max(no);
        if best.as_ref().map(|(s, _)| score < *s).unwrap_or(true) {
            best = Some((score, attr.name().to_string()));
        }
    }
    best.map(|(_, name)| name)
}
