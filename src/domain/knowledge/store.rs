//! The knowledge store: node arena, schema, and entity registry.
//!
//! # Ownership
//!
//! The store is process-wide shared state. Sessions reference nodes by
//! `NodeId`, never by ownership; `replace_node` swaps the subtree rooted
//! at an existing id without reassigning identifiers of unrelated nodes,
//! so stale references into untouched parts of the tree stay valid.
//!
//! # Concurrency
//!
//! `SharedKnowledge` wraps the store in an `Arc<RwLock>`: reads run
//! concurrently, mutations take the single write guard for their whole
//! duration, so a traversing session observes either the pre-split leaf
//! or the fully formed post-split question node, never a half-written
//! state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{EngineError, NodeId};

use super::builder::{build_tree, BuiltNode};
use super::dataset::Dataset;
use super::node::{Entity, Node};
use super::schema::{Attribute, AttributeSchema};

/// Owns the decision tree, the attribute schema, and the entity registry.
#[derive(Debug)]
pub struct KnowledgeStore {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    schema: AttributeSchema,
    entities: Vec<Entity>,
}

impl KnowledgeStore {
    /// Builds a store from a dataset, constructing the initial tree.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let (schema, entities) = dataset.into_parts();
        let mut store = Self {
            nodes: HashMap::new(),
            root: NodeId::from_raw(0),
            next_id: 0,
            schema,
            entities,
        };
        let built = build_tree(&store.schema, &store.entities);
        store.root = store.flatten(built);
        store
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    fn flatten(&mut self, built: BuiltNode) -> NodeId {
        match built {
            BuiltNode::Leaf(entity) => self.insert_node(Node::Leaf(entity)),
            BuiltNode::Question { attribute, yes, no } => {
                let yes = self.flatten(*yes);
                let no = self.flatten(*no);
                let text = self
                    .schema
                    .get(&attribute)
                    .map(|a| a.question().to_string())
                    .unwrap_or_else(|| format!("{}?", attribute));
                self.insert_node(Node::Question {
                    attribute,
                    text,
                    yes,
                    no,
                })
            }
        }
    }

    /// Returns the root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Resolves a node reference.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` for a stale or never-allocated id
    pub fn node(&self, id: NodeId) -> Result<&Node, EngineError> {
        self.nodes.get(&id).ok_or(EngineError::NodeNotFound(id))
    }

    /// Inserts a detached node and returns its fresh id.
    pub fn insert_node(&mut self, node: Node) -> NodeId {
        let id = self.alloc();
        self.nodes.insert(id, node);
        id
    }

    /// Replaces the node stored at an existing id with a new subtree
    /// root. Identifiers of all other nodes are untouched.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the id was never allocated
    pub fn replace_node(&mut self, id: NodeId, node: Node) -> Result<(), EngineError> {
        match self.nodes.get_mut(&id) {
            Some(slot) => {
                tracing::debug!(%id, "replacing node");
                *slot = node;
                Ok(())
            }
            None => Err(EngineError::NodeNotFound(id)),
        }
    }

    /// Registers a new entity and creates a detached leaf node for it.
    /// Missing schema attributes are filled in as false so the stored
    /// vector is complete.
    ///
    /// # Errors
    ///
    /// - `DuplicateEntity` on a case-insensitive name collision; the
    ///   store is left unchanged
    pub fn append_leaf(&mut self, mut entity: Entity) -> Result<NodeId, EngineError> {
        if self.entities.iter().any(|e| e.is_named(entity.name())) {
            return Err(EngineError::duplicate_entity(entity.name()));
        }
        for attr in self.schema.iter() {
            if entity.attribute(attr.name()).is_none() {
                entity.set_attribute(attr.name(), false);
            }
        }
        tracing::debug!(entity = entity.name(), "appending leaf");
        self.entities.push(entity.clone());
        Ok(self.insert_node(Node::Leaf(entity)))
    }

    /// Returns the attribute schema.
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Appends a new attribute to the schema. Every known entity (and
    /// every leaf copy) defaults the new attribute to false.
    ///
    /// # Errors
    ///
    /// - `AttributeExists` on a case-insensitive name collision
    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<(), EngineError> {
        let name = attribute.name().to_string();
        self.schema.add(attribute)?;
        for entity in &mut self.entities {
            if entity.attribute(&name).is_none() {
                entity.set_attribute(&name, false);
            }
        }
        for node in self.nodes.values_mut() {
            if let Node::Leaf(entity) = node {
                if entity.attribute(&name).is_none() {
                    entity.set_attribute(&name, false);
                }
            }
        }
        tracing::debug!(attribute = %name, "schema attribute added");
        Ok(())
    }

    /// Records an attribute value on a registered entity and on every
    /// leaf node holding a copy of it.
    ///
    /// # Errors
    ///
    /// - `UnknownEntity` if no entity has that name
    pub fn set_entity_attribute(
        &mut self,
        entity_name: &str,
        attribute: &str,
        value: bool,
    ) -> Result<(), EngineError> {
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.is_named(entity_name))
            .ok_or_else(|| EngineError::unknown_entity(entity_name))?;
        entity.set_attribute(attribute, value);

        for node in self.nodes.values_mut() {
            if let Node::Leaf(leaf) = node {
                if leaf.is_named(entity_name) {
                    leaf.set_attribute(attribute, value);
                }
            }
        }
        Ok(())
    }

    /// Looks up a registered entity by name, case-insensitively.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_named(name))
    }

    /// Returns all registered entities in canonical (dataset) order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Finds the leaf for an entity reachable from the root, if any.
    pub fn find_leaf(&self, name: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.nodes.get(&id)? {
                Node::Leaf(entity) if entity.is_named(name) => return Some(id),
                Node::Leaf(_) => {}
                Node::Question { yes, no, .. } => {
                    stack.push(*yes);
                    stack.push(*no);
                }
            }
        }
        None
    }

    /// Reconstructs the tree from the current schema and entity table
    /// and repoints the root at it. New nodes get fresh identifiers;
    /// previously allocated nodes stay resident, so sessions holding
    /// ids into the old tree keep resolving them.
    pub fn rebuild(&mut self) {
        let built = build_tree(&self.schema, &self.entities);
        self.root = self.flatten(built);
        tracing::debug!(root = %self.root, "tree rebuilt");
    }

    /// Returns a persistable snapshot of the schema and entity table.
    pub fn to_dataset(&self) -> Dataset {
        Dataset::new(self.schema.clone(), self.entities.clone())
    }
}

/// Cloneable handle to the process-wide knowledge store.
#[derive(Debug, Clone)]
pub struct SharedKnowledge {
    inner: Arc<RwLock<KnowledgeStore>>,
}

impl SharedKnowledge {
    /// Wraps a store for shared access.
    pub fn new(store: KnowledgeStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Builds a shared store directly from a dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self::new(KnowledgeStore::from_dataset(dataset))
    }

    /// Acquires a read guard. Multiple readers run concurrently.
    pub fn read(&self) -> RwLockReadGuard<'_, KnowledgeStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the single write guard, serializing mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, KnowledgeStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
