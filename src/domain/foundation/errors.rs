//! Error types for the domain layer.
//!
//! The taxonomy mirrors the protocol contract: validation failures and
//! state errors are surfaced to the caller with no mutation, integrity
//! faults are fatal to the current request only, and conflicts abort a
//! learning mutation atomically.

use serde::Serialize;
use std::error::Error;
use std::fmt;
use thiserror::Error;

use super::{NodeId, SessionId};

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Machine-readable error codes, organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // State errors
    NoHistory,
    WrongMode,
    NoCandidates,
    SessionNotFound,

    // Data integrity errors
    CorruptTree,
    NodeNotFound,

    // Conflict errors
    DuplicateEntity,
    SameEntity,
    AmbiguousQuestion,
    AttributeExists,
    UnknownEntity,

    // Infrastructure errors
    DatasetIo,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::NoHistory => "NO_HISTORY",
            ErrorCode::WrongMode => "WRONG_MODE",
            ErrorCode::NoCandidates => "NO_CANDIDATES",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::CorruptTree => "CORRUPT_TREE",
            ErrorCode::NodeNotFound => "NODE_NOT_FOUND",
            ErrorCode::DuplicateEntity => "DUPLICATE_ENTITY",
            ErrorCode::SameEntity => "SAME_ENTITY",
            ErrorCode::AmbiguousQuestion => "AMBIGUOUS_QUESTION",
            ErrorCode::AttributeExists => "ATTRIBUTE_EXISTS",
            ErrorCode::UnknownEntity => "UNKNOWN_ENTITY",
            ErrorCode::DatasetIo => "DATASET_IO",
        };
        write!(f, "{}", s)
    }
}

/// Engine-level errors surfaced to the protocol layer.
///
/// Every engine call returns either a valid prompt or exactly one of
/// these; no error is silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Request field missing or malformed.
    Validation(ValidationError),
    /// History stack is empty; nothing to go back to.
    NoHistory,
    /// The session is not in a mode that accepts this operation.
    WrongMode { operation: String, mode: String },
    /// Refinement has no candidate entities to search.
    NoCandidates,
    /// Unknown session identifier.
    SessionNotFound(SessionId),
    /// A node reference resolved to nothing; the tree is inconsistent.
    CorruptTree(NodeId),
    /// A node reference is stale (replaced or never allocated).
    NodeNotFound(NodeId),
    /// An entity with this name already exists (case-insensitive).
    DuplicateEntity(String),
    /// The correct answer equals the wrong guess; nothing to learn.
    SameEntity(String),
    /// The distinguishing question is empty.
    AmbiguousQuestion,
    /// An attribute with this name already exists (case-insensitive).
    AttributeExists(String),
    /// The named entity is not in the knowledge base.
    UnknownEntity(String),
    /// Dataset file could not be read or written.
    DatasetIo(String),
}

impl EngineError {
    pub fn wrong_mode(operation: impl Into<String>, mode: impl fmt::Debug) -> Self {
        EngineError::WrongMode {
            operation: operation.into(),
            mode: format!("{:?}", mode),
        }
    }

    pub fn duplicate_entity(name: impl Into<String>) -> Self {
        EngineError::DuplicateEntity(name.into())
    }

    pub fn same_entity(name: impl Into<String>) -> Self {
        EngineError::SameEntity(name.into())
    }

    pub fn unknown_entity(name: impl Into<String>) -> Self {
        EngineError::UnknownEntity(name.into())
    }

    pub fn dataset_io(message: impl Into<String>) -> Self {
        EngineError::DatasetIo(message.into())
    }

    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation(_) => ErrorCode::ValidationFailed,
            EngineError::NoHistory => ErrorCode::NoHistory,
            EngineError::WrongMode { .. } => ErrorCode::WrongMode,
            EngineError::NoCandidates => ErrorCode::NoCandidates,
            EngineError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            EngineError::CorruptTree(_) => ErrorCode::CorruptTree,
            EngineError::NodeNotFound(_) => ErrorCode::NodeNotFound,
            EngineError::DuplicateEntity(_) => ErrorCode::DuplicateEntity,
            EngineError::SameEntity(_) => ErrorCode::SameEntity,
            EngineError::AmbiguousQuestion => ErrorCode::AmbiguousQuestion,
            EngineError::AttributeExists(_) => ErrorCode::AttributeExists,
            EngineError::UnknownEntity(_) => ErrorCode::UnknownEntity,
            EngineError::DatasetIo(_) => ErrorCode::DatasetIo,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> String {
        match self {
            EngineError::Validation(err) => err.to_string(),
            EngineError::NoHistory => "Already at the first question".to_string(),
            EngineError::WrongMode { operation, mode } => {
                format!("Cannot {} while session is {}", operation, mode)
            }
            EngineError::NoCandidates => "No candidate entities left to search".to_string(),
            EngineError::SessionNotFound(id) => format!("Session not found: {}", id),
            EngineError::CorruptTree(id) => {
                format!("Knowledge tree is inconsistent at {}", id)
            }
            EngineError::NodeNotFound(id) => format!("Node not found: {}", id),
            EngineError::DuplicateEntity(name) => {
                format!("An entity named '{}' already exists", name)
            }
            EngineError::SameEntity(name) => {
                format!("'{}' is the guess that was rejected; nothing to learn", name)
            }
            EngineError::AmbiguousQuestion => {
                "A distinguishing question is required".to_string()
            }
            EngineError::AttributeExists(name) => {
                format!("An attribute named '{}' already exists", name)
            }
            EngineError::UnknownEntity(name) => format!("Unknown entity: '{}'", name),
            EngineError::DatasetIo(msg) => format!("Dataset error: {}", msg),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl Error for EngineError {}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Validation(err)
    }
}
