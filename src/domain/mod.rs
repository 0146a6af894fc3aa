//! Core domain layer. No external I/O dependencies.
//!
//! Entities and the error taxonomy live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    ArtifactRef, Attachment, ConversationId, DEFAULT_STATUS_MESSAGE, InferenceResult, Notice,
    Reply, TemporaryArtifact, UploadRequest, UserId,
};
pub use errors::{DomainError, GENERIC_PROCESSING_ERROR};
