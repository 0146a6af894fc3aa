//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    Attachment, ConversationId, DomainError, InferenceResult, Notice, Reply, TemporaryArtifact,
};

/// Transient storage for inbound attachments.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `bytes` to a fresh, uniquely named location derived from `filename`.
    ///
    /// Two concurrent calls with the same filename never share a location.
    async fn acquire(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<TemporaryArtifact, DomainError>;

    /// Remove the artifact's storage. Idempotent; never fails.
    async fn release(&self, artifact: &TemporaryArtifact);

    /// Blocking `release` for cleanup that cannot await (unwinding, dropped futures).
    fn discard(&self, artifact: &TemporaryArtifact);
}

/// Remote image-processing service.
#[async_trait::async_trait]
pub trait InferencePort: Send + Sync {
    /// Single call with the `image` and `text` parameters. No retries.
    ///
    /// Returns `DomainError::RemoteCall` on network errors and non-success responses.
    async fn invoke(
        &self,
        artifact: &TemporaryArtifact,
        text: &str,
    ) -> Result<InferenceResult, DomainError>;
}

/// Chat platform I/O used by the use cases.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// Fetch the raw bytes of an inbound attachment.
    async fn download_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, DomainError>;

    /// Send a text reply, with the referenced file attached when present.
    async fn send_reply(
        &self,
        conversation: ConversationId,
        reply: &Reply,
    ) -> Result<(), DomainError>;

    /// Send an embed-style notice.
    async fn send_notice(
        &self,
        conversation: ConversationId,
        notice: &Notice,
    ) -> Result<(), DomainError>;
}
