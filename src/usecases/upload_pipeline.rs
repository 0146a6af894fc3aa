//! Upload command pipeline: validate -> fetch attachment -> acquire artifact -> inference ->
//! release artifact -> reply.
//!
//! - Validation short-circuits: missing attachment first, then missing text
//! - Only the first attachment is processed; non-images and oversize files are refused
//!   before download
//! - The temporary artifact is released on every path, including timeouts, adapter panics
//!   and a dropped `handle_upload` future
//! - Every failure ends as a reply; nothing escapes `handle_upload`

use crate::domain::{
    Attachment, DomainError, InferenceResult, Reply, TemporaryArtifact, UploadRequest, UserId,
};
use crate::ports::{ArtifactStore, ChatGateway, InferencePort};
use futures::FutureExt;
use scopeguard::ScopeGuard;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default bound on a single inference call.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Largest attachment accepted (Discord's default upload limit).
pub const MAX_ATTACHMENT_BYTES: u64 = 25 * 1024 * 1024;

/// Upload pipeline. Stateless between invocations; safe to share across tasks.
pub struct UploadPipeline {
    gateway: Arc<dyn ChatGateway>,
    store: Arc<dyn ArtifactStore>,
    inference: Arc<dyn InferencePort>,
    timeout: Duration,
    command_prefix: String,
}

impl UploadPipeline {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        store: Arc<dyn ArtifactStore>,
        inference: Arc<dyn InferencePort>,
        timeout: Duration,
        command_prefix: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            store,
            inference,
            timeout,
            command_prefix: command_prefix.into(),
        }
    }

    /// Run one `upload` command and turn its outcome into the reply for the user.
    pub async fn handle_upload(
        &self,
        sender: UserId,
        attachments: &[Attachment],
        overlay_text_raw: Option<&str>,
    ) -> Reply {
        let filename = attachments
            .first()
            .map(|a| a.filename.as_str())
            .unwrap_or_default();
        let text = overlay_text_raw.unwrap_or_default();

        match self.run(sender, attachments, overlay_text_raw).await {
            Ok(InferenceResult::Success {
                rendered,
                status_message,
            }) => {
                info!(%sender, filename, rendered = %rendered, "upload processed");
                Reply::with_attachment(status_message, rendered)
            }
            Ok(InferenceResult::Malformed { raw_payload }) => {
                warn!(%sender, filename, text, payload = %raw_payload, "unexpected inference response format");
                Reply::text(format!("Unexpected response format: {}", raw_payload))
            }
            Err(e) if e.is_user_error() => {
                info!(%sender, error = %e, "upload rejected");
                Reply::text(e.user_message(&self.command_prefix))
            }
            Err(e) => {
                error!(%sender, filename, text, error = %e, "error processing upload command");
                Reply::text(e.user_message(&self.command_prefix))
            }
        }
    }

    /// Validation and processing without reply conversion.
    async fn run(
        &self,
        sender: UserId,
        attachments: &[Attachment],
        overlay_text_raw: Option<&str>,
    ) -> Result<InferenceResult, DomainError> {
        let attachment = attachments.first().ok_or(DomainError::MissingAttachment)?;
        let text = overlay_text_raw
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DomainError::MissingText)?;
        check_attachment(attachment)?;

        if attachments.len() > 1 {
            debug!(
                %sender,
                ignored = attachments.len() - 1,
                "only the first attachment is processed"
            );
        }

        let bytes = self.gateway.download_attachment(attachment).await?;
        let request = UploadRequest::new(sender, bytes, attachment.filename.as_str(), text)?;
        self.process(&request).await
    }

    /// Acquire the artifact, call the inference service, release the artifact.
    pub async fn process(&self, request: &UploadRequest) -> Result<InferenceResult, DomainError> {
        let artifact = self
            .store
            .acquire(&request.attachment_bytes, &request.attachment_filename)
            .await?;
        info!(
            sender = %request.sender,
            path = %artifact.path.display(),
            text = %request.overlay_text,
            "image saved temporarily"
        );

        // Fires only if this future is dropped before the release below completes.
        let artifact = scopeguard::guard(artifact, |artifact| {
            warn!(path = %artifact.path.display(), "upload abandoned; discarding temporary image");
            self.store.discard(&artifact);
        });

        let outcome = self.invoke_bounded(&artifact, &request.overlay_text).await;

        self.store.release(&artifact).await;
        let artifact = ScopeGuard::into_inner(artifact);
        debug!(path = %artifact.path.display(), "temporary image released");

        outcome
    }

    async fn invoke_bounded(
        &self,
        artifact: &TemporaryArtifact,
        text: &str,
    ) -> Result<InferenceResult, DomainError> {
        let call = AssertUnwindSafe(self.inference.invoke(artifact, text)).catch_unwind();
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(DomainError::Internal(format!(
                "inference panicked: {}",
                panic_message(panic.as_ref())
            ))),
            Err(_) => Err(DomainError::RemoteCall(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

/// Refuse attachments the platform already tells us are not images or are too large.
fn check_attachment(attachment: &Attachment) -> Result<(), DomainError> {
    if attachment.size > MAX_ATTACHMENT_BYTES {
        return Err(DomainError::UnsupportedAttachment(format!(
            "{} is larger than {} MiB",
            attachment.filename,
            MAX_ATTACHMENT_BYTES / (1024 * 1024)
        )));
    }
    match attachment.content_type.as_deref() {
        Some(kind) if !kind.starts_with("image/") => Err(DomainError::UnsupportedAttachment(
            format!("{} is {}", attachment.filename, kind),
        )),
        _ => Ok(()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
