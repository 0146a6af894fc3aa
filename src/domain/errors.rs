//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

/// Generic message shown when local storage or platform I/O fails.
pub const GENERIC_PROCESSING_ERROR: &str = "An error occurred while processing the image.";

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("no image attached")]
    MissingAttachment,

    #[error("no overlay text provided")]
    MissingText,

    /// Attachment is not an image or is too large to process.
    #[error("unsupported attachment: {0}")]
    UnsupportedAttachment(String),

    /// Local temporary storage failed (disk full, permission denied).
    #[error("Storage error: {0}")]
    Io(String),

    /// Network error, non-success status or timeout talking to the inference service.
    #[error("Inference call failed: {0}")]
    RemoteCall(String),

    /// Chat platform I/O (attachment download, reply delivery).
    #[error("Chat gateway error: {0}")]
    Gateway(String),

    /// A component failed in a way it does not report through `Result` (a panic).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// True for mistakes in the user's command rather than failures of the bot.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DomainError::MissingAttachment
                | DomainError::MissingText
                | DomainError::UnsupportedAttachment(_)
        )
    }

    /// Text shown to the user. Internal detail stays in the log, except for remote failures
    /// whose message is what the user needs to understand what went wrong.
    pub fn user_message(&self, prefix: &str) -> String {
        match self {
            DomainError::MissingAttachment => "Please attach an image to process.".to_string(),
            DomainError::MissingText => format!(
                "Please provide text to overlay on the image. Example: `{}upload Hello World!`",
                prefix
            ),
            DomainError::UnsupportedAttachment(reason) => {
                format!("Please attach an image to process ({}).", reason)
            }
            DomainError::RemoteCall(msg) => format!(
                "An error occurred while processing the image: {}",
                msg
            ),
            DomainError::Io(_) | DomainError::Gateway(_) | DomainError::Internal(_) => {
                GENERIC_PROCESSING_ERROR.to_string()
            }
        }
    }
}
