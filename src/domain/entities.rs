//! Domain entities. Pure data structures for the core business.
//!
//! No Discord/HTTP types here — adapters map into these.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Status text used when the inference service does not send one.
pub const DEFAULT_STATUS_MESSAGE: &str = "Processing complete!";

/// Platform identity of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// DM or channel that replies are sent back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub u64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inbound attachment as announced by the platform. Bytes are fetched lazily via the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub content_type: Option<String>,
}

/// A validated upload: non-empty bytes and non-blank overlay text.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub sender: UserId,
    pub attachment_bytes: Vec<u8>,
    pub attachment_filename: String,
    pub overlay_text: String,
}

impl UploadRequest {
    /// Build a request, trimming the text. Rejects empty bytes and blank text.
    pub fn new(
        sender: UserId,
        attachment_bytes: Vec<u8>,
        attachment_filename: impl Into<String>,
        overlay_text: &str,
    ) -> Result<Self, DomainError> {
        if attachment_bytes.is_empty() {
            return Err(DomainError::MissingAttachment);
        }
        let overlay_text = overlay_text.trim();
        if overlay_text.is_empty() {
            return Err(DomainError::MissingText);
        }
        Ok(Self {
            sender,
            attachment_bytes,
            attachment_filename: attachment_filename.into(),
            overlay_text: overlay_text.to_string(),
        })
    }
}

/// Transient copy of an inbound attachment. Released by the pipeline that acquired it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryArtifact {
    pub path: PathBuf,
    pub original_filename: String,
}

/// Where the rendered image lives, as reported by the inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactRef {
    Local(PathBuf),
    Remote(String),
}

impl ArtifactRef {
    /// File name to present to the chat platform.
    pub fn file_name(&self) -> String {
        let raw = match self {
            ArtifactRef::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ArtifactRef::Remote(url) => {
                let no_query = url.split(['?', '#']).next().unwrap_or_default();
                no_query
                    .rsplit(['/', '='])
                    .next()
                    .unwrap_or_default()
                    .to_string()
            }
        };
        if raw.is_empty() {
            "result.png".to_string()
        } else {
            raw
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRef::Local(path) => write!(f, "{}", path.display()),
            ArtifactRef::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Interpreted outcome of one inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceResult {
    Success {
        rendered: ArtifactRef,
        status_message: String,
    },
    /// The service answered with a shape we do not recognize.
    Malformed { raw_payload: String },
}

/// Plain reply, optionally carrying the rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub attachment: Option<ArtifactRef>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(text: impl Into<String>, attachment: ArtifactRef) -> Self {
        Self {
            text: text.into(),
            attachment: Some(attachment),
        }
    }
}

/// Embed-style message (welcome, instructions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}
