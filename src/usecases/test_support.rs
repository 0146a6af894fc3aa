//! In-memory port implementations shared by the use case tests.

use crate::domain::{
    Attachment, ConversationId, DomainError, InferenceResult, Notice, Reply, TemporaryArtifact,
};
use crate::ports::{ArtifactStore, ChatGateway, InferencePort};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn attachment(filename: &str) -> Attachment {
    Attachment {
        filename: filename.to_string(),
        url: format!("https://cdn.example.com/attachments/{}", filename),
        size: 4,
        content_type: Some("image/png".to_string()),
    }
}

/// Artifact store keeping bytes in a map and counting acquire/release calls.
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    history: Mutex<Vec<Vec<u8>>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Store whose every `acquire` fails like a full disk.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    /// Bytes written by the `index`-th successful acquire.
    pub fn stored_bytes(&self, index: usize) -> Option<Vec<u8>> {
        self.history.lock().unwrap().get(index).cloned()
    }
}

#[async_trait::async_trait]
impl ArtifactStore for MemoryStore {
    async fn acquire(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<TemporaryArtifact, DomainError> {
        if self.fail {
            return Err(DomainError::Io("No space left on device".to_string()));
        }
        let path = PathBuf::from(format!("/memory/{}_{}", uuid::Uuid::new_v4(), filename));
        self.files
            .lock()
            .unwrap()
            .insert(path.clone(), bytes.to_vec());
        self.history.lock().unwrap().push(bytes.to_vec());
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(TemporaryArtifact {
            path,
            original_filename: filename.to_string(),
        })
    }

    async fn release(&self, artifact: &TemporaryArtifact) {
        self.discard(artifact);
    }

    fn discard(&self, artifact: &TemporaryArtifact) {
        self.files.lock().unwrap().remove(&artifact.path);
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// What the scripted inference service does when called.
#[derive(Clone)]
pub enum Script {
    Respond(InferenceResult),
    Fail(String),
    /// Never answers within any reasonable test timeout.
    Hang,
    /// Panics inside the call, like an adapter hitting a bug.
    Panic(&'static str),
}

#[derive(Debug, Clone)]
pub struct InferenceCall {
    pub path: PathBuf,
    pub original_filename: String,
    pub text: String,
    pub artifact_present: bool,
}

pub struct ScriptedInference {
    script: Script,
    store: Option<Arc<MemoryStore>>,
    calls: Mutex<Vec<InferenceCall>>,
}

impl ScriptedInference {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            store: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Record whether the artifact is still in `store` at call time.
    pub fn watching(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn calls(&self) -> Vec<InferenceCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl InferencePort for ScriptedInference {
    async fn invoke(
        &self,
        artifact: &TemporaryArtifact,
        text: &str,
    ) -> Result<InferenceResult, DomainError> {
        let artifact_present = self
            .store
            .as_ref()
            .is_some_and(|s| s.contains(&artifact.path));
        self.calls.lock().unwrap().push(InferenceCall {
            path: artifact.path.clone(),
            original_filename: artifact.original_filename.clone(),
            text: text.to_string(),
            artifact_present,
        });

        match &self.script {
            Script::Respond(result) => Ok(result.clone()),
            Script::Fail(msg) => Err(DomainError::RemoteCall(msg.clone())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DomainError::RemoteCall("unreachable".to_string()))
            }
            Script::Panic(msg) => panic!("{}", msg),
        }
    }
}

/// Chat gateway returning fixed attachment bytes and recording everything sent.
pub struct RecordingGateway {
    bytes: Option<Vec<u8>>,
    reject_attachments: bool,
    downloaded: Mutex<Vec<String>>,
    replies: Mutex<Vec<(ConversationId, Reply)>>,
    notices: Mutex<Vec<(ConversationId, Notice)>>,
}

impl RecordingGateway {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            reject_attachments: false,
            downloaded: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_download() -> Self {
        Self {
            bytes: None,
            ..Self::with_bytes(Vec::new())
        }
    }

    /// Gateway that cannot load rendered files; replies carrying one fail and are not recorded.
    pub fn rejecting_attachments(bytes: Vec<u8>) -> Self {
        Self {
            reject_attachments: true,
            ..Self::with_bytes(bytes)
        }
    }

    pub fn downloads(&self) -> usize {
        self.downloaded.lock().unwrap().len()
    }

    pub fn downloaded_names(&self) -> Vec<String> {
        self.downloaded.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<(ConversationId, Reply)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<(ConversationId, Notice)> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatGateway for RecordingGateway {
    async fn download_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, DomainError> {
        self.downloaded
            .lock()
            .unwrap()
            .push(attachment.filename.clone());
        self.bytes
            .clone()
            .ok_or_else(|| DomainError::Gateway("attachment download failed: 404".to_string()))
    }

    async fn send_reply(
        &self,
        conversation: ConversationId,
        reply: &Reply,
    ) -> Result<(), DomainError> {
        if self.reject_attachments {
            if let Some(file) = &reply.attachment {
                return Err(DomainError::Gateway(format!(
                    "load {}: No such file or directory",
                    file
                )));
            }
        }
        self.replies
            .lock()
            .unwrap()
            .push((conversation, reply.clone()));
        Ok(())
    }

    async fn send_notice(
        &self,
        conversation: ConversationId,
        notice: &Notice,
    ) -> Result<(), DomainError> {
        self.notices
            .lock()
            .unwrap()
            .push((conversation, notice.clone()));
        Ok(())
    }
}
