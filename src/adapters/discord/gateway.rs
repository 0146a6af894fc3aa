//! Implements ChatGateway over serenity's HTTP client.
//!
//! Attachments and remote result files are fetched with reqwest; messages go through
//! `ChannelId::send_message`.

use crate::domain::{ArtifactRef, Attachment, ConversationId, DomainError, Notice, Reply};
use crate::ports::ChatGateway;
use serenity::all::{ChannelId, Colour, CreateAttachment, CreateEmbed, CreateMessage, Http};
use std::sync::Arc;
use tracing::{debug, info};

/// Discord's maximum message content length in characters.
const MAX_DISCORD_LEN: usize = 2000;

pub struct DiscordGateway {
    http: Arc<Http>,
    client: reqwest::Client,
    /// Bearer token for fetching rendered files from a private inference app.
    remote_token: Option<String>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            client: reqwest::Client::new(),
            remote_token: None,
        }
    }

    pub fn with_remote_token(mut self, token: Option<String>) -> Self {
        self.remote_token = token.filter(|t| !t.is_empty());
        self
    }

    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<Vec<u8>, DomainError> {
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Gateway(format!("fetch {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(DomainError::Gateway(format!(
                "fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::Gateway(format!("read body {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }

    async fn load_attachment(
        &self,
        artifact: &ArtifactRef,
    ) -> Result<CreateAttachment, DomainError> {
        match artifact {
            ArtifactRef::Local(path) => CreateAttachment::path(path).await.map_err(|e| {
                DomainError::Gateway(format!("load {}: {}", path.display(), e))
            }),
            ArtifactRef::Remote(url) => {
                let bytes = self.fetch(url, self.remote_token.as_deref()).await?;
                Ok(CreateAttachment::bytes(bytes, artifact.file_name()))
            }
        }
    }

    async fn send(
        &self,
        conversation: ConversationId,
        message: CreateMessage,
    ) -> Result<(), DomainError> {
        ChannelId::new(conversation.0)
            .send_message(&*self.http, message)
            .await
            .map_err(|e| DomainError::Gateway(format!("send to {}: {}", conversation, e)))?;
        Ok(())
    }
}

/// Truncate a string to Discord's 2000-character limit.
fn truncate(s: &str) -> &str {
    match s.char_indices().nth(MAX_DISCORD_LEN) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait::async_trait]
impl ChatGateway for DiscordGateway {
    async fn download_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, DomainError> {
        let bytes = self.fetch(&attachment.url, None).await?;
        debug!(
            filename = %attachment.filename,
            bytes = bytes.len(),
            "attachment downloaded"
        );
        Ok(bytes)
    }

    async fn send_reply(
        &self,
        conversation: ConversationId,
        reply: &Reply,
    ) -> Result<(), DomainError> {
        let mut message = CreateMessage::new().content(truncate(&reply.text));
        if let Some(artifact) = &reply.attachment {
            message = message.add_file(self.load_attachment(artifact).await?);
        }
        self.send(conversation, message).await?;
        info!(%conversation, with_file = reply.attachment.is_some(), "reply sent");
        Ok(())
    }

    async fn send_notice(
        &self,
        conversation: ConversationId,
        notice: &Notice,
    ) -> Result<(), DomainError> {
        let embed = CreateEmbed::new()
            .title(&notice.title)
            .description(&notice.body)
            .colour(Colour::BLUE);
        self.send(conversation, CreateMessage::new().embed(embed)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> DiscordGateway {
        DiscordGateway::new(Arc::new(Http::new("test-token")))
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "é".repeat(MAX_DISCORD_LEN + 10);
        assert_eq!(truncate(&long).chars().count(), MAX_DISCORD_LEN);
    }

    #[tokio::test]
    async fn test_download_attachment() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/attachments/1/2/cat.png")
            .with_status(200)
            .with_body(b"\x89PNG".as_slice())
            .create_async()
            .await;

        let attachment = Attachment {
            filename: "cat.png".to_string(),
            url: format!("{}/attachments/1/2/cat.png", server.url()),
            size: 4,
            content_type: Some("image/png".to_string()),
        };
        let bytes = gateway().download_attachment(&attachment).await.unwrap();

        assert_eq!(bytes, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_download_attachment_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/attachments/gone.png")
            .with_status(404)
            .create_async()
            .await;

        let attachment = Attachment {
            filename: "gone.png".to_string(),
            url: format!("{}/attachments/gone.png", server.url()),
            size: 4,
            content_type: None,
        };
        let err = gateway()
            .download_attachment(&attachment)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Gateway(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_remote_artifact_uses_token() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/gradio_api/file=/tmp/out.png")
            .match_header("authorization", "Bearer hf_secret")
            .with_status(200)
            .with_body(b"PNG".as_slice())
            .create_async()
            .await;

        let gw = gateway().with_remote_token(Some("hf_secret".to_string()));
        let artifact =
            ArtifactRef::Remote(format!("{}/gradio_api/file=/tmp/out.png", server.url()));
        let attachment = gw.load_attachment(&artifact).await.unwrap();

        assert_eq!(attachment.filename, "out.png");
        assert_eq!(attachment.data, b"PNG");
        m.assert_async().await;
    }
}
