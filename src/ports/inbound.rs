//! Inbound port. The platform adapter (command router) calls into the application.

use crate::domain::{Attachment, ConversationId, UserId};

/// Events delivered by the chat platform after command parsing.
///
/// Handlers never fail: every outcome is turned into a reply or a log line.
#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    /// Any message received in a direct conversation.
    async fn on_direct_message(&self, conversation: ConversationId, sender: UserId);

    /// `upload` command with its attachments and the rest of the message as text.
    async fn on_upload(
        &self,
        conversation: ConversationId,
        sender: UserId,
        attachments: &[Attachment],
        trailing_text: Option<&str>,
    );

    /// `instructions` command.
    async fn on_instructions(&self, conversation: ConversationId, sender: UserId);
}
