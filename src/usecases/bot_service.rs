//! Bot service: entry point for parsed platform events.
//!
//! Joins the upload pipeline, the session tracker and the chat gateway. Implements the
//! inbound `CommandHandler` port so the Discord adapter stays free of business rules.

use crate::domain::{Attachment, ConversationId, Notice, Reply, UserId};
use crate::ports::{ChatGateway, CommandHandler};
use crate::usecases::session_tracker::SessionTracker;
use crate::usecases::upload_pipeline::UploadPipeline;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct BotService {
    pipeline: Arc<UploadPipeline>,
    sessions: Arc<SessionTracker>,
    gateway: Arc<dyn ChatGateway>,
    command_prefix: String,
}

impl BotService {
    pub fn new(
        pipeline: Arc<UploadPipeline>,
        sessions: Arc<SessionTracker>,
        gateway: Arc<dyn ChatGateway>,
        command_prefix: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            sessions,
            gateway,
            command_prefix: command_prefix.into(),
        }
    }

    /// One-time notice for users opening a DM with the bot.
    pub fn welcome_notice(&self) -> Notice {
        Notice {
            title: "Welcome to the Bot!".to_string(),
            body: command_list(&self.command_prefix),
        }
    }

    pub fn instructions_notice(&self) -> Notice {
        Notice {
            title: "How to Use the Bot".to_string(),
            body: command_list(&self.command_prefix),
        }
    }
}

fn command_list(prefix: &str) -> String {
    format!(
        "Hi! 👋 Here are the commands you can use:\n\n\
         🔹 **{p}upload** - Process an image and overlay text.\n   \
         Example: `{p}upload \"Your text here\"` (attach an image).\n\n\
         🔹 **{p}instructions** - View the instructions again.\n\n\
         Feel free to ask me for help anytime! 🎨",
        p = prefix
    )
}

#[async_trait::async_trait]
impl CommandHandler for BotService {
    async fn on_direct_message(&self, conversation: ConversationId, sender: UserId) {
        if !self.sessions.mark_and_check_first_contact(sender) {
            return;
        }
        info!(%sender, %conversation, "first contact; sending welcome");
        if let Err(e) = self
            .gateway
            .send_notice(conversation, &self.welcome_notice())
            .await
        {
            warn!(%sender, error = %e, "failed to send welcome notice");
        }
    }

    async fn on_upload(
        &self,
        conversation: ConversationId,
        sender: UserId,
        attachments: &[Attachment],
        trailing_text: Option<&str>,
    ) {
        let reply = self
            .pipeline
            .handle_upload(sender, attachments, trailing_text)
            .await;
        let Err(e) = self.gateway.send_reply(conversation, &reply).await else {
            return;
        };
        let Some(rendered) = &reply.attachment else {
            warn!(%sender, %conversation, error = %e, "failed to deliver upload reply");
            return;
        };

        // The rendered file could not be attached; the user still gets an answer.
        let filename = attachments
            .first()
            .map(|a| a.filename.as_str())
            .unwrap_or_default();
        error!(
            %sender,
            %conversation,
            filename,
            text = trailing_text.unwrap_or_default(),
            rendered = %rendered,
            error = %e,
            "failed to deliver rendered image"
        );
        let fallback = Reply::text(e.user_message(&self.command_prefix));
        if let Err(e) = self.gateway.send_reply(conversation, &fallback).await {
            warn!(%sender, %conversation, error = %e, "failed to deliver fallback reply");
        }
    }

    async fn on_instructions(&self, conversation: ConversationId, sender: UserId) {
        if let Err(e) = self
            .gateway
            .send_notice(conversation, &self.instructions_notice())
            .await
        {
            warn!(%sender, error = %e, "failed to send instructions");
        }
    }
}
