//! Discord event handler for serenity.
//!
//! Maps gateway messages to `CommandHandler` calls: DMs go to first-contact detection,
//! prefixed commands to upload / instructions.

use crate::adapters::discord::commands::{Command, parse_command};
use crate::domain::{Attachment, ConversationId, UserId};
use crate::ports::CommandHandler;
use serenity::all::{Context, EventHandler, GatewayIntents, Message, Ready};
use serenity::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Permissions requested by the invite link (send messages, attach files, embed links...).
const INVITE_PERMISSIONS: u64 = 1_099_511_680_048;

/// Platform-neutral view of an inbound message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub conversation: ConversationId,
    pub sender: UserId,
    pub from_bot: bool,
    pub is_dm: bool,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl From<&Message> for InboundMessage {
    fn from(msg: &Message) -> Self {
        Self {
            conversation: ConversationId(msg.channel_id.get()),
            sender: UserId(msg.author.id.get()),
            from_bot: msg.author.bot,
            is_dm: msg.guild_id.is_none(),
            content: msg.content.clone(),
            attachments: msg
                .attachments
                .iter()
                .map(|a| Attachment {
                    filename: a.filename.clone(),
                    url: a.url.clone(),
                    size: u64::from(a.size),
                    content_type: a.content_type.clone(),
                })
                .collect(),
        }
    }
}

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    commands: Arc<dyn CommandHandler>,
    prefix: String,
    application_id: Option<u64>,
}

impl DiscordHandler {
    pub fn new(
        commands: Arc<dyn CommandHandler>,
        prefix: impl Into<String>,
        application_id: Option<u64>,
    ) -> Self {
        Self {
            commands,
            prefix: prefix.into(),
            application_id,
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// Route one message. Welcome check runs before command dispatch.
    pub async fn dispatch(&self, msg: InboundMessage) {
        // Skip bot messages to prevent loops
        if msg.from_bot {
            return;
        }

        if msg.is_dm {
            self.commands
                .on_direct_message(msg.conversation, msg.sender)
                .await;
        }

        let Some(command) = parse_command(&self.prefix, &msg.content) else {
            return;
        };
        match command {
            Command::Upload { text } => {
                self.commands
                    .on_upload(
                        msg.conversation,
                        msg.sender,
                        &msg.attachments,
                        text.as_deref(),
                    )
                    .await
            }
            Command::Instructions => {
                self.commands
                    .on_instructions(msg.conversation, msg.sender)
                    .await
            }
            Command::Unknown(name) => {
                debug!(sender = %msg.sender, command = %name, "ignoring unknown command")
            }
        }
    }
}

pub fn invite_url(application_id: u64) -> String {
    format!(
        "https://discord.com/oauth2/authorize?client_id={}&permissions={}&scope=bot",
        application_id, INVITE_PERMISSIONS
    )
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        let application_id = self
            .application_id
            .unwrap_or_else(|| ready.application.id.get());
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            invite = %invite_url(application_id),
            "bot is online"
        );
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        self.dispatch(InboundMessage::from(&msg)).await;
    }
}
