//! Discord adapter (serenity). Command routing in, replies out.
//!
//! - `handler`: gateway events -> `CommandHandler`
//! - `commands`: prefix command parsing
//! - `gateway`: `ChatGateway` over the Discord HTTP API

pub mod commands;
pub mod gateway;
pub mod handler;

pub use commands::{Command, parse_command};
pub use gateway::DiscordGateway;
pub use handler::DiscordHandler;
