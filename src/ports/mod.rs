//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the chat platform adapter into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::CommandHandler;
pub use outbound::{ArtifactStore, ChatGateway, InferencePort};
