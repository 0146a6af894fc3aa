//! Application use cases. Orchestrate domain logic via ports.

pub mod bot_service;
pub mod session_tracker;
pub mod upload_pipeline;

#[cfg(test)]
mod test_support;

pub use bot_service::BotService;
pub use session_tracker::SessionTracker;
pub use upload_pipeline::{DEFAULT_INFERENCE_TIMEOUT, UploadPipeline};
