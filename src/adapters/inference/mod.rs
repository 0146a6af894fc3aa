//! Inference adapter. Implements InferencePort against a Gradio app.

pub mod gradio_client;
pub mod interpret;

pub use gradio_client::{GradioClient, resolve_space_url};
pub use interpret::interpret;
