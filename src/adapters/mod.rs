//! Infrastructure adapters. Implement ports.
//!
//! Discord, Gradio inference, filesystem. Map errors to DomainError.

pub mod discord;
pub mod inference;
pub mod storage;
