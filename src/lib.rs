//! overlay-bot: Discord bot that renders user captions onto images via a Gradio inference app.
//! Hexagonal layout: domain and use cases in the middle, Discord / Gradio / filesystem adapters
//! at the edges.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
