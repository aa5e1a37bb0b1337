//! OpenAI-compatible Chat Completions (OpenAI, NVIDIA, OpenRouter).

pub mod client;
pub mod types;

pub use client::OpenAIProvider;
