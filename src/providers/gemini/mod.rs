//! Gemini API (`generativelanguage.googleapis.com`) with API-key auth.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
