//! Text summarization over LLM providers.
//!
//! A [`SummaryCollector`] truncates the input, sends one request to an
//! OpenAI-compatible (OpenAI, NVIDIA, OpenRouter) or Gemini endpoint, and
//! collects the reply into a single summary, in batch or streaming mode.
//! The [`server`] module exposes it over HTTP.

pub mod error;
pub mod types;
pub mod provider;
pub mod providers;
pub mod response;
pub mod sse_stream;
pub mod accumulator;
pub mod factory;
pub mod collector;
pub mod server;

// Re-export core types for easy usage
pub use error::{Error, ErrorKind};
pub use types::*;
pub use provider::LLMProvider;
pub use providers::*;
pub use response::*;
pub use sse_stream::SseEvent;
pub use accumulator::*;
pub use factory::{ProviderFactory, ProviderConfig, ProviderType};
pub use collector::{
    truncate_input, CollectorConfig, PartialResultPolicy, SummarizeRequest, SummaryCollector,
    SummaryResult,
};
