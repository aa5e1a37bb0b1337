//! End-to-end summarization against mocked provider endpoints.

mod providers;
mod summarize_e2e;
