use crate::{Error, LLMRequest, Response};

/// A transport to an LLM provider.
///
/// Every reply is exposed as a [`Response`] event stream. In batch mode the
/// stream carries the whole body as one delta; in streaming mode it carries
/// the provider's fragments in delivery order.
#[async_trait::async_trait]
pub trait LLMProvider: Send + Sync + 'static {
    /// Display name used in logs and error messages.
    fn name(&self) -> &str;

    /// Issue one request. Resolves once the provider has accepted it.
    async fn generate(&self, request: &LLMRequest) -> Result<Response, Error>;
}
