use async_trait::async_trait;

use crate::domain::{GenerationConfig, RemoteError, SafetySettings};

/// Everything one completion request needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model_id: String,
    pub generation: GenerationConfig,
    pub safety: SafetySettings,
    pub prompt: String,
}

/// An interface for sending one flattened prompt to a hosted text-generation
/// service and receiving the generated text.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Each call performs at most one outbound request: no retries, no
/// caching, no streaming.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, RemoteError>;

    /// Label for logs and the status line.
    fn name(&self) -> &str;
}
