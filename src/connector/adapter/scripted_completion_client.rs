use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{CompletionClient, CompletionRequest};
use crate::domain::RemoteError;

/// In-process [`CompletionClient`] that plays back queued results.
///
/// Once the queue is empty it echoes the prompt back, which is what `--mock`
/// mode shows. Every call is counted and its prompt recorded.
pub struct ScriptedCompletionClient {
    script: Mutex<VecDeque<Result<String, RemoteError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    pub fn fail(self, error: RemoteError) -> Self {
        self.push(Err(error))
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn push(mut self, result: Result<String, RemoteError>) -> Self {
        self.script.get_mut().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    fn echo(prompt: &str) -> String {
        format!("(mock) You said: {prompt}")
    }
}

impl Default for ScriptedCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, RemoteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().await.push(request.prompt.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self.script.lock().await.pop_front();
        debug!("ScriptedCompletionClient: call {call} (scripted={})", scripted.is_some());

        scripted.unwrap_or_else(|| Ok(Self::echo(&request.prompt)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GenerationConfig, SafetySettings};

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model_id: "m".to_string(),
            generation: GenerationConfig::default(),
            safety: SafetySettings::default(),
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn plays_script_in_order_then_echoes() {
        let client = ScriptedCompletionClient::new()
            .reply("first")
            .fail(RemoteError::transport("down"));

        assert_eq!(client.generate(&request("a")).await.unwrap(), "first");
        assert!(client.generate(&request("b")).await.is_err());
        assert_eq!(
            client.generate(&request("c")).await.unwrap(),
            "(mock) You said: c"
        );
        assert_eq!(client.calls(), 3);
        assert_eq!(client.prompts().await, vec!["a", "b", "c"]);
    }
}
