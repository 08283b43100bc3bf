use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::application::{ChatSession, CompletionClient, CredentialProvider};
use crate::connector::{
    ChainedCredentialProvider, EnvCredentialProvider, GeminiClient, ScriptedCompletionClient,
    SecretsFileCredentialProvider, StaticCredentialProvider,
};
use crate::domain::ChatSettings;

/// Simulated latency of the `--mock` client, long enough to see the spinner.
const MOCK_LATENCY: Duration = Duration::from_millis(600);

pub struct ContainerConfig {
    pub settings: ChatSettings,
    /// Answer locally instead of calling the service.
    pub mock: bool,
    pub secrets_path: PathBuf,
    pub api_key_var: String,
}

/// Wires credential sources and the completion client into a [`ChatSession`].
pub struct Container {
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    /// Environment first, then the secrets file.
    pub fn credentials(&self) -> Box<dyn CredentialProvider> {
        if self.config.mock {
            return Box::new(StaticCredentialProvider::new("mock"));
        }
        Box::new(
            ChainedCredentialProvider::new()
                .with(EnvCredentialProvider::new(self.config.api_key_var.clone()))
                .with(SecretsFileCredentialProvider::new(self.config.secrets_path.clone())),
        )
    }

    pub fn start_session(&self) -> ChatSession {
        let credentials = self.credentials();
        let mock = self.config.mock;

        ChatSession::start(credentials.as_ref(), self.config.settings.clone(), |key, _| {
            let client: Arc<dyn CompletionClient> = if mock {
                debug!("Using mock completion client");
                Arc::new(ScriptedCompletionClient::new().with_latency(MOCK_LATENCY))
            } else {
                debug!(
                    "Using Gemini completion client at {}",
                    GeminiClient::configured_base_url()
                );
                Arc::new(GeminiClient::from_env(key))
            };
            Ok(client)
        })
    }
}
