use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::connector::{ContainerConfig, DEFAULT_API_KEY_VAR, DEFAULT_SECRETS_PATH};
use crate::domain::{
    ChatSettings, ConfigError, ErrorPolicy, GenerationConfig, HarmBlockThreshold, PromptStyle,
    SafetySettings, DEFAULT_GREETING, DEFAULT_INSTRUCTION, DEFAULT_MODEL_ID,
};

#[derive(Parser, Debug)]
#[command(name = "genie")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub verbose: bool,

    /// Model or tuned-model resource name
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    #[arg(long, default_value = "0.4")]
    pub temperature: f32,

    #[arg(long, default_value = "0.95")]
    pub top_p: f32,

    #[arg(long, default_value = "64")]
    pub top_k: u32,

    #[arg(long, default_value = "8192")]
    pub max_output_tokens: u32,

    #[arg(long, default_value = "text/plain")]
    pub mime_type: String,

    /// Block threshold applied to every harm category (none, high, medium, low)
    #[arg(long, default_value = "none")]
    pub safety: String,

    /// Text prepended to every question
    #[arg(long, conflicts_with = "bare")]
    pub instruction: Option<String>,

    /// Send the question without any instruction
    #[arg(long)]
    pub bare: bool,

    /// What to record when a request fails: inline or transient
    #[arg(long, default_value = "inline")]
    pub error_policy: String,

    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_GREETING)]
    pub greeting: String,

    /// TOML file holding `gemini_key`
    #[arg(long, default_value = DEFAULT_SECRETS_PATH)]
    pub secrets: PathBuf,

    /// Environment variable holding the API key
    #[arg(long, default_value = DEFAULT_API_KEY_VAR)]
    pub api_key_env: String,

    /// Answer locally without calling the service
    #[arg(long)]
    pub mock: bool,

    /// Line-oriented mode instead of the full-screen UI
    #[arg(long)]
    pub plain: bool,

    /// Write logs here (the full-screen UI discards them otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn settings(&self) -> Result<ChatSettings, ConfigError> {
        let generation = GenerationConfig::new(
            self.temperature,
            self.top_p,
            self.top_k,
            self.max_output_tokens,
            self.mime_type.clone(),
        )?;

        let prompt = if self.bare {
            PromptStyle::Bare
        } else {
            PromptStyle::Instructed(
                self.instruction
                    .clone()
                    .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string()),
            )
        };

        Ok(ChatSettings {
            model_id: self.model.clone(),
            generation,
            safety: SafetySettings::uniform(self.safety.parse::<HarmBlockThreshold>()?),
            prompt,
            error_policy: self.error_policy.parse::<ErrorPolicy>()?,
            request_timeout: Duration::from_secs(self.timeout_secs),
            greeting: self.greeting.clone(),
        })
    }

    /// Falls back to default settings when the flags are invalid, so the
    /// session can start halted with the error as its notice.
    pub fn container_config(&self) -> (ContainerConfig, Option<ConfigError>) {
        let (settings, error) = match self.settings() {
            Ok(settings) => (settings, None),
            Err(e) => (ChatSettings::default(), Some(e)),
        };
        let config = ContainerConfig {
            settings,
            mock: self.mock,
            secrets_path: self.secrets.clone(),
            api_key_var: self.api_key_env.clone(),
        };
        (config, error)
    }
}
