use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{GenerationConfig, PromptStyle, SafetySettings, DEFAULT_GREETING};
use crate::domain::ConfigError;

pub const DEFAULT_MODEL_ID: &str = "tunedModels/mergeddatajsonl-g7atpb6m5g1p";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What the transcript records when a turn's request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Append a visible error message in place of the reply.
    #[default]
    Inline,
    /// Leave the log untouched; the user message is only committed together
    /// with a successful reply.
    Transient,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Inline => "inline",
            ErrorPolicy::Transient => "transient",
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" => Ok(ErrorPolicy::Inline),
            "transient" => Ok(ErrorPolicy::Transient),
            other => Err(ConfigError::invalid(format!("unknown error policy '{other}'"))),
        }
    }
}

/// Everything fixed for the lifetime of a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model_id: String,
    pub generation: GenerationConfig,
    pub safety: SafetySettings,
    pub prompt: PromptStyle,
    pub error_policy: ErrorPolicy,
    pub request_timeout: Duration,
    pub greeting: String,
}

impl ChatSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::invalid("model id must not be empty"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid("request timeout must be positive"));
        }
        self.generation.validate()
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            generation: GenerationConfig::default(),
            safety: SafetySettings::default(),
            prompt: PromptStyle::default(),
            error_policy: ErrorPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_policy() {
        assert_eq!("Inline".parse::<ErrorPolicy>().unwrap(), ErrorPolicy::Inline);
        assert_eq!(
            "transient".parse::<ErrorPolicy>().unwrap(),
            ErrorPolicy::Transient
        );
        assert!("drop".parse::<ErrorPolicy>().is_err());
    }

    #[test]
    fn rejects_blank_model() {
        let settings = ChatSettings {
            model_id: "  ".to_string(),
            ..ChatSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let settings = ChatSettings {
            request_timeout: Duration::ZERO,
            ..ChatSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
