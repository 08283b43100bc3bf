use serde::{Deserialize, Serialize};

use crate::domain::ConfigError;

/// Sampling and length parameters applied to every request in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: String,
}

impl GenerationConfig {
    pub fn new(
        temperature: f32,
        top_p: f32,
        top_k: u32,
        max_output_tokens: u32,
        response_mime_type: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            temperature,
            top_p,
            top_k,
            max_output_tokens,
            response_mime_type: response_mime_type.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_response_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.response_mime_type = mime.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::invalid(format!(
                "temperature must be within 0..=1, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ConfigError::invalid(format!(
                "top_p must be within 0..=1, got {}",
                self.top_p
            )));
        }
        if self.top_k == 0 {
            return Err(ConfigError::invalid("top_k must be positive"));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::invalid("max_output_tokens must be positive"));
        }
        if !self.response_mime_type.contains('/') {
            return Err(ConfigError::invalid(format!(
                "response mime type '{}' is not a mime type",
                self.response_mime_type
            )));
        }
        Ok(())
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn response_mime_type(&self) -> &str {
        &self.response_mime_type
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}
