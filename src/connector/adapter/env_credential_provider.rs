use crate::application::CredentialProvider;
use crate::domain::{ApiKey, ConfigError};

pub const DEFAULT_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Reads the API key from an environment variable.
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_VAR)
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn api_key(&self) -> Result<Option<ApiKey>, ConfigError> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(ApiKey::new(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::invalid(format!(
                "environment variable {} is not valid unicode",
                self.var
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("${}", self.var)
    }
}
