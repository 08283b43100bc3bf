use crate::application::CredentialProvider;
use crate::domain::{ApiKey, ConfigError};

/// Hands out a key supplied at construction time.
pub struct StaticCredentialProvider {
    key: Option<ApiKey>,
}

impl StaticCredentialProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: ApiKey::new(key),
        }
    }

    pub fn empty() -> Self {
        Self { key: None }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn api_key(&self) -> Result<Option<ApiKey>, ConfigError> {
        Ok(self.key.clone())
    }

    fn describe(&self) -> String {
        "static credential".to_string()
    }
}
