use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::CredentialProvider;
use crate::domain::{ApiKey, ConfigError};

pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";
pub const DEFAULT_SECRET_KEY: &str = "gemini_key";

/// Reads the API key from a TOML secrets file such as
///
/// ```toml
/// gemini_key = "..."
/// ```
///
/// A missing file or missing entry counts as "not configured". A file that
/// exists but cannot be read or parsed is a configuration error.
pub struct SecretsFileCredentialProvider {
    path: PathBuf,
    key: String,
}

impl SecretsFileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: DEFAULT_SECRET_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for SecretsFileCredentialProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SECRETS_PATH)
    }
}

impl CredentialProvider for SecretsFileCredentialProvider {
    fn api_key(&self) -> Result<Option<ApiKey>, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No secrets file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(ConfigError::invalid(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };

        let table: toml::Table = contents.parse().map_err(|e| {
            ConfigError::invalid(format!("cannot parse {}: {e}", self.path.display()))
        })?;

        match table.get(&self.key) {
            None => Ok(None),
            Some(toml::Value::String(value)) => Ok(ApiKey::new(value.as_str())),
            Some(_) => Err(ConfigError::invalid(format!(
                "'{}' in {} must be a string",
                self.key,
                self.path.display()
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("'{}' in {}", self.key, self.path.display())
    }
}
