use crate::domain::{ApiKey, ConfigError};

/// Supplies the API key from somewhere outside the binary.
///
/// `Ok(None)` means "not configured here"; `Err` means the source exists but
/// could not be read.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Result<Option<ApiKey>, ConfigError>;

    /// Human-readable name of the source, shown when the key is missing.
    fn describe(&self) -> String;
}
