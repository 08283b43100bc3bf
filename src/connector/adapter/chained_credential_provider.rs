use tracing::debug;

use crate::application::CredentialProvider;
use crate::domain::{ApiKey, ConfigError};

/// Asks each provider in turn; the first key found wins.
///
/// An error from any provider stops the search so a broken secrets file is
/// reported instead of silently skipped.
pub struct ChainedCredentialProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentialProvider {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl Default for ChainedCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for ChainedCredentialProvider {
    fn api_key(&self) -> Result<Option<ApiKey>, ConfigError> {
        for provider in &self.providers {
            if let Some(key) = provider.api_key()? {
                debug!("Using API key from {}", provider.describe());
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        self.providers
            .iter()
            .map(|p| p.describe())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::StaticCredentialProvider;

    #[test]
    fn first_present_key_wins() {
        let chain = ChainedCredentialProvider::new()
            .with(StaticCredentialProvider::empty())
            .with(StaticCredentialProvider::new("second"))
            .with(StaticCredentialProvider::new("third"));

        assert_eq!(chain.api_key().unwrap().unwrap().expose(), "second");
    }

    #[test]
    fn empty_chain_has_no_key() {
        let chain = ChainedCredentialProvider::new();
        assert!(chain.api_key().unwrap().is_none());
    }

    #[test]
    fn describe_lists_every_source() {
        let chain = ChainedCredentialProvider::new()
            .with(StaticCredentialProvider::empty())
            .with(StaticCredentialProvider::empty());
        assert_eq!(chain.describe(), "static credential or static credential");
    }
}
