use std::time::Duration;

use thiserror::Error;

/// Problems with the startup configuration. These halt the session but never
/// the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Please add your Gemini API key to continue ({origin}).")]
    MissingCredential { origin: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn missing_credential(origin: impl Into<String>) -> Self {
        Self::MissingCredential {
            origin: origin.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Failure of a single completion request. Recovered per turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response blocked: {0}")]
    Blocked(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),
}

impl RemoteError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn blocked(msg: impl Into<String>) -> Self {
        Self::Blocked(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("A response is still pending; wait for it before sending more")]
    Busy,

    #[error("Session halted: {0}")]
    Halted(ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_its_source() {
        let err = ConfigError::missing_credential("GEMINI_API_KEY");
        assert_eq!(
            err.to_string(),
            "Please add your Gemini API key to continue (GEMINI_API_KEY)."
        );
    }

    #[test]
    fn timeout_renders_its_duration() {
        let err = RemoteError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "timeout after 30s");
        assert!(err.is_timeout());
    }

    #[test]
    fn sub_second_timeout_keeps_its_precision() {
        let err = RemoteError::Timeout(Duration::from_millis(200));
        assert_eq!(err.to_string(), "timeout after 200ms");
    }

    #[test]
    fn config_error_converts_into_domain_error() {
        let err: DomainError = ConfigError::invalid("bad flag").into();
        assert!(matches!(err, DomainError::Config(ConfigError::Invalid(_))));
        assert_eq!(err.to_string(), "Invalid configuration: bad flag");
    }
}
