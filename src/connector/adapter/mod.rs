mod chained_credential_provider;
mod env_credential_provider;
mod gemini_client;
mod scripted_completion_client;
mod secrets_file_credential_provider;
mod static_credential_provider;

pub use chained_credential_provider::*;
pub use env_credential_provider::*;
pub use gemini_client::*;
pub use scripted_completion_client::*;
pub use secrets_file_credential_provider::*;
pub use static_credential_provider::*;
