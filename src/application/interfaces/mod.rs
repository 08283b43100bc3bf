mod completion_client;
mod conversation_view;
mod credential_provider;

pub use completion_client::*;
pub use conversation_view::*;
pub use credential_provider::*;
