mod conversation;
mod credential;
mod generation;
mod message;
mod prompt;
mod safety;
mod session;
mod settings;

pub use conversation::*;
pub use credential::*;
pub use generation::*;
pub use message::*;
pub use prompt::*;
pub use safety::*;
pub use session::*;
pub use settings::*;
