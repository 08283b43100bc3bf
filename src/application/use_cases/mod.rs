mod chat_session;
mod turn_orchestrator;

pub use chat_session::*;
pub use turn_orchestrator::*;
