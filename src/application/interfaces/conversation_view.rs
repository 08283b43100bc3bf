use crate::domain::{ConfigError, DomainError, Message, TurnState};

/// Read-only snapshot handed to a view on every state change.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub messages: &'a [Message],
    /// User text sent but not yet in the log.
    pub pending: Option<&'a Message>,
    pub state: TurnState,
    pub notice: Option<&'a ConfigError>,
}

impl SessionView<'_> {
    pub fn accepts_input(&self) -> bool {
        self.notice.is_none() && self.state.is_idle()
    }
}

/// Renders the conversation. Called after every mutation of the session.
pub trait ConversationView {
    fn render_all(&mut self, view: &SessionView<'_>) -> Result<(), DomainError>;
}
