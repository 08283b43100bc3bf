use std::sync::Arc;

use tracing::{info, warn};

use super::{InFlightTurn, TurnOrchestrator};
use crate::application::{CompletionClient, CredentialProvider, SessionView};
use crate::domain::{
    ApiKey, ChatSettings, ConfigError, DomainError, Message, RemoteError, Session, TurnOutcome,
    TurnTicket,
};

enum Gate {
    Open(TurnOrchestrator),
    Halted(ConfigError),
}

/// One user's chat: the session state plus whatever is allowed to act on it.
///
/// When startup configuration is unusable the session is *halted*: it keeps
/// its greeting and a single notice, refuses every input, and never builds a
/// completion client.
pub struct ChatSession {
    session: Session,
    gate: Gate,
}

impl ChatSession {
    /// Resolves the credential and, only if one is present, builds the client
    /// with `connect`.
    pub fn start<F>(
        credentials: &dyn CredentialProvider,
        settings: ChatSettings,
        connect: F,
    ) -> Self
    where
        F: FnOnce(ApiKey, &ChatSettings) -> Result<Arc<dyn CompletionClient>, ConfigError>,
    {
        let client = settings
            .validate()
            .and_then(|_| credentials.api_key())
            .and_then(|key| {
                key.ok_or_else(|| ConfigError::missing_credential(credentials.describe()))
            })
            .and_then(|key| connect(key, &settings));

        match client {
            Ok(client) => {
                let session = Session::new(settings.greeting.clone());
                Self::open(session, TurnOrchestrator::new(client, settings))
            }
            Err(notice) => Self::halted(settings.greeting, notice),
        }
    }

    /// Starts a session around an already-built client.
    pub fn with_client(client: Arc<dyn CompletionClient>, settings: ChatSettings) -> Self {
        let session = Session::new(settings.greeting.clone());
        Self::open(session, TurnOrchestrator::new(client, settings))
    }

    /// Starts a session that only shows `notice` and refuses input.
    pub fn halted(greeting: impl Into<String>, notice: ConfigError) -> Self {
        let session = Session::new(greeting);
        warn!(session = %session.id(), "Session halted: {}", notice);
        Self {
            session,
            gate: Gate::Halted(notice),
        }
    }

    fn open(session: Session, orchestrator: TurnOrchestrator) -> Self {
        info!(
            session = %session.id(),
            client = orchestrator.client_name(),
            model = %orchestrator.settings().model_id,
            "Session started"
        );
        Self {
            session,
            gate: Gate::Open(orchestrator),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn notice(&self) -> Option<&ConfigError> {
        match &self.gate {
            Gate::Open(_) => None,
            Gate::Halted(notice) => Some(notice),
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.gate, Gate::Halted(_))
    }

    pub fn settings(&self) -> Option<&ChatSettings> {
        match &self.gate {
            Gate::Open(orchestrator) => Some(orchestrator.settings()),
            Gate::Halted(_) => None,
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            messages: self.session.messages(),
            pending: self.session.staged(),
            state: self.session.state(),
            notice: self.notice(),
        }
    }

    pub fn begin_turn(&mut self, input: &str) -> Result<InFlightTurn, DomainError> {
        match &self.gate {
            Gate::Open(orchestrator) => orchestrator.begin(&mut self.session, input),
            Gate::Halted(notice) => Err(DomainError::Halted(notice.clone())),
        }
    }

    pub fn finish_turn(
        &mut self,
        ticket: TurnTicket,
        result: Result<String, RemoteError>,
    ) -> Result<TurnOutcome, DomainError> {
        match &self.gate {
            Gate::Open(orchestrator) => orchestrator.finish(&mut self.session, ticket, result),
            Gate::Halted(notice) => Err(DomainError::Halted(notice.clone())),
        }
    }

    pub async fn submit(&mut self, input: &str) -> Result<TurnOutcome, DomainError> {
        let (ticket, response) = self.begin_turn(input)?.into_parts();
        let result = response.await;
        self.finish_turn(ticket, result)
    }
}
