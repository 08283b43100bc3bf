use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::{debug, info, warn};

use crate::application::{CompletionClient, CompletionRequest};
use crate::domain::{
    ChatSettings, DomainError, ErrorPolicy, Message, RemoteError, Session, TurnOutcome,
    TurnTicket,
};

/// The pending result of the single remote call made for a turn.
pub type ResponseFuture = BoxFuture<'static, Result<String, RemoteError>>;

/// A turn that has been started and whose request is not yet resolved.
///
/// The response future owns everything it needs, so the caller can keep
/// drawing the UI while it is polled and hand the result back to
/// [`TurnOrchestrator::finish`] afterwards.
pub struct InFlightTurn {
    ticket: TurnTicket,
    response: ResponseFuture,
}

impl InFlightTurn {
    pub fn ticket(&self) -> TurnTicket {
        self.ticket
    }

    pub fn into_parts(self) -> (TurnTicket, ResponseFuture) {
        (self.ticket, self.response)
    }
}

impl std::fmt::Debug for InFlightTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightTurn")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Drives a [`Session`] through `Idle -> AwaitingResponse -> Idle` for each
/// user input, calling the completion client once per turn.
pub struct TurnOrchestrator {
    client: Arc<dyn CompletionClient>,
    settings: ChatSettings,
}

impl TurnOrchestrator {
    pub fn new(client: Arc<dyn CompletionClient>, settings: ChatSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Records the user input and starts the remote call.
    ///
    /// Fails with [`DomainError::Busy`] while another turn is in flight and
    /// with [`DomainError::InvalidInput`] for blank input; the session is left
    /// untouched in both cases.
    pub fn begin(&self, session: &mut Session, input: &str) -> Result<InFlightTurn, DomainError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(DomainError::invalid_input("message is empty"));
        }

        let request = CompletionRequest {
            model_id: self.settings.model_id.clone(),
            generation: self.settings.generation.clone(),
            safety: self.settings.safety.clone(),
            prompt: self.settings.prompt.compose(text),
        };

        let commit = self.settings.error_policy == ErrorPolicy::Inline;
        let ticket = session.begin(Message::user(text), commit)?;

        info!(
            session = %session.id(),
            turn = ticket.number(),
            client = self.client.name(),
            "Turn started"
        );

        let response = bounded_call(
            Arc::clone(&self.client),
            request,
            self.settings.request_timeout,
        );

        Ok(InFlightTurn { ticket, response })
    }

    /// Applies the result of a turn's remote call and returns the session to
    /// `Idle`. This is the only place a turn's outcome reaches the log.
    pub fn finish(
        &self,
        session: &mut Session,
        ticket: TurnTicket,
        result: Result<String, RemoteError>,
    ) -> Result<TurnOutcome, DomainError> {
        let outcome = match result {
            Ok(text) => {
                let reply = Message::assistant(text);
                session.resolve(ticket, Some(reply.clone()))?;
                TurnOutcome::Answered(reply)
            }
            Err(error) => {
                warn!(
                    session = %session.id(),
                    turn = ticket.number(),
                    "Turn failed: {}",
                    error
                );
                let recorded = match self.settings.error_policy {
                    ErrorPolicy::Inline => {
                        Some(Message::error(format!("An error occurred: {error}")))
                    }
                    ErrorPolicy::Transient => None,
                };
                session.resolve(ticket, recorded.clone())?;
                TurnOutcome::Failed { error, recorded }
            }
        };

        info!(
            session = %session.id(),
            turn = ticket.number(),
            answered = outcome.is_answered(),
            messages = session.messages().len(),
            "Turn finished"
        );

        Ok(outcome)
    }

    /// Runs a whole turn, waiting for the remote call in place.
    pub async fn submit(
        &self,
        session: &mut Session,
        input: &str,
    ) -> Result<TurnOutcome, DomainError> {
        let (ticket, response) = self.begin(session, input)?.into_parts();
        let result = response.await;
        self.finish(session, ticket, result)
    }
}

fn bounded_call(
    client: Arc<dyn CompletionClient>,
    request: CompletionRequest,
    limit: Duration,
) -> ResponseFuture {
    async move {
        let start = Instant::now();
        let result = match tokio::time::timeout(limit, client.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(limit)),
        };
        debug!(
            "{} responded in {:.2}s (ok={})",
            client.name(),
            start.elapsed().as_secs_f64(),
            result.is_ok()
        );
        result
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ScriptedCompletionClient;
    use crate::domain::{PromptStyle, Role, TurnState};

    fn settings(policy: ErrorPolicy) -> ChatSettings {
        ChatSettings {
            prompt: PromptStyle::Bare,
            error_policy: policy,
            ..ChatSettings::default()
        }
    }

    #[tokio::test]
    async fn successful_turn_appends_user_and_reply() {
        let client = Arc::new(ScriptedCompletionClient::new().reply("pong"));
        let orchestrator = TurnOrchestrator::new(client.clone(), settings(ErrorPolicy::Inline));
        let mut session = Session::new("hi");

        let outcome = orchestrator.submit(&mut session, "ping").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Answered(Message::assistant("pong")));
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.state(), TurnState::Idle);
        assert_eq!(client.prompts().await, vec!["ping".to_string()]);
    }

    #[tokio::test]
    async fn user_message_is_visible_while_awaiting_under_inline_policy() {
        let client = Arc::new(ScriptedCompletionClient::new().reply("pong"));
        let orchestrator = TurnOrchestrator::new(client, settings(ErrorPolicy::Inline));
        let mut session = Session::new("hi");

        let turn = orchestrator.begin(&mut session, "ping").unwrap();

        assert!(session.is_awaiting());
        assert_eq!(session.messages().last().map(|m| m.role()), Some(Role::User));

        let (ticket, response) = turn.into_parts();
        orchestrator.finish(&mut session, ticket, response.await).unwrap();
        assert!(session.store().is_alternating());
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_touching_the_session() {
        let client = Arc::new(ScriptedCompletionClient::new());
        let orchestrator = TurnOrchestrator::new(client.clone(), settings(ErrorPolicy::Inline));
        let mut session = Session::new("hi");

        let err = orchestrator.submit(&mut session, "   ").await.unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn prompt_is_composed_with_instruction() {
        let client = Arc::new(ScriptedCompletionClient::new().reply("ok"));
        let orchestrator = TurnOrchestrator::new(
            client.clone(),
            ChatSettings {
                prompt: PromptStyle::Instructed("Be brief: ".to_string()),
                ..ChatSettings::default()
            },
        );
        let mut session = Session::new("hi");

        orchestrator.submit(&mut session, " why? ").await.unwrap();

        assert_eq!(client.prompts().await, vec!["Be brief: why?".to_string()]);
        assert_eq!(session.messages()[1], Message::user("why?"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_client_times_out() {
        let client = Arc::new(
            ScriptedCompletionClient::new()
                .reply("late")
                .with_latency(Duration::from_secs(60)),
        );
        let orchestrator = TurnOrchestrator::new(
            client,
            ChatSettings {
                request_timeout: Duration::from_secs(30),
                ..settings(ErrorPolicy::Inline)
            },
        );
        let mut session = Session::new("hi");

        let outcome = orchestrator.submit(&mut session, "ping").await.unwrap();

        assert_eq!(
            outcome.error(),
            Some(&RemoteError::Timeout(Duration::from_secs(30)))
        );
        assert!(session.messages()[2].is_error());
    }
}
