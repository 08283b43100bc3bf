use uuid::Uuid;

use super::{ConversationStore, Message};
use crate::domain::{DomainError, RemoteError};

/// Identifies one in-flight turn so a late result cannot be applied to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnTicket(u64);

impl TurnTicket {
    pub fn number(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingResponse(TurnTicket),
}

impl TurnState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TurnState::Idle)
    }
}

/// What a finished turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered(Message),
    Failed {
        error: RemoteError,
        /// The surrogate written to the log, if the error policy records one.
        recorded: Option<Message>,
    },
}

impl TurnOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, TurnOutcome::Answered(_))
    }

    pub fn error(&self) -> Option<&RemoteError> {
        match self {
            TurnOutcome::Answered(_) => None,
            TurnOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// One interactive run: its conversation log and turn state.
///
/// Owned by whoever drives the session and handed to the orchestrator by
/// `&mut`; nothing here is shared across sessions.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    store: ConversationStore,
    state: TurnState,
    staged: Option<Message>,
    turns: u64,
}

impl Session {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            store: ConversationStore::seeded(greeting),
            state: TurnState::Idle,
            staged: None,
            turns: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_awaiting(&self) -> bool {
        !self.state.is_idle()
    }

    /// User message held back until its turn resolves (transient policy).
    pub fn staged(&self) -> Option<&Message> {
        self.staged.as_ref()
    }

    /// Moves `Idle -> AwaitingResponse`. With `commit` the user message goes
    /// straight into the log; otherwise it is staged until [`Session::resolve`].
    pub fn begin(&mut self, user: Message, commit: bool) -> Result<TurnTicket, DomainError> {
        if self.is_awaiting() {
            return Err(DomainError::Busy);
        }

        self.turns += 1;
        let ticket = TurnTicket(self.turns);
        if commit {
            self.store.append(user);
        } else {
            self.staged = Some(user);
        }
        self.state = TurnState::AwaitingResponse(ticket);
        Ok(ticket)
    }

    /// Moves `AwaitingResponse -> Idle`, appending `reply` when there is one.
    /// A staged user message is committed only alongside a reply.
    pub fn resolve(
        &mut self,
        ticket: TurnTicket,
        reply: Option<Message>,
    ) -> Result<(), DomainError> {
        match self.state {
            TurnState::AwaitingResponse(active) if active == ticket => {}
            TurnState::AwaitingResponse(active) => {
                return Err(DomainError::internal(format!(
                    "turn {} resolved while turn {} is in flight",
                    ticket.number(),
                    active.number()
                )));
            }
            TurnState::Idle => {
                return Err(DomainError::internal(format!(
                    "turn {} resolved with no turn in flight",
                    ticket.number()
                )));
            }
        }

        let staged = self.staged.take();
        if let Some(reply) = reply {
            if let Some(user) = staged {
                self.store.append(user);
            }
            self.store.append(reply);
        }
        self.state = TurnState::Idle;
        Ok(())
    }
}
