pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ChatSession, CompletionClient, CompletionRequest, ConversationView, CredentialProvider,
    InFlightTurn, SessionView, TurnOrchestrator,
};

pub use connector::{
    ChainedCredentialProvider, Container, ContainerConfig, EnvCredentialProvider, GeminiClient,
    LineView, ScriptedCompletionClient, SecretsFileCredentialProvider, StaticCredentialProvider,
    TerminalUi,
};

pub use domain::{
    ApiKey, ChatSettings, ConfigError, ConversationStore, DomainError, ErrorPolicy,
    GenerationConfig, HarmBlockThreshold, HarmCategory, Message, MessageKind, PromptStyle,
    RemoteError, Role, SafetySettings, Session, TurnOutcome, TurnState,
};
