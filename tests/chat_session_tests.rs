//! End-to-end behaviour of a chat session against a scripted completion client.

use std::sync::Arc;
use std::time::Duration;

use genie::{
    ChatSession, ChatSettings, CompletionClient, ConfigError, DomainError, ErrorPolicy, Message,
    PromptStyle, RemoteError, Role, ScriptedCompletionClient, StaticCredentialProvider,
    TurnOutcome, TurnState,
};

fn settings(policy: ErrorPolicy) -> ChatSettings {
    ChatSettings {
        prompt: PromptStyle::Bare,
        error_policy: policy,
        ..ChatSettings::default()
    }
}

fn roles(chat: &ChatSession) -> Vec<Role> {
    chat.messages().iter().map(|m| m.role()).collect()
}

#[tokio::test]
async fn test_jaundice_scenario() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .reply("Jaundice is yellowing of skin/eyes due to bilirubin buildup."),
    );
    let mut chat = ChatSession::with_client(client, settings(ErrorPolicy::Inline));

    chat.submit("What is jaundice?").await.expect("turn should run");

    assert_eq!(
        chat.messages(),
        &[
            Message::assistant("How can I help you?"),
            Message::user("What is jaundice?"),
            Message::assistant("Jaundice is yellowing of skin/eyes due to bilirubin buildup."),
        ]
    );
}

#[tokio::test]
async fn test_successful_turns_alternate_after_seed() {
    for n in [0usize, 1, 4, 9] {
        let client = Arc::new(ScriptedCompletionClient::new());
        let mut chat = ChatSession::with_client(client.clone(), settings(ErrorPolicy::Inline));

        for i in 0..n {
            let outcome = chat.submit(&format!("question {i}")).await.unwrap();
            assert!(outcome.is_answered());
        }

        assert_eq!(chat.messages().len(), 1 + 2 * n);
        assert_eq!(client.calls(), n);
        assert!(chat.session().store().is_alternating());
        for (i, role) in roles(&chat).into_iter().enumerate().skip(1) {
            let expected = if i % 2 == 1 { Role::User } else { Role::Assistant };
            assert_eq!(role, expected, "message {i} has the wrong role");
        }
    }
}

#[tokio::test]
async fn test_inline_policy_records_one_error_message() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .reply("first")
            .fail(RemoteError::Status {
                status: 503,
                message: "overloaded".to_string(),
            })
            .reply("third"),
    );
    let mut chat = ChatSession::with_client(client, settings(ErrorPolicy::Inline));

    chat.submit("one").await.unwrap();
    let outcome = chat.submit("two").await.unwrap();
    chat.submit("three").await.unwrap();

    let recorded = Message::error("An error occurred: service returned 503: overloaded");
    assert_eq!(
        outcome,
        TurnOutcome::Failed {
            error: RemoteError::Status {
                status: 503,
                message: "overloaded".to_string()
            },
            recorded: Some(recorded.clone()),
        }
    );
    assert_eq!(chat.messages().len(), 7);
    assert_eq!(chat.messages()[4], recorded);
    assert_eq!(chat.messages().iter().filter(|m| m.is_error()).count(), 1);
    assert!(chat.session().store().is_alternating());
    assert_eq!(chat.session().state(), TurnState::Idle);
}

#[tokio::test]
async fn test_transient_policy_records_nothing_for_failed_turn() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .fail(RemoteError::blocked("prompt blocked (SAFETY)"))
            .reply("answer"),
    );
    let mut chat = ChatSession::with_client(client, settings(ErrorPolicy::Transient));

    let failed = chat.submit("risky").await.unwrap();
    assert_eq!(failed.error().map(|e| e.is_blocked()), Some(true));
    assert_eq!(chat.messages().len(), 1);

    chat.submit("safe").await.unwrap();

    assert_eq!(
        chat.messages(),
        &[
            Message::assistant("How can I help you?"),
            Message::user("safe"),
            Message::assistant("answer"),
        ]
    );
}

#[tokio::test]
async fn test_reading_twice_without_append_is_identical() {
    let client = Arc::new(ScriptedCompletionClient::new().reply("x"));
    let mut chat = ChatSession::with_client(client, settings(ErrorPolicy::Inline));
    chat.submit("q").await.unwrap();

    let first = chat.messages().to_vec();
    let second = chat.messages().to_vec();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_credential_never_calls_the_service() {
    let client = Arc::new(ScriptedCompletionClient::new());
    let connected = client.clone();
    let provider = StaticCredentialProvider::empty();

    let mut chat = ChatSession::start(&provider, ChatSettings::default(), move |_, _| {
        Ok(connected as Arc<dyn CompletionClient>)
    });

    for input in ["hello", "anyone?"] {
        let err = chat.submit(input).await.unwrap_err();
        assert!(err.is_halted());
    }

    assert_eq!(client.calls(), 0);
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(
        chat.notice(),
        Some(&ConfigError::missing_credential("static credential"))
    );
}

#[tokio::test]
async fn test_second_input_while_awaiting_is_rejected() {
    let client = Arc::new(
        ScriptedCompletionClient::new()
            .reply("slow answer")
            .with_latency(Duration::from_millis(20)),
    );
    let mut chat = ChatSession::with_client(client.clone(), settings(ErrorPolicy::Inline));

    let (ticket, response) = chat.begin_turn("first").unwrap().into_parts();
    assert!(matches!(chat.session().state(), TurnState::AwaitingResponse(_)));

    let err = chat.begin_turn("second").unwrap_err();
    assert!(matches!(err, DomainError::Busy));
    assert_eq!(chat.messages().len(), 2);

    let outcome = chat.finish_turn(ticket, response.await).unwrap();

    assert!(outcome.is_answered());
    assert_eq!(
        roles(&chat),
        vec![Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(client.calls(), 1);

    chat.submit("second").await.unwrap();
    assert_eq!(chat.messages().len(), 5);
}

#[tokio::test]
async fn test_custom_greeting_seeds_the_log() {
    let client = Arc::new(ScriptedCompletionClient::new());
    let chat = ChatSession::with_client(
        client,
        ChatSettings {
            greeting: "Ask me anything.".to_string(),
            ..ChatSettings::default()
        },
    );

    assert_eq!(chat.messages(), &[Message::assistant("Ask me anything.")]);
}
