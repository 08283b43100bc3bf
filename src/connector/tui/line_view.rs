use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::application::{ChatSession, ConversationView, SessionView};
use crate::domain::{DomainError, Message, Role, TurnOutcome};

const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

/// Line-oriented front-end: prints the transcript to a writer and reads one
/// line of input at a time.
///
/// Messages are printed once each, in log order. User messages are skipped
/// unless `echo_user` is set, since an interactive terminal already shows what
/// was typed.
pub struct LineView<W: Write> {
    out: W,
    printed: usize,
    notice_shown: bool,
    echo_user: bool,
    spinner: bool,
}

impl<W: Write> LineView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            notice_shown: false,
            echo_user: false,
            spinner: false,
        }
    }

    pub fn with_echo(mut self, echo_user: bool) -> Self {
        self.echo_user = echo_user;
        self
    }

    /// Show a spinner on stderr while a reply is pending.
    pub fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_message(&mut self, message: &Message) -> std::io::Result<()> {
        let label = match (message.role(), message.is_error()) {
            (Role::User, _) => "you",
            (Role::Assistant, false) => "genie",
            (Role::Assistant, true) => "error",
        };
        writeln!(self.out, "{label}> {}", message.content())
    }

    fn start_spinner(&self) -> Option<ProgressBar> {
        if !self.spinner {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message("thinking...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    }

    /// Reads lines from `input` until EOF or a quit command, running one turn
    /// per non-empty line. A halted session prints its notice and returns
    /// without reading anything.
    pub async fn run<R>(&mut self, chat: &mut ChatSession, input: R) -> Result<(), DomainError>
    where
        R: AsyncBufRead + Unpin,
    {
        self.render_all(&chat.view())?;
        if chat.is_halted() {
            return Ok(());
        }

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if QUIT_COMMANDS.contains(&line) {
                debug!("Quit requested");
                break;
            }

            let (ticket, response) = chat.begin_turn(line)?.into_parts();
            self.render_all(&chat.view())?;

            let spinner = self.start_spinner();
            let result = response.await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            let outcome = chat.finish_turn(ticket, result)?;
            if let TurnOutcome::Failed {
                error,
                recorded: None,
            } = &outcome
            {
                writeln!(self.out, "error> An error occurred: {error}")?;
            }
            self.render_all(&chat.view())?;
        }

        Ok(())
    }
}

impl<W: Write> ConversationView for LineView<W> {
    fn render_all(&mut self, view: &SessionView<'_>) -> Result<(), DomainError> {
        if let Some(notice) = view.notice {
            if !self.notice_shown {
                writeln!(self.out, "{notice}")?;
                self.notice_shown = true;
            }
        }

        let unseen = view.messages.get(self.printed..).unwrap_or_default();
        for message in unseen {
            if message.role() == Role::User && !self.echo_user {
                continue;
            }
            self.write_message(message)?;
        }
        self.printed = view.messages.len();
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::connector::{ScriptedCompletionClient, StaticCredentialProvider};
    use crate::domain::{ChatSettings, ErrorPolicy, PromptStyle, RemoteError};

    fn output(view: LineView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    fn settings(policy: ErrorPolicy) -> ChatSettings {
        ChatSettings {
            prompt: PromptStyle::Bare,
            error_policy: policy,
            ..ChatSettings::default()
        }
    }

    #[tokio::test]
    async fn prints_each_message_once() {
        let client = Arc::new(ScriptedCompletionClient::new().reply("one").reply("two"));
        let mut chat = ChatSession::with_client(client, settings(ErrorPolicy::Inline));
        let mut view = LineView::new(Vec::new()).with_echo(true);

        view.run(&mut chat, "a\n\nb\n".as_bytes()).await.unwrap();

        assert_eq!(
            output(view),
            "genie> How can I help you?\nyou> a\ngenie> one\nyou> b\ngenie> two\n"
        );
    }

    #[tokio::test]
    async fn stops_at_quit_command() {
        let client = Arc::new(ScriptedCompletionClient::new());
        let mut chat = ChatSession::with_client(client.clone(), settings(ErrorPolicy::Inline));
        let mut view = LineView::new(Vec::new());

        view.run(&mut chat, "/quit\nnever sent\n".as_bytes())
            .await
            .unwrap();

        assert_eq!(client.calls(), 0);
        assert_eq!(output(view), "genie> How can I help you?\n");
    }

    #[tokio::test]
    async fn transient_failure_is_printed_but_not_logged() {
        let client =
            Arc::new(ScriptedCompletionClient::new().fail(RemoteError::transport("offline")));
        let mut chat = ChatSession::with_client(client, settings(ErrorPolicy::Transient));
        let mut view = LineView::new(Vec::new());

        view.run(&mut chat, "hello\n".as_bytes()).await.unwrap();

        assert_eq!(chat.messages().len(), 1);
        assert!(output(view).contains("error> An error occurred: request failed: offline"));
    }

    #[tokio::test]
    async fn halted_session_prints_notice_once_and_reads_nothing() {
        let provider = StaticCredentialProvider::empty();
        let client = Arc::new(ScriptedCompletionClient::new());
        let connected = client.clone();
        let mut chat = ChatSession::start(&provider, ChatSettings::default(), move |_, _| {
            Ok(connected as Arc<dyn crate::application::CompletionClient>)
        });
        let mut view = LineView::new(Vec::new());

        view.run(&mut chat, "hello\nagain\n".as_bytes()).await.unwrap();
        view.render_all(&chat.view()).unwrap();

        let printed = output(view);
        assert_eq!(printed.matches("Please add your Gemini API key").count(), 1);
        assert_eq!(client.calls(), 0);
    }
}
