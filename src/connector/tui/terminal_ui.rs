use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use tracing::debug;

use crate::application::{ChatSession, ConversationView, ResponseFuture, SessionView};
use crate::domain::{DomainError, Message, RemoteError, Role, TurnOutcome, TurnState, TurnTicket};

const TITLE: &str = "Genie";
const CAPTION: &str = "!!  HAKUNA MATATA  !!";
const KEYS_HINT: &str = "Enter sends · PgUp/PgDn scroll · Esc quits";
const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const TICK: Duration = Duration::from_millis(120);
const SCROLL_STEP: u16 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    None,
    Submit(String),
    Quit,
}

type InFlight = Option<(TurnTicket, ResponseFuture)>;

/// Full-screen chat front-end: header, scrollable transcript, status line and
/// a one-line input box.
///
/// Draws after every event. While a reply is pending the transcript keeps
/// redrawing with a spinner, but Enter is refused until the turn resolves.
#[derive(Default)]
pub struct TerminalUi {
    input: String,
    /// Lines scrolled up from the bottom of the transcript.
    scroll_back: u16,
    tick: usize,
    status: Option<String>,
    terminal: Option<DefaultTerminal>,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes over the terminal until the user quits, then restores it.
    pub async fn run(mut self, chat: &mut ChatSession) -> Result<(), DomainError> {
        self.terminal = Some(ratatui::init());
        let result = self.event_loop(chat).await;
        self.terminal = None;
        ratatui::restore();
        result
    }

    async fn event_loop(&mut self, chat: &mut ChatSession) -> Result<(), DomainError> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(TICK);
        let mut in_flight: InFlight = None;

        loop {
            self.render_all(&chat.view())?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key) {
                            Action::Quit => return Ok(()),
                            Action::Submit(text) => self.submit(chat, &text, &mut in_flight)?,
                            Action::None => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                },
                result = wait_for_reply(&mut in_flight), if in_flight.is_some() => {
                    if let Some((ticket, _)) = in_flight.take() {
                        let outcome = chat.finish_turn(ticket, result)?;
                        self.status = transient_status(&outcome);
                        self.scroll_back = 0;
                    }
                }
                _ = ticker.tick() => {
                    self.tick = self.tick.wrapping_add(1);
                }
            }
        }
    }

    fn submit(
        &mut self,
        chat: &mut ChatSession,
        text: &str,
        in_flight: &mut InFlight,
    ) -> Result<(), DomainError> {
        match chat.begin_turn(text) {
            Ok(turn) => {
                *in_flight = Some(turn.into_parts());
                self.input.clear();
                self.status = None;
                self.scroll_back = 0;
                Ok(())
            }
            Err(
                e @ (DomainError::Busy | DomainError::InvalidInput(_) | DomainError::Halted(_)),
            ) => {
                debug!("Input refused: {}", e);
                self.status = Some(e.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Action::Quit,
            KeyCode::Char('u') if ctrl => {
                self.input.clear();
                Action::None
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Enter => Action::Submit(self.input.clone()),
            KeyCode::PageUp => {
                self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn draw(&self, frame: &mut Frame, view: &SessionView<'_>) {
        let [header, body, status, input] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(vec![
                Line::from(TITLE.bold()),
                Line::from(CAPTION.dark_gray()),
            ]),
            header,
        );

        let transcript = Paragraph::new(self.transcript(view)).wrap(Wrap { trim: false });
        let rows = transcript.line_count(body.width);
        let scroll = scroll_offset(rows, body.height, self.scroll_back);
        frame.render_widget(transcript.scroll((scroll, 0)), body);

        frame.render_widget(Paragraph::new(self.status_line(view)), status);

        let title = if view.notice.is_some() {
            " Input disabled "
        } else if view.state.is_idle() {
            " Your message "
        } else {
            " Waiting for reply "
        };
        let input_style = if view.accepts_input() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(
            Paragraph::new(self.input.as_str())
                .style(input_style)
                .block(Block::bordered().title(title)),
            input,
        );

        if view.notice.is_none() {
            let width = self.input.chars().count() as u16;
            let x = input.x + 1 + width.min(input.width.saturating_sub(3));
            frame.set_cursor_position((x, input.y + 1));
        }
    }

    fn transcript<'a>(&self, view: &SessionView<'a>) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        for message in view.messages {
            push_message(&mut lines, message, Style::default());
        }
        if let Some(pending) = view.pending {
            push_message(&mut lines, pending, Style::default().add_modifier(Modifier::DIM));
        }
        if let TurnState::AwaitingResponse(_) = view.state {
            let frame = SPINNER[self.tick % SPINNER.len()];
            lines.push(Line::from(format!("{frame} thinking...").dark_gray()));
        }
        lines
    }

    fn status_line(&self, view: &SessionView<'_>) -> Line<'static> {
        if let Some(notice) = view.notice {
            return Line::from(notice.to_string().yellow());
        }
        match &self.status {
            Some(status) => Line::from(status.clone().red()),
            None => Line::from(KEYS_HINT.dark_gray()),
        }
    }
}

impl ConversationView for TerminalUi {
    fn render_all(&mut self, view: &SessionView<'_>) -> Result<(), DomainError> {
        let Some(mut terminal) = self.terminal.take() else {
            return Err(DomainError::internal("terminal is not initialised"));
        };
        let drawn = terminal.draw(|frame| self.draw(frame, view)).map(|_| ());
        self.terminal = Some(terminal);
        drawn.map_err(DomainError::from)
    }
}

async fn wait_for_reply(in_flight: &mut InFlight) -> Result<String, RemoteError> {
    match in_flight {
        Some((_, response)) => response.await,
        None => std::future::pending().await,
    }
}

fn transient_status(outcome: &TurnOutcome) -> Option<String> {
    match outcome {
        TurnOutcome::Failed {
            error,
            recorded: None,
        } => Some(format!("An error occurred: {error}")),
        _ => None,
    }
}

fn push_message<'a>(lines: &mut Vec<Line<'a>>, message: &'a Message, style: Style) {
    let (label, color) = match (message.role(), message.is_error()) {
        (Role::User, _) => ("you", Color::Green),
        (Role::Assistant, false) => ("genie", Color::Cyan),
        (Role::Assistant, true) => ("error", Color::Red),
    };
    let label_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    lines.push(Line::from(Span::styled(label, label_style)));
    for text in message.content().lines() {
        lines.push(Line::styled(text, style));
    }
    lines.push(Line::default());
}

/// Rows to skip so the transcript stays pinned to its bottom edge, minus
/// however far the user has scrolled back. `rows` is the wrapped height.
fn scroll_offset(rows: usize, height: u16, scroll_back: u16) -> u16 {
    let overflow = rows.saturating_sub(usize::from(height));
    let overflow = u16::try_from(overflow).unwrap_or(u16::MAX);
    overflow.saturating_sub(scroll_back)
}
