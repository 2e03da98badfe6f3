//! TUI implementation for devshell

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::commands::{CommandResult, execute_command};
use crate::shell::Shell;
use crossterm::event::{Event, EventStream, MouseEventKind};
use devshell_core::{
    ActionKind, ApprovalDecision, MessageReveal, Reply, Responder, RevealCadence, Visibility,
};
use devshell_tui::{
    Theme,
    input::Action,
    widgets::{DeckPanel, EmptyState, InputBox, MessageList, SUGGESTIONS, Spinner},
};
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Redraw and reveal pacing interval
const TICK: Duration = Duration::from_millis(30);

/// Messages sent to the UI loop from background tasks
#[derive(Debug)]
pub enum UiMessage {
    /// The responder answered a prompt sent during conversation `chat`
    Reply {
        chat: u64,
        reply: devshell_core::Result<Reply>,
    },
}

/// TUI application state
pub struct TuiState {
    shell: Shell,
    /// Reveal of the latest assistant reply
    reveal: Option<MessageReveal>,
    input: InputBox,
    scroll: usize,
    /// Stick to the bottom as content grows
    follow: bool,
    /// Height of the message area at the last render
    page: usize,
    /// When the pending prompt was sent
    waiting_since: Option<Instant>,
    /// Suggestion Tab last picked
    suggestion: Option<usize>,
    theme: Theme,
    cadence: RevealCadence,
    responder: Arc<dyn Responder>,
    ui_tx: mpsc::Sender<UiMessage>,
    pending: Option<JoinHandle<()>>,
    /// Bumped on every new chat so late replies can be dropped
    chat: u64,
}

impl TuiState {
    pub fn new(
        theme: Theme,
        cadence: RevealCadence,
        responder: Arc<dyn Responder>,
        ui_tx: mpsc::Sender<UiMessage>,
    ) -> Self {
        let input = InputBox::new()
            .with_placeholder("What should we build today?")
            .with_disabled_placeholder("Waiting for a reply...");

        Self {
            shell: Shell::new(),
            reveal: None,
            input,
            scroll: 0,
            follow: true,
            page: 10,
            waiting_since: None,
            suggestion: None,
            theme,
            cadence,
            responder,
            ui_tx,
            pending: None,
            chat: 0,
        }
    }

    fn show_system_message(&mut self, content: &str) {
        self.shell.push_system(content);
        self.follow = true;
    }

    /// Send a prompt to the responder on a background task
    fn send_prompt(&mut self, prompt: String) {
        self.shell.push_user(&prompt);
        self.follow = true;
        self.suggestion = None;
        self.waiting_since = Some(Instant::now());
        self.input.set_disabled(true);

        let responder = self.responder.clone();
        let tx = self.ui_tx.clone();
        let chat = self.chat;
        self.pending = Some(tokio::spawn(async move {
            let reply = responder.respond(&prompt).await;
            let _ = tx.send(UiMessage::Reply { chat, reply }).await;
        }));
    }

    /// Handle a message from a background task
    pub fn handle_ui_message(&mut self, msg: UiMessage) {
        match msg {
            UiMessage::Reply { chat, .. } if chat != self.chat => {
                tracing::debug!(chat, "dropping reply from an earlier chat");
            }
            UiMessage::Reply { reply, .. } => {
                self.waiting_since = None;
                self.pending = None;
                self.input.set_disabled(false);
                match reply {
                    Ok(reply) => {
                        // Earlier replies render in full from here on
                        if let Some(mut previous) = self.reveal.take() {
                            previous.cancel();
                        }
                        let message = self.shell.accept_reply(reply);
                        self.reveal = Some(MessageReveal::new(message, self.cadence));
                        self.drain_reveal_events();
                        self.follow = true;
                    }
                    Err(e) => {
                        tracing::warn!("responder failed: {e}");
                        self.show_system_message(&format!("Error: {e}"));
                    }
                }
            }
        }
    }

    /// Spend wall time on the active reveal
    pub fn advance(&mut self, elapsed: Duration) {
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.advance_by(elapsed);
        }
        self.drain_reveal_events();
    }

    fn drain_reveal_events(&mut self) {
        if let Some(reveal) = self.reveal.as_mut() {
            for event in reveal.drain_events() {
                tracing::trace!(?event, "reveal event");
            }
        }
    }

    /// Decide the approval the keys point at: the one in the reply being
    /// revealed, otherwise the newest undecided one in history.
    fn decide(&mut self, decision: ApprovalDecision) {
        let revealing = self.reveal.as_ref().map(|r| r.message().id);
        let active = self
            .reveal
            .as_ref()
            .and_then(|r| r.pending_approval(self.shell.ledger()).map(|index| (r, index)));
        if let Some((reveal, index)) = active {
            match reveal.decide(index, decision, self.shell.ledger_mut()) {
                Ok(decision) => tracing::info!(index, ?decision, "approval decided"),
                Err(e) => tracing::debug!(index, "approval rejected: {e}"),
            }
            return;
        }
        match self.shell.decide_settled(revealing, decision) {
            Some(Ok(decision)) => tracing::info!(?decision, "earlier approval decided"),
            Some(Err(e)) => tracing::debug!("approval rejected: {e}"),
            None => tracing::debug!(?decision, "no approval pending"),
        }
    }

    /// Whether any rendered approval is waiting for a decision
    fn approval_pending(&self) -> bool {
        let revealing = self.reveal.as_ref().map(|r| r.message().id);
        self.reveal
            .as_ref()
            .is_some_and(|r| r.pending_approval(self.shell.ledger()).is_some())
            || self.shell.settled_approval(revealing).is_some()
    }

    /// Fold or unfold the latest finished thinking block
    fn toggle_fold(&mut self) {
        let Some(reveal) = self.reveal.as_mut() else {
            return;
        };
        let target = reveal
            .actions()
            .iter()
            .rev()
            .find(|v| v.item.kind == ActionKind::Thinking && v.mode == Visibility::Static)
            .map(|v| v.index);
        if let Some(index) = target {
            reveal.toggle_fold(index);
        }
    }

    fn new_chat(&mut self) {
        if let Some(mut reveal) = self.reveal.take() {
            reveal.cancel();
        }
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        self.waiting_since = None;
        self.suggestion = None;
        self.input.set_disabled(false);
        self.input.clear();
        self.shell.new_chat();
        self.chat += 1;
        self.scroll = 0;
        self.follow = true;
    }

    fn run_command(&mut self, input: &str) -> bool {
        let Some(result) = execute_command(input, self.shell.processes()) else {
            return true;
        };
        match result {
            CommandResult::Message(msg) => self.show_system_message(&msg),
            CommandResult::Clear => self.new_chat(),
            CommandResult::Deck(command) => self.shell.apply_deck(command),
            CommandResult::Kill(id) => {
                let outcome = self.shell.kill(&id);
                self.show_system_message(&outcome);
            }
            CommandResult::Exit => return false,
            CommandResult::Unknown(cmd) => self.show_system_message(&format!(
                "Unknown command: /{cmd}\nType /help for available commands."
            )),
        }
        true
    }

    /// Handle keyboard action. Returns false to quit.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Escape => {
                if !self.shell.deck().is_open() {
                    return false;
                }
                self.shell.deck_mut().close();
            }
            Action::Submit => {
                if let Some(prompt) = self.input.take_submission() {
                    if prompt.starts_with('/') {
                        return self.run_command(&prompt);
                    }
                    self.send_prompt(prompt);
                }
            }
            Action::Tab => {
                if self.shell.messages().is_empty() && !self.input.is_disabled() {
                    let next = self.suggestion.map_or(0, |i| (i + 1) % SUGGESTIONS.len());
                    self.suggestion = Some(next);
                    self.input.set_content(SUGGESTIONS[next].prompt);
                }
            }
            Action::AllowOnce => self.decide(ApprovalDecision::AllowOnce),
            Action::AllowAlways => self.decide(ApprovalDecision::AllowAlways),
            Action::Deny => self.decide(ApprovalDecision::Deny),
            Action::ToggleFold => self.toggle_fold(),
            Action::ToggleSystem => self.shell.deck_mut().toggle_system(),
            Action::CycleDeck => self.shell.deck_mut().cycle_mode(),
            Action::NewChat => self.new_chat(),
            Action::PageUp => {
                self.follow = false;
                self.scroll = self.scroll.saturating_sub(self.page.max(1));
            }
            Action::PageDown => {
                // Render clamps and re-enables follow at the bottom
                self.scroll = self.scroll.saturating_add(self.page.max(1));
            }
            other => {
                self.input.handle_action(&other);
            }
        }
        true
    }

    fn scroll_by(&mut self, delta: isize) {
        if delta < 0 {
            self.follow = false;
            self.scroll = self.scroll.saturating_sub(delta.unsigned_abs());
        } else {
            self.scroll = self.scroll.saturating_add(delta as usize);
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Layout: header (1), body (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(size);

        self.render_header(frame, chunks[0]);

        if self.shell.deck().is_open() {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);
            self.render_messages(frame, body[0]);
            let panel = DeckPanel::new(
                self.shell.deck(),
                self.shell.processes(),
                self.shell.files(),
                &self.theme,
            );
            frame.render_widget(panel, body[1]);
        } else {
            self.render_messages(frame, chunks[1]);
        }

        self.render_status(frame, chunks[2]);
        self.input.render(chunks[3], frame.buffer_mut(), &self.theme);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let left = " devshell";
        let right = format!("{} ", self.shell.status());
        let spacing = (area.width as usize)
            .saturating_sub(left.chars().count() + right.chars().count());
        let status_style = if self.shell.deck().is_open() || self.shell.processes().running() > 0 {
            self.theme.success_style()
        } else {
            self.theme.dim_style()
        };
        let line = Line::from(vec![
            Span::styled(left, self.theme.accent_bold()),
            Span::raw(" ".repeat(spacing)),
            Span::styled(right, status_style),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }
        self.page = inner.height as usize;

        if self.shell.messages().is_empty() && self.waiting_since.is_none() {
            let empty = EmptyState::new(&self.theme).selected(self.suggestion);
            frame.render_widget(empty, inner);
            return;
        }

        let list = MessageList::new(self.shell.messages(), self.shell.ledger(), &self.theme)
            .reveal(self.reveal.as_ref())
            .thinking(self.waiting_since.map(|t| t.elapsed()));
        let content_height = list.height(inner.width as usize);
        let bottom = content_height.saturating_sub(inner.height as usize);

        if self.follow || self.scroll >= bottom {
            self.scroll = bottom;
            self.follow = true;
        }

        frame.render_widget(list.scroll(self.scroll), inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some(since) = self.waiting_since {
            let spinner = Spinner::new("Interpreting...", &self.theme).with_start_time(since);
            frame.render_widget(spinner, area);
            return;
        }

        let pending = self.approval_pending();
        let (left, left_style) = match &self.reveal {
            _ if pending => ("Permission required", self.theme.warning_bold()),
            Some(r) if r.is_streaming() => ("Revealing...", self.theme.accent_style()),
            _ => ("Ready", self.theme.dim_style()),
        };
        let right = if pending {
            "Ctrl+Y: allow │ Ctrl+A: always │ Ctrl+N: deny"
        } else {
            "Ctrl+O: system │ Ctrl+P: deck │ Ctrl+L: new │ Ctrl+C: quit"
        };

        let available = area.width as usize;
        let used = left.chars().count() + right.chars().count();
        let line = if used + 2 <= available {
            Line::from(vec![
                Span::styled(left, left_style),
                Span::raw(" ".repeat(available - used)),
                Span::styled(right, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(left, left_style))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Run the TUI application
pub async fn run_tui(
    theme: Theme,
    cadence: RevealCadence,
    responder: Arc<dyn Responder>,
) -> anyhow::Result<()> {
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);
    let mut state = TuiState::new(theme, cadence, responder, ui_tx);

    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK);
    let mut last_tick = Instant::now();

    let result = loop {
        terminal.draw(|frame| state.render(frame))?;

        tokio::select! {
            biased;

            msg = ui_rx.recv() => {
                if let Some(msg) = msg {
                    state.handle_ui_message(msg);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => {
                        let action = devshell_tui::input::key_to_action(key);
                        if !state.handle_action(action) {
                            break Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        state.handle_action(Action::Paste(text));
                    }
                    Some(Ok(Event::Mouse(mouse))) => {
                        match mouse.kind {
                            MouseEventKind::ScrollUp => state.scroll_by(-3),
                            MouseEventKind::ScrollDown => state.scroll_by(3),
                            _ => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                }
            }

            _ = tick_interval.tick() => {
                let now = Instant::now();
                state.advance(now - last_tick);
                last_tick = now;
            }
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
