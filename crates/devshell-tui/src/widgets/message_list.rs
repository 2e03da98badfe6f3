//! Message list widget for displaying the conversation

use crate::theme::Theme;
use crate::widgets::action_block::action_lines;
use crate::widgets::spinner::frame_at;
use devshell_core::{ActionView, ApprovalLedger, Message, MessageReveal, Role, Visibility};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::sync::Arc;
use std::time::Duration;

/// Widget for displaying a list of chat messages.
///
/// Only the message owned by `reveal` is drawn partially; every other
/// message is drawn in full.
pub struct MessageList<'a> {
    messages: &'a [Arc<Message>],
    reveal: Option<&'a MessageReveal>,
    ledger: &'a ApprovalLedger,
    theme: &'a Theme,
    scroll: usize,
    thinking: Option<Duration>,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(
        messages: &'a [Arc<Message>],
        ledger: &'a ApprovalLedger,
        theme: &'a Theme,
    ) -> Self {
        Self {
            messages,
            reveal: None,
            ledger,
            theme,
            scroll: 0,
            thinking: None,
        }
    }

    /// The reveal driving the latest assistant message
    pub fn reveal(mut self, reveal: Option<&'a MessageReveal>) -> Self {
        self.reveal = reveal;
        self
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the waiting indicator, animated by time since the prompt
    pub fn thinking(mut self, elapsed: Option<Duration>) -> Self {
        self.thinking = elapsed;
        self
    }

    /// Every line of the list at `width`, before scrolling
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for msg in self.messages {
            let reveal = self.reveal.filter(|r| r.message().id == msg.id);
            lines.extend(self.render_message(msg, reveal, width));
        }
        if let Some(elapsed) = self.thinking {
            lines.push(self.assistant_header(false));
            lines.push(Line::from(Span::styled(
                format!("  {} thinking...", frame_at(elapsed)),
                self.theme.warning_bold(),
            )));
        }
        lines
    }

    /// Total height at `width`
    pub fn height(&self, width: usize) -> usize {
        self.lines(width).len()
    }

    fn assistant_header(&self, streaming: bool) -> Line<'static> {
        let header = if streaming { "◀ OS ▌" } else { "◀ OS" };
        Line::from(Span::styled(
            header,
            self.theme.success_style().add_modifier(Modifier::BOLD),
        ))
    }

    fn render_message(
        &self,
        msg: &Message,
        reveal: Option<&MessageReveal>,
        width: usize,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let content_width = width.saturating_sub(2).max(1);

        let (header, content_style) = match msg.role {
            Role::User => (
                Line::from(Span::styled("▶ You", self.theme.accent_bold())),
                self.theme.base_style(),
            ),
            Role::Assistant => (
                self.assistant_header(reveal.is_some_and(|r| r.is_streaming())),
                self.theme.base_style(),
            ),
            Role::System => (
                Line::from(Span::styled("● System", self.theme.dim_style())),
                self.theme.dim_style(),
            ),
        };
        lines.push(header);

        let content = reveal.map_or(msg.content.as_str(), |r| r.content_text());
        let wrapped = if content.is_empty() {
            Vec::new()
        } else {
            textwrap::wrap(content, content_width)
        };
        for line in wrapped {
            lines.push(Line::from(Span::styled(format!("  {line}"), content_style)));
        }

        let views = match reveal {
            Some(r) => r.actions(),
            None => msg
                .actions()
                .iter()
                .enumerate()
                .map(|(index, item)| ActionView {
                    index,
                    item,
                    mode: Visibility::Static,
                    text: &item.content,
                    expanded: !item.collapsed,
                })
                .collect(),
        };
        for view in &views {
            let decision = self.ledger.decision(msg.id, view.index);
            lines.extend(action_lines(view, decision, self.theme, width));
        }

        // Empty line between messages
        lines.push(Line::from(""));
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let visible: Vec<Line> = self
            .lines(area.width as usize)
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}
