//! Greeting and prompt suggestions shown before the first message

use crate::theme::Theme;
use chrono::Timelike;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// A canned prompt offered on the empty screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub title: &'static str,
    pub prompt: &'static str,
}

pub const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        title: "Build a Clock",
        prompt: "Create a digital clock app for the display",
    },
    Suggestion {
        title: "System Monitor",
        prompt: "Show me CPU and Memory usage",
    },
    Suggestion {
        title: "Run Script",
        prompt: "Run a python script to ping google.com",
    },
    Suggestion {
        title: "Custom Tool",
        prompt: "Help me build a new tool",
    },
];

/// Greeting for an hour of the day (0-23)
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good Morning.",
        12..=17 => "Good Afternoon.",
        _ => "Good Evening.",
    }
}

/// Empty chat screen
pub struct EmptyState<'a> {
    theme: &'a Theme,
    selected: Option<usize>,
    hour: u32,
}

impl<'a> EmptyState<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            selected: None,
            hour: chrono::Local::now().hour(),
        }
    }

    /// Highlight the suggestion that Tab last picked
    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn at_hour(mut self, hour: u32) -> Self {
        self.hour = hour;
        self
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                greeting(self.hour),
                self.theme.base_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("What shall we build today?", self.theme.dim_style())),
            Line::from(""),
        ];
        for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
            let style = if self.selected == Some(i) {
                self.theme.accent_bold()
            } else {
                self.theme.base_style()
            };
            lines.push(Line::from(Span::styled(suggestion.title, style)));
            lines.push(Line::from(Span::styled(suggestion.prompt, self.theme.dim_style())));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Tab to pick a suggestion · Enter to send · Ctrl+O system deck",
            self.theme.border_style(),
        )));
        lines
    }
}

impl Widget for EmptyState<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines();
        let top = area.height.saturating_sub(lines.len() as u16) / 2;
        let area = Rect {
            y: area.y + top,
            height: area.height - top,
            ..area
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
