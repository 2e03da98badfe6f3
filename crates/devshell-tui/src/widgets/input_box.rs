//! Prompt input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line prompt input.
///
/// Editing works on character positions, never bytes. While disabled (a
/// reply is on its way) typing is ignored and submit yields nothing.
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    /// Cursor position in characters
    cursor: usize,
    placeholder: String,
    disabled_placeholder: String,
    disabled: bool,
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Placeholder shown while disabled
    pub fn with_disabled_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.disabled_placeholder = placeholder.into();
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content and put the cursor at the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the trimmed prompt, leaving the box empty.
    ///
    /// Blank input and a disabled box yield nothing and keep the content.
    pub fn take_submission(&mut self) -> Option<String> {
        if self.disabled {
            return None;
        }
        let prompt = self.content.trim().to_string();
        if prompt.is_empty() {
            return None;
        }
        self.clear();
        Some(prompt)
    }

    fn byte_at(&self, cursor: usize) -> usize {
        self.content
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn remove_range(&mut self, from: usize, to: usize) {
        let (start, end) = (self.byte_at(from), self.byte_at(to));
        self.content.drain(start..end);
        self.cursor = from;
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Apply an editing action. Returns whether it was handled.
    pub fn handle_action(&mut self, action: &Action) -> bool {
        if self.disabled {
            return false;
        }
        let len = self.content.chars().count();

        match action {
            Action::Char(c) => self.insert(*c),
            Action::Paste(text) => {
                // Single line: fold line breaks into one space
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if self.cursor > 0 && !self.content.ends_with(' ') {
                            self.insert(' ');
                        }
                    } else {
                        self.insert(c);
                    }
                }
            }
            Action::Backspace if self.cursor > 0 => self.remove_range(self.cursor - 1, self.cursor),
            Action::Delete if self.cursor < len => {
                let cursor = self.cursor;
                self.remove_range(cursor, cursor + 1);
            }
            Action::Left if self.cursor > 0 => self.cursor -= 1,
            Action::Right if self.cursor < len => self.cursor += 1,
            Action::Home => self.cursor = 0,
            Action::End => self.cursor = len,
            Action::ClearLine => self.clear(),
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && chars[start - 1] != ' ' {
                    start -= 1;
                }
                self.remove_range(start, self.cursor);
            }
            _ => return false,
        }
        true
    }

    fn cursor_column(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.disabled {
                theme.border_style()
            } else {
                theme.accent_style()
            });
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 {
            return;
        }

        let width = inner.width as usize;
        let column = self.cursor_column();
        // Keep the cursor in view
        let skip = column.saturating_sub(width.saturating_sub(1));

        let (text, style) = if self.content.is_empty() {
            let placeholder = if self.disabled {
                &self.disabled_placeholder
            } else {
                &self.placeholder
            };
            (placeholder.clone(), theme.dim_style())
        } else {
            let mut seen = 0;
            let visible: String = self
                .content
                .chars()
                .filter(|c| {
                    let keep = seen >= skip;
                    seen += c.width().unwrap_or(0);
                    keep
                })
                .collect();
            (visible, theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if !self.disabled {
            let x = inner.x + (column - skip) as u16;
            if let Some(cell) = buf.cell_mut((x, inner.y)) {
                cell.set_style(Style::default().bg(theme.accent));
            }
        }
    }
}
