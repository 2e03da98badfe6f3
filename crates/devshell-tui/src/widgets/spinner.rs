//! Animated spinner widget

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::{Duration, Instant};

/// Spinner animation frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Frame to show after `elapsed`
pub fn frame_at(elapsed: Duration) -> &'static str {
    let index = (elapsed.as_millis() / FRAME_DURATION.as_millis()) as usize;
    SPINNER_FRAMES[index % SPINNER_FRAMES.len()]
}

/// Animated spinner widget
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    start_time: Instant,
}

impl<'a> Spinner<'a> {
    /// Create a new spinner
    pub fn new(label: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            theme,
            start_time: Instant::now(),
        }
    }

    /// Create with a specific start time (for consistent animation)
    pub fn with_start_time(mut self, start: Instant) -> Self {
        self.start_time = start;
        self
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }
        let text = format!("{} {}", frame_at(self.start_time.elapsed()), self.label);
        let span = Span::styled(&text, self.theme.accent_style());
        buf.set_span(area.x, area.y, &span, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at_wraps() {
        assert_eq!(frame_at(Duration::ZERO), "⠋");
        assert_eq!(frame_at(Duration::from_millis(79)), "⠋");
        assert_eq!(frame_at(Duration::from_millis(80)), "⠙");
        assert_eq!(frame_at(Duration::from_millis(800)), "⠋");
    }
}
