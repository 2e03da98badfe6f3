//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (user messages, prompts, focused borders)
    pub accent: Color,
    /// Error color
    pub error: Color,
    /// Success color (done markers, running processes)
    pub success: Color,
    /// Warning color (approval prompts)
    pub warning: Color,
    /// Border color
    pub border: Color,
    /// Terminal block output
    pub terminal: Color,
    /// Thinking block text
    pub thinking: Color,
    /// Link color
    pub link: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            border: Color::DarkGray,
            terminal: Color::Gray,
            thinking: Color::DarkGray,
            link: Color::Blue,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Rgb(180, 120, 0),
            border: Color::Gray,
            terminal: Color::DarkGray,
            thinking: Color::Gray,
            link: Color::Blue,
        }
    }

    /// Look a theme up by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Get base style
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get dimmed style
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    /// Get accent style
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Get bold accent style
    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get error style
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Get success style
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Get bold warning style
    pub fn warning_bold(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::BOLD)
    }

    /// Terminal output style
    pub fn terminal_style(&self) -> Style {
        Style::default().fg(self.terminal)
    }

    /// Thinking text style
    pub fn thinking_style(&self) -> Style {
        Style::default()
            .fg(self.thinking)
            .add_modifier(Modifier::ITALIC)
    }

    /// Underlined link style
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Get border style
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("Light").unwrap().bg, Color::White);
        assert_eq!(Theme::by_name("dark").unwrap().bg, Color::Reset);
        assert!(Theme::by_name("solarized").is_none());
    }
}
