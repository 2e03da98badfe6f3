//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Tab (cycle suggestions on an empty chat)
    Tab,
    /// Escape
    Escape,
    /// Ctrl+C / Ctrl+Q
    Quit,
    /// Ctrl+L (new chat)
    NewChat,
    /// Ctrl+U (clear line)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Paste (bracketed paste)
    Paste(String),
    /// Ctrl+Y (allow the pending approval once)
    AllowOnce,
    /// Ctrl+A (allow the pending approval always)
    AllowAlways,
    /// Ctrl+N (deny the pending approval)
    Deny,
    /// Ctrl+T (fold/unfold thinking blocks)
    ToggleFold,
    /// Ctrl+O (system deck button)
    ToggleSystem,
    /// Ctrl+P (next deck tab)
    CycleDeck,
    /// Unknown/unhandled
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('l') => Action::NewChat,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            KeyCode::Char('y') => Action::AllowOnce,
            KeyCode::Char('a') => Action::AllowAlways,
            KeyCode::Char('n') => Action::Deny,
            KeyCode::Char('t') => Action::ToggleFold,
            KeyCode::Char('o') => Action::ToggleSystem,
            KeyCode::Char('p') => Action::CycleDeck,
            _ => Action::Unknown,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Tab => Action::Tab,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}
