//! devshell-tui: Terminal UI components
//!
//! Widgets for the device shell built on ratatui and crossterm: the chat
//! transcript with staged reveal, action blocks, the system deck panel, the
//! empty-state greeting and the prompt input.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
