//! Custom widgets for the TUI

pub mod action_block;
pub mod deck;
pub mod empty_state;
pub mod input_box;
pub mod message_list;
pub mod spinner;

pub use action_block::action_lines;
pub use deck::DeckPanel;
pub use empty_state::{EmptyState, SUGGESTIONS, Suggestion};
pub use input_box::InputBox;
pub use message_list::MessageList;
pub use spinner::Spinner;
