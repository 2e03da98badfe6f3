//! Error types for devshell-core

use thiserror::Error;

/// Result type alias using devshell-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the host.
///
/// The reveal machinery itself never fails: repeated or late completions are
/// absorbed silently. These variants only describe requests the host made
/// that cannot be honoured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Action index beyond the message's action list
    #[error("action index {index} out of range ({len} actions)")]
    OutOfRange { index: usize, len: usize },

    /// A decision was sent to an action that is not an approval
    #[error("action {0} is not an approval")]
    NotAnApproval(usize),

    /// The action has not been unlocked yet (or its display was torn down)
    #[error("action {0} has not been revealed")]
    NotRevealed(usize),

    /// A decision was already recorded for this approval
    #[error("approval {0} was already decided")]
    AlreadyDecided(usize),

    /// The user sent nothing but whitespace
    #[error("prompt is empty")]
    EmptyPrompt,

    /// A generic error
    #[error("{0}")]
    Other(String),
}
