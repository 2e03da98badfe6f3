//! devshell-core: conversation model and staged message reveal
//!
//! This crate holds everything that is not terminal chrome: the message
//! model, the character streamer, the reveal sequencer that unlocks a
//! message's actions one at a time, the async driver that paces a reveal on
//! tokio timers, and the mock backend (responder, deck, processes, approvals).

pub mod approval;
pub mod deck;
pub mod driver;
pub mod error;
pub mod events;
pub mod message;
pub mod responder;
pub mod reveal;
pub mod sequencer;
pub mod streamer;

pub use approval::{ApprovalDecision, ApprovalLedger};
pub use deck::{
    Deck, DeckEffect, DeckMode, DeviceScreen, FileNode, Process, ProcessStatus, ProcessTable,
    status_label, workspace_tree,
};
pub use driver::{RevealTask, drive, spawn_reveal};
pub use error::{Error, Result};
pub use events::RevealEvent;
pub use message::{ActionItem, ActionKind, Message, Role};
pub use responder::{Intent, DEFAULT_LATENCY, MONITOR_URL, MockResponder, Reply, Responder};
pub use reveal::{ActionView, MessageReveal, RevealCadence};
pub use sequencer::{RevealSequencer, Visibility};
pub use streamer::{CharStreamer, StreamStatus};
