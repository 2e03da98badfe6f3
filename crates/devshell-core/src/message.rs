//! Conversation messages and the action items attached to them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Kind of an action block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Collapsible reasoning trace
    Thinking,
    /// Captured command output
    Terminal,
    /// Permission prompt waiting for a user decision
    Approval,
    /// Success marker
    Done,
}

impl ActionKind {
    /// Whether this kind reveals its content character by character.
    ///
    /// Approval prompts and done markers are shown in full at once and count
    /// as complete the moment they are unlocked.
    pub fn is_streamed(self) -> bool {
        matches!(self, ActionKind::Thinking | ActionKind::Terminal)
    }

    /// Short lowercase label
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Thinking => "thinking",
            ActionKind::Terminal => "terminal",
            ActionKind::Approval => "approval",
            ActionKind::Done => "done",
        }
    }
}

/// One unit of assistant work attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub kind: ActionKind,
    /// Optional label (terminal blocks show it in their header)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Reasoning text, log output, or the approval prompt
    pub content: String,
    /// Advisory initial fold state; ignored while the block streams
    #[serde(default)]
    pub collapsed: bool,
}

impl ActionItem {
    fn new(kind: ActionKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: None,
            content: content.into(),
            collapsed: false,
        }
    }

    /// Create a thinking block
    pub fn thinking(content: impl Into<String>) -> Self {
        Self::new(ActionKind::Thinking, content)
    }

    /// Create a terminal block
    pub fn terminal(content: impl Into<String>) -> Self {
        Self::new(ActionKind::Terminal, content)
    }

    /// Create an approval prompt
    pub fn approval(prompt: impl Into<String>) -> Self {
        Self::new(ActionKind::Approval, prompt)
    }

    /// Create a done marker
    pub fn done(content: impl Into<String>) -> Self {
        Self::new(ActionKind::Done, content)
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Start folded once no longer streaming
    pub fn collapsed(mut self) -> Self {
        self.collapsed = true;
        self
    }
}

/// One turn in a conversation.
///
/// The action list is fixed at construction: nothing can insert, remove or
/// reorder actions afterwards, only read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    actions: Vec<ActionItem>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>, actions: Vec<ActionItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            actions,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Vec::new())
    }

    /// Create an assistant message without actions
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, Vec::new())
    }

    /// Create an assistant message carrying an ordered list of actions
    pub fn assistant_with_actions(content: impl Into<String>, actions: Vec<ActionItem>) -> Self {
        Self::new(Role::Assistant, content, actions)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, Vec::new())
    }

    /// The ordered actions
    pub fn actions(&self) -> &[ActionItem] {
        &self.actions
    }

    /// Whether this is an assistant message with no text of its own
    pub fn is_action_only(&self) -> bool {
        self.content.is_empty() && !self.actions.is_empty()
    }
}
