//! Reveal event types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events emitted while a message reveals itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RevealEvent {
    /// A stage was unlocked
    StageStarted { message_id: Uuid, stage: usize },

    /// Newly visible text for a stage
    Delta {
        message_id: Uuid,
        stage: usize,
        text: String,
    },

    /// A stage finished revealing
    StageCompleted { message_id: Uuid, stage: usize },

    /// Every stage finished
    Finished { message_id: Uuid },

    /// The reveal was torn down at `stage`
    Cancelled { message_id: Uuid, stage: usize },
}

impl RevealEvent {
    /// Check if this is a terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RevealEvent::Finished { .. } | RevealEvent::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let id = Uuid::nil();
        let json = serde_json::to_value(RevealEvent::StageCompleted {
            message_id: id,
            stage: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "stage_completed");
        assert_eq!(json["stage"], 2);
    }

    #[test]
    fn test_terminal_events() {
        let id = Uuid::nil();
        let finished = RevealEvent::Finished { message_id: id };
        let cancelled = RevealEvent::Cancelled {
            message_id: id,
            stage: 0,
        };
        let started = RevealEvent::StageStarted {
            message_id: id,
            stage: 0,
        };
        assert!(finished.is_terminal());
        assert!(cancelled.is_terminal());
        assert!(!started.is_terminal());
    }
}
