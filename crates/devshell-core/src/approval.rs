//! Approval decisions and the ledger that records them

use crate::error::{Error, Result};
use crate::message::{ActionKind, Message};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A user's answer to an approval prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    AllowOnce,
    AllowAlways,
    Deny,
}

impl ApprovalDecision {
    /// Decision for an "allow" button press
    pub fn approve(always: bool) -> Self {
        if always {
            ApprovalDecision::AllowAlways
        } else {
            ApprovalDecision::AllowOnce
        }
    }

    /// Whether the request was allowed
    pub fn is_allowed(self) -> bool {
        !matches!(self, ApprovalDecision::Deny)
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            ApprovalDecision::AllowOnce => "Allowed",
            ApprovalDecision::AllowAlways => "Always allowed",
            ApprovalDecision::Deny => "Denied",
        }
    }
}

/// Records approval decisions, at most one per (message, action)
#[derive(Debug, Default)]
pub struct ApprovalLedger {
    decisions: HashMap<(Uuid, usize), ApprovalDecision>,
}

impl ApprovalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision. A second decision for the same item is rejected.
    pub fn record(
        &mut self,
        message_id: Uuid,
        action: usize,
        decision: ApprovalDecision,
    ) -> Result<ApprovalDecision> {
        if self.decisions.contains_key(&(message_id, action)) {
            return Err(Error::AlreadyDecided(action));
        }
        self.decisions.insert((message_id, action), decision);
        tracing::debug!(%message_id, action, ?decision, "approval recorded");
        Ok(decision)
    }

    /// Record a decision for an approval on a message shown in full
    pub fn decide(
        &mut self,
        message: &Message,
        action: usize,
        decision: ApprovalDecision,
    ) -> Result<ApprovalDecision> {
        let actions = message.actions();
        let item = actions.get(action).ok_or(Error::OutOfRange {
            index: action,
            len: actions.len(),
        })?;
        if item.kind != ActionKind::Approval {
            return Err(Error::NotAnApproval(action));
        }
        self.record(message.id, action, decision)
    }

    /// First approval on a message shown in full that has no decision yet
    pub fn pending(&self, message: &Message) -> Option<usize> {
        message
            .actions()
            .iter()
            .enumerate()
            .find(|(index, item)| {
                item.kind == ActionKind::Approval && self.decision(message.id, *index).is_none()
            })
            .map(|(index, _)| index)
    }

    /// The decision recorded for an item, if any
    pub fn decision(&self, message_id: Uuid, action: usize) -> Option<ApprovalDecision> {
        self.decisions.get(&(message_id, action)).copied()
    }

    /// Number of recorded decisions
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Forget everything (new conversation)
    pub fn clear(&mut self) {
        self.decisions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ActionItem;

    #[test]
    fn test_approve_maps_always_flag() {
        assert_eq!(ApprovalDecision::approve(false), ApprovalDecision::AllowOnce);
        assert_eq!(ApprovalDecision::approve(true), ApprovalDecision::AllowAlways);
        assert!(!ApprovalDecision::Deny.is_allowed());
    }

    #[test]
    fn test_ledger_records_once() {
        let mut ledger = ApprovalLedger::new();
        let id = Uuid::new_v4();
        assert_eq!(
            ledger.record(id, 1, ApprovalDecision::Deny),
            Ok(ApprovalDecision::Deny)
        );
        assert_eq!(
            ledger.record(id, 1, ApprovalDecision::AllowOnce),
            Err(Error::AlreadyDecided(1))
        );
        assert_eq!(ledger.decision(id, 1), Some(ApprovalDecision::Deny));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_decide_on_settled_message() {
        let message = Message::assistant_with_actions(
            "ready",
            vec![
                ActionItem::approval("first?"),
                ActionItem::done("ok"),
                ActionItem::approval("second?"),
            ],
        );
        let mut ledger = ApprovalLedger::new();
        assert_eq!(ledger.pending(&message), Some(0));

        assert_eq!(
            ledger.decide(&message, 1, ApprovalDecision::AllowOnce),
            Err(Error::NotAnApproval(1))
        );
        assert_eq!(
            ledger.decide(&message, 5, ApprovalDecision::AllowOnce),
            Err(Error::OutOfRange { index: 5, len: 3 })
        );

        ledger.decide(&message, 0, ApprovalDecision::AllowAlways).unwrap();
        assert_eq!(ledger.pending(&message), Some(2));
        ledger.decide(&message, 2, ApprovalDecision::Deny).unwrap();
        assert_eq!(ledger.pending(&message), None);
        assert_eq!(
            ledger.decide(&message, 2, ApprovalDecision::AllowOnce),
            Err(Error::AlreadyDecided(2))
        );
    }

    #[test]
    fn test_ledger_keys_by_message_and_action() {
        let mut ledger = ApprovalLedger::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        ledger.record(a, 0, ApprovalDecision::AllowOnce).unwrap();
        ledger.record(a, 1, ApprovalDecision::AllowOnce).unwrap();
        ledger.record(b, 0, ApprovalDecision::AllowAlways).unwrap();
        assert_eq!(ledger.len(), 3);
        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.decision(a, 0), None);
    }
}
