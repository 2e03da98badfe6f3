//! Staged reveal of one assistant message
//!
//! A [`MessageReveal`] binds a message to a [`RevealSequencer`] and the
//! [`CharStreamer`] of whichever stage is active. The content streams first,
//! then each action in order. Kinds that are not streamed (approval, done)
//! and empty strings complete the moment they are unlocked, so the next stage
//! follows without a visible pause.

use crate::approval::{ApprovalDecision, ApprovalLedger};
use crate::error::{Error, Result};
use crate::events::RevealEvent;
use crate::message::{ActionItem, ActionKind, Message};
use crate::sequencer::{RevealSequencer, Visibility};
use crate::streamer::{CharStreamer, StreamStatus};
use std::sync::Arc;
use std::time::Duration;

/// Per-character cadence for each streamed part of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealCadence {
    pub content: Duration,
    pub thinking: Duration,
    pub terminal: Duration,
}

impl Default for RevealCadence {
    fn default() -> Self {
        Self {
            content: Duration::from_millis(15),
            thinking: Duration::from_millis(10),
            terminal: Duration::from_millis(5),
        }
    }
}

impl RevealCadence {
    /// Same cadence for every streamed part
    pub fn uniform(cadence: Duration) -> Self {
        Self {
            content: cadence,
            thinking: cadence,
            terminal: cadence,
        }
    }

    /// Cadence for an action kind. Unstreamed kinds reveal at once.
    pub fn for_kind(&self, kind: ActionKind) -> Duration {
        match kind {
            ActionKind::Thinking => self.thinking,
            ActionKind::Terminal => self.terminal,
            ActionKind::Approval | ActionKind::Done => Duration::ZERO,
        }
    }
}

/// What the renderer needs to draw one unlocked action
#[derive(Debug, Clone, Copy)]
pub struct ActionView<'a> {
    pub index: usize,
    pub item: &'a ActionItem,
    pub mode: Visibility,
    /// Text to draw: the streamed prefix while active, the full content after
    pub text: &'a str,
    /// Whether the body is unfolded. Always true while streaming.
    pub expanded: bool,
}

/// Reveal state for one displayed assistant message
#[derive(Debug)]
pub struct MessageReveal {
    message: Arc<Message>,
    sequencer: RevealSequencer,
    streamer: CharStreamer,
    cadence: RevealCadence,
    /// Fold state per action (true = collapsed)
    folds: Vec<bool>,
    /// Elapsed time not yet spent on ticks
    budget: Duration,
    cancelled: bool,
    events: Vec<RevealEvent>,
}

impl MessageReveal {
    /// Start revealing `message` from stage 0
    pub fn new(message: Arc<Message>, cadence: RevealCadence) -> Self {
        let folds = message.actions().iter().map(|a| a.collapsed).collect();
        let mut reveal = Self {
            sequencer: RevealSequencer::new(message.actions().len()),
            streamer: CharStreamer::new("", Duration::ZERO),
            message,
            cadence,
            folds,
            budget: Duration::ZERO,
            cancelled: false,
            events: Vec::new(),
        };
        if reveal.begin_stage(0) {
            reveal.complete_stage(0);
        }
        reveal
    }

    /// The message being revealed
    pub fn message(&self) -> &Arc<Message> {
        &self.message
    }

    pub fn current_stage(&self) -> usize {
        self.sequencer.current_stage()
    }

    pub fn is_stage_complete(&self, stage: usize) -> bool {
        self.sequencer.is_stage_complete(stage)
    }

    /// The underlying stage bookkeeping
    pub fn sequencer(&self) -> &RevealSequencer {
        &self.sequencer
    }

    /// Whether every stage finished
    pub fn is_finished(&self) -> bool {
        self.sequencer.is_terminal()
    }

    /// Whether the reveal was torn down
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether a streamer is currently producing characters
    pub fn is_streaming(&self) -> bool {
        self.current_cadence().is_some()
    }

    /// Time until the next tick is due, or None once nothing is left to tick
    pub fn current_cadence(&self) -> Option<Duration> {
        if self.cancelled || self.sequencer.is_terminal() {
            None
        } else {
            Some(self.streamer.cadence())
        }
    }

    /// Reveal one more character of the active stage.
    ///
    /// Returns false when there was nothing to tick.
    pub fn tick(&mut self) -> bool {
        if self.current_cadence().is_none() {
            return false;
        }
        let before = self.streamer.displayed().len();
        let status = self.streamer.tick();
        let delta = &self.streamer.displayed()[before..];
        if !delta.is_empty() {
            self.events.push(RevealEvent::Delta {
                message_id: self.message.id,
                stage: self.sequencer.current_stage(),
                text: delta.to_string(),
            });
        }
        if status == StreamStatus::Completed {
            self.complete_stage(self.sequencer.current_stage());
        }
        true
    }

    /// Spend `elapsed` wall time on ticks at the active stage's cadence.
    ///
    /// Leftover time carries over to the next call and across stage
    /// boundaries. Returns the number of ticks performed.
    pub fn advance_by(&mut self, elapsed: Duration) -> usize {
        if self.current_cadence().is_none() {
            return 0;
        }
        self.budget += elapsed;
        let mut ticks = 0;
        while let Some(cadence) = self.current_cadence() {
            if self.budget < cadence {
                break;
            }
            self.budget -= cadence;
            self.tick();
            ticks += 1;
        }
        if self.current_cadence().is_none() {
            self.budget = Duration::ZERO;
        }
        ticks
    }

    /// Report that `stage` finished revealing.
    ///
    /// Repeats, stale stages and reports arriving after teardown are ignored.
    pub fn advance(&mut self, stage: usize) -> bool {
        self.complete_stage(stage)
    }

    /// Tear the reveal down. No stage completes afterwards.
    pub fn cancel(&mut self) {
        if self.cancelled || self.sequencer.is_terminal() {
            return;
        }
        self.streamer.cancel();
        self.cancelled = true;
        let stage = self.sequencer.current_stage();
        tracing::debug!(message_id = %self.message.id, stage, "reveal cancelled");
        self.events.push(RevealEvent::Cancelled {
            message_id: self.message.id,
            stage,
        });
    }

    /// Take the events queued since the last call
    pub fn drain_events(&mut self) -> Vec<RevealEvent> {
        std::mem::take(&mut self.events)
    }

    /// Visible part of the message content
    pub fn content_text(&self) -> &str {
        match self.sequencer.visibility(0) {
            Visibility::Streaming => self.streamer.displayed(),
            _ => &self.message.content,
        }
    }

    /// Unlocked actions, in order. Locked ones are not returned at all.
    pub fn actions(&self) -> Vec<ActionView<'_>> {
        self.message
            .actions()
            .iter()
            .enumerate()
            .map(|(index, item)| (index, item, self.sequencer.visibility(index + 1)))
            .take_while(|(_, _, mode)| *mode != Visibility::Hidden)
            .map(|(index, item, mode)| {
                let streaming = mode == Visibility::Streaming;
                let text = if streaming && item.kind.is_streamed() {
                    self.streamer.displayed()
                } else {
                    item.content.as_str()
                };
                ActionView {
                    index,
                    item,
                    mode,
                    text,
                    expanded: streaming || !self.folds[index],
                }
            })
            .collect()
    }

    /// Fold or unfold a finished thinking block. Returns whether it changed.
    pub fn toggle_fold(&mut self, index: usize) -> bool {
        let foldable = self
            .message
            .actions()
            .get(index)
            .is_some_and(|a| a.kind == ActionKind::Thinking)
            && self.sequencer.visibility(index + 1) == Visibility::Static;
        if foldable {
            self.folds[index] = !self.folds[index];
        }
        foldable
    }

    /// Record a decision for an unlocked approval item.
    ///
    /// Items that are still locked cannot be decided: nothing is recorded.
    pub fn decide(
        &self,
        index: usize,
        decision: ApprovalDecision,
        ledger: &mut ApprovalLedger,
    ) -> Result<ApprovalDecision> {
        let actions = self.message.actions();
        let item = actions.get(index).ok_or(Error::OutOfRange {
            index,
            len: actions.len(),
        })?;
        if item.kind != ActionKind::Approval {
            return Err(Error::NotAnApproval(index));
        }
        if self.cancelled || self.sequencer.visibility(index + 1) == Visibility::Hidden {
            return Err(Error::NotRevealed(index));
        }
        ledger.record(self.message.id, index, decision)
    }

    /// First unlocked approval still waiting for a decision
    pub fn pending_approval(&self, ledger: &ApprovalLedger) -> Option<usize> {
        if self.cancelled {
            return None;
        }
        self.actions()
            .iter()
            .find(|view| {
                view.item.kind == ActionKind::Approval
                    && ledger.decision(self.message.id, view.index).is_none()
            })
            .map(|view| view.index)
    }

    fn stage_source(&self, stage: usize) -> (String, Duration) {
        match stage {
            0 => (self.message.content.clone(), self.cadence.content),
            k => {
                let item = &self.message.actions()[k - 1];
                (item.content.clone(), self.cadence.for_kind(item.kind))
            }
        }
    }

    /// Unlock `stage`. Returns true if it completed on the spot.
    fn begin_stage(&mut self, stage: usize) -> bool {
        let (text, cadence) = self.stage_source(stage);
        self.streamer = CharStreamer::new(text, cadence);
        self.events.push(RevealEvent::StageStarted {
            message_id: self.message.id,
            stage,
        });
        if self.streamer.start() != StreamStatus::Completed {
            return false;
        }
        if !self.streamer.content().is_empty() {
            self.events.push(RevealEvent::Delta {
                message_id: self.message.id,
                stage,
                text: self.streamer.content().to_string(),
            });
        }
        true
    }

    fn complete_stage(&mut self, stage: usize) -> bool {
        if self.cancelled || !self.sequencer.advance(stage) {
            return false;
        }
        self.push_completed(stage);

        loop {
            if self.sequencer.is_terminal() {
                self.budget = Duration::ZERO;
                tracing::debug!(message_id = %self.message.id, "reveal finished");
                self.events.push(RevealEvent::Finished {
                    message_id: self.message.id,
                });
                return true;
            }
            let next = self.sequencer.current_stage();
            if !self.begin_stage(next) {
                return true;
            }
            self.sequencer.advance(next);
            self.push_completed(next);
        }
    }

    fn push_completed(&mut self, stage: usize) {
        tracing::debug!(message_id = %self.message.id, stage, "stage complete");
        self.events.push(RevealEvent::StageCompleted {
            message_id: self.message.id,
            stage,
        });
    }
}
