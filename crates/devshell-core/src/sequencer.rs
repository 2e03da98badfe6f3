//! Stage bookkeeping for a staged message reveal

use std::collections::BTreeSet;

/// How an item at a given stage should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Not unlocked yet; draw nothing
    Hidden,
    /// The active stage; draw through a streamer
    Streaming,
    /// Finished; draw fully materialized
    Static,
}

/// Tracks which stage of a message is visible.
///
/// Stage 0 is the message content, stage `k >= 1` is `actions[k - 1]`. With
/// `N` actions the stages run `0..=N`; the sequencer is terminal once stage
/// `N` has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSequencer {
    last_stage: usize,
    stage: usize,
    completed: BTreeSet<usize>,
}

impl RevealSequencer {
    /// Create a sequencer for a message with `action_count` actions
    pub fn new(action_count: usize) -> Self {
        Self {
            last_stage: action_count,
            stage: 0,
            completed: BTreeSet::new(),
        }
    }

    /// The active stage. Never decreases.
    pub fn current_stage(&self) -> usize {
        self.stage
    }

    /// Number of stages, content included
    pub fn stage_count(&self) -> usize {
        self.last_stage + 1
    }

    /// Whether `stage` finished revealing
    pub fn is_stage_complete(&self, stage: usize) -> bool {
        self.completed.contains(&stage)
    }

    /// Stages that finished, in order
    pub fn completed_stages(&self) -> impl Iterator<Item = usize> + '_ {
        self.completed.iter().copied()
    }

    /// Whether every stage has finished
    pub fn is_terminal(&self) -> bool {
        self.completed.contains(&self.last_stage)
    }

    /// Mark `stage` complete and unlock the next one.
    ///
    /// Only the active stage can complete. Repeats, stale stages and stages
    /// past the end are ignored. Returns whether anything changed.
    pub fn advance(&mut self, stage: usize) -> bool {
        if stage != self.stage || self.completed.contains(&stage) {
            return false;
        }
        self.completed.insert(stage);
        if stage < self.last_stage {
            self.stage = stage + 1;
        }
        true
    }

    /// How the item at `stage` should be drawn right now
    pub fn visibility(&self, stage: usize) -> Visibility {
        if self.completed.contains(&stage) {
            Visibility::Static
        } else if stage == self.stage {
            Visibility::Streaming
        } else {
            Visibility::Hidden
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_sequencer_starts_at_zero() {
        for n in 0..5 {
            let seq = RevealSequencer::new(n);
            assert_eq!(seq.current_stage(), 0);
            assert_eq!(seq.completed_stages().count(), 0);
            assert_eq!(seq.stage_count(), n + 1);
            assert!(!seq.is_terminal());
        }
    }

    #[test]
    fn test_no_actions_terminal_after_content() {
        let mut seq = RevealSequencer::new(0);
        assert!(seq.advance(0));
        assert_eq!(seq.current_stage(), 0);
        assert!(seq.is_terminal());
        assert_eq!(seq.completed_stages().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_advance_is_idempotent() {
        let mut once = RevealSequencer::new(2);
        once.advance(0);

        let mut twice = RevealSequencer::new(2);
        assert!(twice.advance(0));
        assert!(!twice.advance(0));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_out_of_order_advance_ignored() {
        let mut seq = RevealSequencer::new(3);
        assert!(!seq.advance(2));
        assert!(!seq.advance(1));
        assert_eq!(seq.current_stage(), 0);
        assert!(!seq.is_stage_complete(2));
    }

    #[test]
    fn test_out_of_range_advance_ignored() {
        let mut seq = RevealSequencer::new(1);
        seq.advance(0);
        seq.advance(1);
        assert!(seq.is_terminal());
        assert!(!seq.advance(2));
        assert!(!seq.advance(usize::MAX));
        assert_eq!(seq.current_stage(), 1);
        assert_eq!(seq.visibility(7), Visibility::Hidden);
    }

    #[test]
    fn test_stage_is_monotonic_and_strictly_ordered() {
        let n = 4;
        let mut seq = RevealSequencer::new(n);
        let mut last = seq.current_stage();
        for stage in 0..=n {
            // Hammer with every stage, including stale and future ones
            for k in 0..=n + 1 {
                if k == stage {
                    continue;
                }
                assert!(!seq.advance(k));
                assert!(seq.current_stage() >= last);
                last = seq.current_stage();
            }
            assert!(seq.advance(stage));
            assert!(seq.current_stage() >= last);
            last = seq.current_stage();

            for k in 0..n {
                if seq.visibility(k + 1) != Visibility::Hidden {
                    assert!(seq.is_stage_complete(k));
                }
            }
        }
        assert!(seq.is_terminal());
    }

    #[test]
    fn test_visibility_by_stage() {
        let mut seq = RevealSequencer::new(2);
        assert_eq!(seq.visibility(0), Visibility::Streaming);
        assert_eq!(seq.visibility(1), Visibility::Hidden);
        assert_eq!(seq.visibility(2), Visibility::Hidden);

        seq.advance(0);
        assert_eq!(seq.visibility(0), Visibility::Static);
        assert_eq!(seq.visibility(1), Visibility::Streaming);
        assert_eq!(seq.visibility(2), Visibility::Hidden);

        seq.advance(1);
        seq.advance(2);
        assert_eq!(seq.visibility(2), Visibility::Static);
    }
}
