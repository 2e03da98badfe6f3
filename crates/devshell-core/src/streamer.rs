//! Typewriter-style character streamer

use std::time::Duration;

/// Result of driving a streamer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Not started yet
    Idle,
    /// More characters remain
    Streaming,
    /// The full string just became visible. Returned exactly once.
    Completed,
    /// Already complete; nothing changed
    Finished,
    /// Torn down; will never complete
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Streaming,
    Complete,
    Cancelled,
}

/// Reveals a string one character per tick.
///
/// The streamer holds no timer of its own: the host calls [`tick`] once per
/// [`cadence`]. Characters are Unicode scalar values, so the visible prefix
/// is always valid UTF-8.
///
/// [`tick`]: CharStreamer::tick
/// [`cadence`]: CharStreamer::cadence
#[derive(Debug, Clone)]
pub struct CharStreamer {
    content: String,
    /// Byte offset of the end of each character
    ends: Vec<usize>,
    shown: usize,
    cadence: Duration,
    phase: Phase,
}

impl CharStreamer {
    /// Create an idle streamer for `content`
    pub fn new(content: impl Into<String>, cadence: Duration) -> Self {
        let content = content.into();
        let ends = char_ends(&content);
        Self {
            content,
            ends,
            shown: 0,
            cadence,
            phase: Phase::Idle,
        }
    }

    /// Begin revealing.
    ///
    /// Empty content, or a zero cadence, completes immediately without any
    /// tick. Calling this on a streamer that already started changes nothing.
    pub fn start(&mut self) -> StreamStatus {
        match self.phase {
            Phase::Idle => {
                if self.ends.is_empty() || self.cadence.is_zero() {
                    self.shown = self.ends.len();
                    self.phase = Phase::Complete;
                    StreamStatus::Completed
                } else {
                    self.phase = Phase::Streaming;
                    StreamStatus::Streaming
                }
            }
            Phase::Streaming => StreamStatus::Streaming,
            Phase::Complete => StreamStatus::Finished,
            Phase::Cancelled => StreamStatus::Cancelled,
        }
    }

    /// Reveal one more character
    pub fn tick(&mut self) -> StreamStatus {
        match self.phase {
            Phase::Idle => StreamStatus::Idle,
            Phase::Streaming => {
                self.shown += 1;
                if self.shown >= self.ends.len() {
                    self.phase = Phase::Complete;
                    StreamStatus::Completed
                } else {
                    StreamStatus::Streaming
                }
            }
            Phase::Complete => StreamStatus::Finished,
            Phase::Cancelled => StreamStatus::Cancelled,
        }
    }

    /// Point the streamer at new content.
    ///
    /// Different content resets the prefix and restarts from scratch. The
    /// same content is left alone: an in-progress reveal keeps going and a
    /// finished one stays finished without signalling again.
    pub fn set_content(&mut self, content: impl Into<String>) -> StreamStatus {
        let content = content.into();
        if content == self.content {
            return match self.phase {
                Phase::Idle => self.start(),
                Phase::Streaming => StreamStatus::Streaming,
                Phase::Complete => StreamStatus::Finished,
                Phase::Cancelled => StreamStatus::Cancelled,
            };
        }
        if self.phase == Phase::Cancelled {
            return StreamStatus::Cancelled;
        }

        self.ends = char_ends(&content);
        self.content = content;
        self.shown = 0;
        self.phase = Phase::Idle;
        self.start()
    }

    /// Stop for good. Completion will never be reported afterwards.
    pub fn cancel(&mut self) {
        if self.phase != Phase::Complete {
            self.phase = Phase::Cancelled;
        }
    }

    /// The currently visible prefix
    pub fn displayed(&self) -> &str {
        match self.shown {
            0 => "",
            n => &self.content[..self.ends[n - 1]],
        }
    }

    /// The full target string
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the whole string is visible
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Whether the streamer was torn down before completing
    pub fn is_cancelled(&self) -> bool {
        self.phase == Phase::Cancelled
    }

    /// Characters shown and total characters
    pub fn progress(&self) -> (usize, usize) {
        (self.shown, self.ends.len())
    }

    /// Time between ticks
    pub fn cadence(&self) -> Duration {
        self.cadence
    }
}

fn char_ends(s: &str) -> Vec<usize> {
    s.char_indices().map(|(i, c)| i + c.len_utf8()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CADENCE: Duration = Duration::from_millis(10);

    fn run_to_completion(s: &mut CharStreamer) -> (usize, usize) {
        let mut ticks = 0;
        let mut completions = 0;
        if s.start() == StreamStatus::Completed {
            completions += 1;
        }
        while !s.is_complete() {
            ticks += 1;
            if s.tick() == StreamStatus::Completed {
                completions += 1;
            }
        }
        // A few extra ticks must not signal again
        for _ in 0..3 {
            assert_eq!(s.tick(), StreamStatus::Finished);
        }
        (ticks, completions)
    }

    #[test]
    fn test_completes_after_exactly_len_ticks() {
        for text in ["Hello", "a", "multi\nline", "héllo wörld", "🦀🦀"] {
            let mut s = CharStreamer::new(text, CADENCE);
            let (ticks, completions) = run_to_completion(&mut s);
            assert_eq!(ticks, text.chars().count(), "ticks for {text:?}");
            assert_eq!(completions, 1);
            assert_eq!(s.displayed(), text);
        }
    }

    #[test]
    fn test_empty_completes_on_start() {
        let mut s = CharStreamer::new("", CADENCE);
        let (ticks, completions) = run_to_completion(&mut s);
        assert_eq!(ticks, 0);
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_zero_cadence_reveals_immediately() {
        let mut s = CharStreamer::new("instant", Duration::ZERO);
        assert_eq!(s.start(), StreamStatus::Completed);
        assert_eq!(s.displayed(), "instant");
    }

    #[test]
    fn test_prefix_grows_one_char_per_tick() {
        let mut s = CharStreamer::new("añb", CADENCE);
        assert_eq!(s.displayed(), "");
        s.start();
        assert_eq!(s.displayed(), "");
        assert_eq!(s.tick(), StreamStatus::Streaming);
        assert_eq!(s.displayed(), "a");
        assert_eq!(s.tick(), StreamStatus::Streaming);
        assert_eq!(s.displayed(), "añ");
        assert_eq!(s.tick(), StreamStatus::Completed);
        assert_eq!(s.displayed(), "añb");
        assert_eq!(s.progress(), (3, 3));
    }

    #[test]
    fn test_tick_before_start_is_idle() {
        let mut s = CharStreamer::new("abc", CADENCE);
        assert_eq!(s.tick(), StreamStatus::Idle);
        assert_eq!(s.displayed(), "");
    }

    #[test]
    fn test_new_content_restarts_from_scratch() {
        let mut s = CharStreamer::new("abcdef", CADENCE);
        s.start();
        s.tick();
        s.tick();
        assert_eq!(s.displayed(), "ab");

        assert_eq!(s.set_content("xyz"), StreamStatus::Streaming);
        assert_eq!(s.displayed(), "");
        s.tick();
        assert_eq!(s.displayed(), "x");
    }

    #[test]
    fn test_same_content_mid_stream_keeps_going() {
        let mut s = CharStreamer::new("abc", CADENCE);
        s.start();
        s.tick();
        assert_eq!(s.set_content("abc"), StreamStatus::Streaming);
        assert_eq!(s.displayed(), "a");
    }

    #[test]
    fn test_same_content_after_completion_is_noop() {
        let mut s = CharStreamer::new("ab", CADENCE);
        run_to_completion(&mut s);
        assert_eq!(s.set_content("ab"), StreamStatus::Finished);
        assert_eq!(s.displayed(), "ab");
        assert_eq!(s.tick(), StreamStatus::Finished);
    }

    #[test]
    fn test_cancel_suppresses_completion() {
        let mut s = CharStreamer::new("abc", CADENCE);
        s.start();
        s.tick();
        s.cancel();
        assert!(s.is_cancelled());
        for _ in 0..5 {
            assert_eq!(s.tick(), StreamStatus::Cancelled);
        }
        assert!(!s.is_complete());
        assert_eq!(s.displayed(), "a");
        assert_eq!(s.set_content("other"), StreamStatus::Cancelled);
    }

    #[test]
    fn test_cancel_after_completion_keeps_complete() {
        let mut s = CharStreamer::new("a", CADENCE);
        run_to_completion(&mut s);
        s.cancel();
        assert!(s.is_complete());
        assert!(!s.is_cancelled());
    }
}
