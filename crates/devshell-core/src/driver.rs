//! Async driver that paces a reveal on tokio timers

use crate::events::RevealEvent;
use crate::reveal::MessageReveal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Tick `reveal` at its cadence until it finishes or is torn down.
///
/// Every queued [`RevealEvent`] is forwarded over `tx`. Cancelling the token,
/// or dropping the receiving end, tears the reveal down: the stage it was in
/// never completes. The reveal is handed back so the host can keep drawing
/// it.
pub async fn drive(
    mut reveal: MessageReveal,
    cancel: CancellationToken,
    tx: mpsc::Sender<RevealEvent>,
) -> MessageReveal {
    if !forward(&mut reveal, &tx).await {
        reveal.cancel();
        return reveal;
    }

    while let Some(cadence) = reveal.current_cadence() {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                reveal.cancel();
                // Best effort: the host asked for this, it may not be listening
                let _ = forward(&mut reveal, &tx).await;
                break;
            }

            _ = tokio::time::sleep(cadence) => {
                reveal.tick();
                if !forward(&mut reveal, &tx).await {
                    tracing::debug!("reveal receiver dropped, tearing down");
                    reveal.cancel();
                    break;
                }
            }
        }
    }

    reveal
}

/// Send queued events. Returns false if the receiver is gone.
async fn forward(reveal: &mut MessageReveal, tx: &mpsc::Sender<RevealEvent>) -> bool {
    for event in reveal.drain_events() {
        if tx.send(event).await.is_err() {
            return false;
        }
    }
    true
}

/// A reveal running on its own task
pub struct RevealTask {
    cancel: CancellationToken,
    handle: JoinHandle<MessageReveal>,
}

impl RevealTask {
    /// Tear the reveal down
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the task has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task and get the reveal back
    pub async fn join(self) -> crate::Result<MessageReveal> {
        self.handle
            .await
            .map_err(|e| crate::Error::Other(format!("reveal task failed: {e}")))
    }
}

/// Spawn [`drive`] on the current runtime
pub fn spawn_reveal(reveal: MessageReveal, tx: mpsc::Sender<RevealEvent>) -> RevealTask {
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(drive(reveal, cancel.clone(), tx));
    RevealTask { cancel, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ActionItem, Message};
    use crate::reveal::RevealCadence;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn reveal(content: &str, actions: Vec<ActionItem>) -> MessageReveal {
        let message = Arc::new(Message::assistant_with_actions(content, actions));
        MessageReveal::new(message, RevealCadence::uniform(Duration::from_millis(10)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_timeline_on_timers() {
        let (tx, mut rx) = mpsc::channel(64);
        let start = Instant::now();
        let task = spawn_reveal(
            reveal(
                "Hi",
                vec![ActionItem::thinking("abc"), ActionItem::terminal("xy")],
            ),
            tx,
        );

        let mut completions = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                RevealEvent::StageCompleted { stage, .. } => {
                    completions.push((stage, start.elapsed().as_millis()));
                }
                RevealEvent::Finished { .. } => break,
                _ => {}
            }
        }

        assert_eq!(completions, vec![(0, 20), (1, 50), (2, 70)]);
        let reveal = task.join().await.unwrap();
        assert!(reveal.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_content_only_finishes_after_len_ticks() {
        let (tx, mut rx) = mpsc::channel(64);
        let start = Instant::now();
        let task = spawn_reveal(reveal("Hello", vec![]), tx);

        let mut text = String::new();
        let mut finished_at = None;
        while let Some(event) = rx.recv().await {
            match event {
                RevealEvent::Delta { text: delta, .. } => text.push_str(&delta),
                RevealEvent::Finished { .. } => finished_at = Some(start.elapsed()),
                _ => {}
            }
        }

        assert_eq!(text, "Hello");
        assert_eq!(finished_at, Some(Duration::from_millis(50)));
        let reveal = task.join().await.unwrap();
        assert_eq!(reveal.sequencer().completed_stages().collect::<Vec<_>>(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_reveal() {
        let (tx, mut rx) = mpsc::channel(64);
        let task = spawn_reveal(reveal("Hello", vec![ActionItem::done("Done")]), tx);

        // Wait for the first character
        loop {
            match rx.recv().await {
                Some(RevealEvent::Delta { .. }) => break,
                Some(_) => continue,
                None => panic!("driver stopped early"),
            }
        }
        task.cancel();

        let mut rest = Vec::new();
        while let Some(event) = rx.recv().await {
            rest.push(event);
        }
        assert!(matches!(rest.last(), Some(RevealEvent::Cancelled { stage: 0, .. })));
        assert!(!rest.iter().any(|e| matches!(
            e,
            RevealEvent::StageCompleted { .. } | RevealEvent::Finished { .. }
        )));

        let reveal = task.join().await.unwrap();
        assert!(reveal.is_cancelled());
        assert_eq!(reveal.current_stage(), 0);
        assert!(!reveal.is_stage_complete(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_receiver_tears_down() {
        let (tx, rx) = mpsc::channel(64);
        drop(rx);
        let reveal = drive(reveal("Hello", vec![]), CancellationToken::new(), tx).await;
        assert!(reveal.is_cancelled());
        assert!(!reveal.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_message_needs_no_timer() {
        let (tx, mut rx) = mpsc::channel(64);
        let start = Instant::now();
        let reveal = drive(
            reveal("", vec![ActionItem::done("Finished")]),
            CancellationToken::new(),
            tx,
        )
        .await;
        assert!(reveal.is_finished());
        assert_eq!(start.elapsed(), Duration::ZERO);

        let mut saw_finished = false;
        while let Ok(event) = rx.try_recv() {
            saw_finished |= matches!(event, RevealEvent::Finished { .. });
        }
        assert!(saw_finished);
    }
}
