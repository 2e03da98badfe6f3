//! Assistant replies
//!
//! The shell has no real backend. [`MockResponder`] picks a canned reply
//! from keywords in the prompt after a fixed delay, the way the prototype
//! demo did.

use crate::deck::{DeckEffect, DeckMode, DeviceScreen};
use crate::error::{Error, Result};
use crate::message::{ActionItem, Message};
use async_trait::async_trait;
use std::time::Duration;

/// URL of the monitoring dashboard opened in the web preview
pub const MONITOR_URL: &str = "http://localhost:3000/monitor";

/// Default simulated latency before a reply appears
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);

/// An assistant reply and what it does to the deck
#[derive(Debug, Clone)]
pub struct Reply {
    pub message: Message,
    pub effects: Vec<DeckEffect>,
}

/// Produces assistant replies
#[async_trait]
pub trait Responder: Send + Sync {
    /// Answer a user prompt
    async fn respond(&self, prompt: &str) -> Result<Reply>;
}

/// What the user seems to be asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Clock,
    Monitor,
    Script,
    System,
    Files,
    General,
}

impl Intent {
    /// Classify a prompt by keyword. Earlier rows win.
    pub fn classify(prompt: &str) -> Self {
        let p = prompt.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| p.contains(w));

        if has(&["clock", "time"]) {
            Intent::Clock
        } else if has(&["monitor", "cpu"]) {
            Intent::Monitor
        } else if has(&["script", "ping"]) {
            Intent::Script
        } else if has(&["system", "process"]) {
            Intent::System
        } else if has(&["file", "explorer"]) {
            Intent::Files
        } else {
            Intent::General
        }
    }
}

/// Canned responder with a fixed latency
#[derive(Debug, Clone)]
pub struct MockResponder {
    latency: Duration,
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl MockResponder {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Build the reply for an intent without waiting
    pub fn reply_for(intent: Intent) -> Reply {
        match intent {
            Intent::Clock => Reply {
                message: Message::assistant_with_actions(
                    "I've written a basic digital clock script for the e-ink display. \
                     I'm pushing it to the emulator now.",
                    vec![
                        ActionItem::thinking(
                            "The display is a 250x122 e-ink panel, so partial refreshes \
                             are cheap but full refreshes flicker.\nRedraw the minutes \
                             once a minute and do a full refresh every hour.",
                        )
                        .collapsed(),
                        ActionItem::terminal(
                            "$ python -m py_compile clock.py\n\
                             $ distiller push clock.py --target emulator\n\
                             uploading clock.py (2.1 KB)... ok\n\
                             restarting display service... ok",
                        )
                        .with_title("deploy"),
                        ActionItem::done("Clock is running on the device"),
                    ],
                ),
                effects: vec![
                    DeckEffect::ShowOnDevice {
                        screen: DeviceScreen::Clock,
                    },
                    DeckEffect::Open {
                        mode: DeckMode::Device,
                    },
                ],
            },
            Intent::Monitor => Reply {
                message: Message::assistant_with_actions(
                    "I've started the system monitoring daemon. You can view the \
                     dashboard in the web preview.",
                    vec![
                        ActionItem::terminal(
                            "$ nohup python monitor.py --port 3000 &\n\
                             [1] 8821\n\
                             serving dashboard on http://localhost:3000/monitor",
                        )
                        .with_title("monitor.py"),
                        ActionItem::done("Monitoring daemon started"),
                    ],
                ),
                effects: vec![
                    DeckEffect::ClearDevice,
                    DeckEffect::Browse {
                        url: MONITOR_URL.to_string(),
                    },
                    DeckEffect::Open {
                        mode: DeckMode::Web,
                    },
                    DeckEffect::StartProcess {
                        id: "proc_8821".to_string(),
                        name: "monitor.py".to_string(),
                        cpu: 12,
                    },
                ],
            },
            Intent::Script => Reply {
                message: Message::assistant_with_actions(
                    "I've prepared the script. It needs network access before it can run.",
                    vec![
                        ActionItem::thinking(
                            "A short ping loop is enough: four packets, then report \
                             the average round trip.",
                        ),
                        ActionItem::approval("Allow ping.py to make outbound network requests?"),
                        ActionItem::terminal(
                            "$ python ping.py google.com\n\
                             PING google.com (142.250.72.14): 56 data bytes\n\
                             64 bytes from 142.250.72.14: icmp_seq=0 ttl=117 time=14.2 ms\n\
                             64 bytes from 142.250.72.14: icmp_seq=1 ttl=117 time=13.8 ms\n\
                             64 bytes from 142.250.72.14: icmp_seq=2 ttl=117 time=15.1 ms\n\
                             64 bytes from 142.250.72.14: icmp_seq=3 ttl=117 time=14.0 ms\n\
                             round-trip min/avg/max = 13.8/14.3/15.1 ms",
                        )
                        .with_title("ping.py"),
                        ActionItem::done("Script finished"),
                    ],
                ),
                effects: Vec::new(),
            },
            Intent::System => Reply {
                message: Message::assistant("Opening System Monitor."),
                effects: vec![DeckEffect::Open {
                    mode: DeckMode::System,
                }],
            },
            Intent::Files => Reply {
                message: Message::assistant("Here are the files in your project workspace."),
                effects: vec![DeckEffect::Open {
                    mode: DeckMode::Files,
                }],
            },
            Intent::General => Reply {
                message: Message::assistant("I can help with that. I'm analyzing your request."),
                effects: Vec::new(),
            },
        }
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn respond(&self, prompt: &str) -> Result<Reply> {
        if prompt.trim().is_empty() {
            return Err(Error::EmptyPrompt);
        }
        let intent = Intent::classify(prompt);
        tracing::info!(?intent, "interpreting prompt");
        tokio::time::sleep(self.latency).await;
        Ok(Self::reply_for(intent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ActionKind;

    #[test]
    fn test_classify_suggestions() {
        assert_eq!(
            Intent::classify("Create a digital clock app for the display"),
            Intent::Clock
        );
        assert_eq!(Intent::classify("Show me CPU and Memory usage"), Intent::Monitor);
        assert_eq!(
            Intent::classify("Run a python script to ping google.com"),
            Intent::Script
        );
        assert_eq!(Intent::classify("Help me build a new tool"), Intent::General);
    }

    #[test]
    fn test_classify_precedence() {
        // Clock wins over monitor
        assert_eq!(Intent::classify("monitor the time"), Intent::Clock);
        assert_eq!(Intent::classify("list each PROCESS"), Intent::System);
        assert_eq!(Intent::classify("open the file explorer"), Intent::Files);
        assert_eq!(Intent::classify("system files"), Intent::System);
    }

    #[test]
    fn test_monitor_reply_starts_daemon() {
        let reply = MockResponder::reply_for(Intent::Monitor);
        assert_eq!(reply.effects[0], DeckEffect::ClearDevice);
        assert!(reply.effects.contains(&DeckEffect::Open {
            mode: DeckMode::Web
        }));
        assert!(reply.effects.iter().any(|e| matches!(
            e,
            DeckEffect::StartProcess { name, .. } if name == "monitor.py"
        )));
    }

    #[test]
    fn test_script_reply_is_approval_gated() {
        let reply = MockResponder::reply_for(Intent::Script);
        let kinds: Vec<_> = reply.message.actions().iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Thinking,
                ActionKind::Approval,
                ActionKind::Terminal,
                ActionKind::Done
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_respond_waits_latency() {
        let responder = MockResponder::new(Duration::from_millis(1500));
        let start = tokio::time::Instant::now();
        let reply = responder.respond("open the files").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        assert_eq!(
            reply.message.content,
            "Here are the files in your project workspace."
        );
    }

    #[tokio::test]
    async fn test_respond_rejects_blank_prompt() {
        let responder = MockResponder::new(Duration::ZERO);
        assert_eq!(
            responder.respond("   ").await.unwrap_err(),
            Error::EmptyPrompt
        );
    }
}
