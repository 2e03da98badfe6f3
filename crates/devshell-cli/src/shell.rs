//! Conversation and deck state shared by the TUI and line mode

use crate::commands::DeckCommand;
use devshell_core::{
    ApprovalDecision, ApprovalLedger, Deck, FileNode, Message, ProcessTable, Reply, status_label,
    workspace_tree,
};
use std::sync::Arc;
use uuid::Uuid;

/// Everything one devshell session holds
#[derive(Debug)]
pub struct Shell {
    messages: Vec<Arc<Message>>,
    deck: Deck,
    processes: ProcessTable,
    ledger: ApprovalLedger,
    files: Vec<FileNode>,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            deck: Deck::new(),
            processes: ProcessTable::new(),
            ledger: ApprovalLedger::new(),
            files: workspace_tree(),
        }
    }

    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    pub fn ledger(&self) -> &ApprovalLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ApprovalLedger {
        &mut self.ledger
    }

    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    /// Header status text
    pub fn status(&self) -> String {
        status_label(&self.deck, &self.processes)
    }

    pub fn push_user(&mut self, prompt: &str) {
        self.messages.push(Arc::new(Message::user(prompt)));
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.messages.push(Arc::new(Message::system(text)));
    }

    /// Append an assistant reply and apply its deck effects
    pub fn accept_reply(&mut self, reply: Reply) -> Arc<Message> {
        for effect in &reply.effects {
            tracing::info!(?effect, "applying deck effect");
            self.deck.apply(effect, &mut self.processes);
        }
        let message = Arc::new(reply.message);
        tracing::info!(
            message_id = %message.id,
            actions = message.actions().len(),
            "assistant replied"
        );
        self.messages.push(message.clone());
        message
    }

    /// Newest undecided approval among messages shown in full.
    /// `revealing` is the message still being revealed, which is skipped.
    pub fn settled_approval(&self, revealing: Option<Uuid>) -> Option<(Arc<Message>, usize)> {
        self.messages
            .iter()
            .rev()
            .filter(|m| Some(m.id) != revealing)
            .find_map(|m| self.ledger.pending(m).map(|index| (m.clone(), index)))
    }

    /// Decide the newest undecided approval among messages shown in full
    pub fn decide_settled(
        &mut self,
        revealing: Option<Uuid>,
        decision: ApprovalDecision,
    ) -> Option<devshell_core::Result<ApprovalDecision>> {
        let (message, index) = self.settled_approval(revealing)?;
        Some(self.ledger.decide(&message, index, decision))
    }

    /// Start a new conversation. Running processes survive.
    pub fn new_chat(&mut self) {
        self.messages.clear();
        self.ledger.clear();
        self.deck.reset();
        tracing::info!("new chat");
    }

    pub fn apply_deck(&mut self, command: DeckCommand) {
        match command {
            DeckCommand::Cycle => self.deck.cycle_mode(),
            DeckCommand::Open(mode) => self.deck.open(mode),
            DeckCommand::Close => self.deck.close(),
        }
    }

    /// Terminate a process and describe the outcome
    pub fn kill(&mut self, id: &str) -> String {
        match self.processes.kill(id) {
            Some(process) => format!("Process Terminated: PID {} has been stopped.", process.id),
            None => format!("No process with id {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devshell_core::{DeckMode, DeviceScreen, Intent, MockResponder};

    #[test]
    fn test_monitor_reply_updates_deck() {
        let mut shell = Shell::new();
        shell.push_user("show cpu");
        shell.accept_reply(MockResponder::reply_for(Intent::Monitor));

        assert_eq!(shell.messages().len(), 2);
        assert!(shell.deck().is_open());
        assert_eq!(shell.deck().mode(), DeckMode::Web);
        assert_eq!(shell.processes().running(), 1);
        assert_eq!(shell.status(), "System Active");
    }

    #[test]
    fn test_monitor_reply_blanks_device() {
        let mut shell = Shell::new();
        shell.accept_reply(MockResponder::reply_for(Intent::Clock));
        assert_eq!(shell.deck().screen(), Some(DeviceScreen::Clock));
        shell.accept_reply(MockResponder::reply_for(Intent::Monitor));
        assert_eq!(shell.deck().screen(), None);
    }

    #[test]
    fn test_new_chat_keeps_processes() {
        let mut shell = Shell::new();
        shell.accept_reply(MockResponder::reply_for(Intent::Monitor));
        shell.new_chat();

        assert!(shell.messages().is_empty());
        assert!(!shell.deck().is_open());
        assert_eq!(shell.status(), "1 Running");
    }

    #[test]
    fn test_settled_approvals_newest_first() {
        let mut shell = Shell::new();
        let older = shell.accept_reply(MockResponder::reply_for(Intent::Script));
        let newer = shell.accept_reply(MockResponder::reply_for(Intent::Script));
        shell.accept_reply(MockResponder::reply_for(Intent::General));

        let (message, index) = shell.settled_approval(None).unwrap();
        assert_eq!((message.id, index), (newer.id, 1));
        let (message, _) = shell.settled_approval(Some(newer.id)).unwrap();
        assert_eq!(message.id, older.id);

        assert_eq!(
            shell.decide_settled(None, ApprovalDecision::Deny),
            Some(Ok(ApprovalDecision::Deny))
        );
        assert_eq!(
            shell.decide_settled(None, ApprovalDecision::AllowOnce),
            Some(Ok(ApprovalDecision::AllowOnce))
        );
        assert_eq!(shell.ledger().decision(newer.id, 1), Some(ApprovalDecision::Deny));
        assert_eq!(shell.ledger().decision(older.id, 1), Some(ApprovalDecision::AllowOnce));
        assert_eq!(shell.decide_settled(None, ApprovalDecision::Deny), None);
    }

    #[test]
    fn test_kill_reports_outcome() {
        let mut shell = Shell::new();
        shell.accept_reply(MockResponder::reply_for(Intent::Monitor));
        assert_eq!(
            shell.kill("proc_8821"),
            "Process Terminated: PID proc_8821 has been stopped."
        );
        assert_eq!(shell.kill("proc_8821"), "No process with id proc_8821");
    }

    #[test]
    fn test_deck_commands() {
        let mut shell = Shell::new();
        shell.apply_deck(DeckCommand::Open(DeckMode::Files));
        assert_eq!(shell.deck().mode(), DeckMode::Files);
        shell.apply_deck(DeckCommand::Cycle);
        assert_eq!(shell.deck().mode(), DeckMode::System);
        shell.apply_deck(DeckCommand::Close);
        assert!(!shell.deck().is_open());
    }
}
