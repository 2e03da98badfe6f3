//! Slash commands for interactive mode

use devshell_core::{DeckMode, ProcessTable};

/// What `/deck` asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCommand {
    /// Next tab (opens a closed deck)
    Cycle,
    Open(DeckMode),
    Close,
}

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Start a new conversation
    Clear,
    /// Change the deck
    Deck(DeckCommand),
    /// Terminate a mock process
    Kill(String),
    /// Show a message to the user
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, processes: &ProcessTable) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" | "new" => CommandResult::Clear,

        "quit" | "exit" | "q" => CommandResult::Exit,

        "deck" | "d" => deck_command(args),

        "ps" => CommandResult::Message(process_list(processes)),

        "kill" | "k" => {
            if args.is_empty() {
                CommandResult::Message("Usage: /kill <id>".to_string())
            } else {
                CommandResult::Kill(args.to_string())
            }
        }

        _ => CommandResult::Unknown(command),
    })
}

fn deck_command(args: &str) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Deck(DeckCommand::Cycle);
    }
    if args.eq_ignore_ascii_case("close") {
        return CommandResult::Deck(DeckCommand::Close);
    }
    match DeckMode::parse(args) {
        Some(mode) => CommandResult::Deck(DeckCommand::Open(mode)),
        None => CommandResult::Message(format!(
            "Unknown deck mode: {args} (device, web, files, system, close)"
        )),
    }
}

fn process_list(processes: &ProcessTable) -> String {
    if processes.list().is_empty() {
        return "System Idle".to_string();
    }
    let mut out = format!("{} Running", processes.running());
    for p in processes.list() {
        out.push_str(&format!("\n  {:<10} {:<14} {:>3}%", p.id, p.name, p.cpu));
    }
    out
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?            Show this help message
  /deck, /d [mode|close]   Cycle the deck, open it on a mode, or close it
                           (modes: device, web, files, system)
  /ps                      List running processes
  /kill, /k <id>           Terminate a process
  /clear, /c, /new         Start a new conversation
  /quit, /exit, /q         Exit devshell

Try asking to build a clock, show CPU usage, run a script, or open the files."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> Option<CommandResult> {
        execute_command(input, &ProcessTable::new())
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(run("build a clock"), None);
    }

    #[test]
    fn test_basic_commands() {
        assert_eq!(run("/quit"), Some(CommandResult::Exit));
        assert_eq!(run("  /CLEAR "), Some(CommandResult::Clear));
        assert_eq!(run("/bogus"), Some(CommandResult::Unknown("bogus".into())));
        assert!(matches!(run("/help"), Some(CommandResult::Message(m)) if m.contains("/deck")));
    }

    #[test]
    fn test_deck_command() {
        assert_eq!(run("/deck"), Some(CommandResult::Deck(DeckCommand::Cycle)));
        assert_eq!(
            run("/deck web"),
            Some(CommandResult::Deck(DeckCommand::Open(DeckMode::Web)))
        );
        assert_eq!(run("/deck Close"), Some(CommandResult::Deck(DeckCommand::Close)));
        assert!(matches!(run("/deck moon"), Some(CommandResult::Message(_))));
    }

    #[test]
    fn test_kill_needs_id() {
        assert_eq!(run("/kill proc_8821"), Some(CommandResult::Kill("proc_8821".into())));
        assert_eq!(
            run("/kill"),
            Some(CommandResult::Message("Usage: /kill <id>".into()))
        );
    }

    #[test]
    fn test_ps_lists_processes() {
        let mut processes = ProcessTable::new();
        assert_eq!(
            execute_command("/ps", &processes),
            Some(CommandResult::Message("System Idle".into()))
        );
        processes.start("proc_8821", "monitor.py", 12);
        let Some(CommandResult::Message(text)) = execute_command("/ps", &processes) else {
            panic!("expected a message");
        };
        assert!(text.starts_with("1 Running"));
        assert!(text.contains("monitor.py"));
    }
}
