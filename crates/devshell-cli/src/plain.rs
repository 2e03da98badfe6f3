//! Line mode: one-shot prompts and the stdin/stdout loop

use crate::commands::{self, CommandResult};
use crate::shell::Shell;
use devshell_core::{
    ActionKind, ApprovalDecision, Message, MessageReveal, Responder, RevealCadence, RevealEvent,
    spawn_reveal,
};
use std::io::{self, BufRead, Write};
use tokio::sync::mpsc;

/// How revealed text is written
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// One JSON object per reveal event instead of text
    pub json: bool,
    pub cadence: RevealCadence,
}

/// Result of sending one prompt
enum Outcome {
    Revealed(MessageReveal),
    Failed,
    /// Ctrl+C while waiting for the reply
    Interrupted,
}

/// What came back from a prompt
enum Input {
    Line(String),
    Eof,
    Interrupted,
}

/// User input for line mode: typed lines and Ctrl+C presses
struct Console {
    lines: mpsc::UnboundedReceiver<String>,
    interrupts: mpsc::UnboundedReceiver<()>,
}

impl Console {
    fn stdin() -> Self {
        Self {
            lines: stdin_lines(),
            interrupts: ctrl_c_presses(),
        }
    }

    async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Input> {
        print!("{prompt}");
        io::stdout().flush()?;
        Ok(tokio::select! {
            biased;
            Some(()) = self.interrupts.recv() => Input::Interrupted,
            line = self.lines.recv() => line.map_or(Input::Eof, Input::Line),
        })
    }
}

/// Read stdin on its own thread so an exit never waits for a pending read
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("failed to read stdin: {e}");
                    break;
                }
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Forward Ctrl+C presses. Once installed, SIGINT no longer ends the
/// process on its own, so every press must be acted on.
fn ctrl_c_presses() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run a single prompt, reveal the reply and exit
pub async fn run_command(
    responder: &dyn Responder,
    prompt: &str,
    output: Output,
) -> anyhow::Result<()> {
    let mut shell = Shell::new();
    let mut interrupts = ctrl_c_presses();
    if !output.json {
        println!("devshell> {}", prompt);
        println!();
    }
    respond(&mut shell, responder, prompt, output, &mut interrupts).await?;
    Ok(())
}

/// Interactive loop on stdin/stdout
pub async fn run_interactive(responder: &dyn Responder, output: Output) -> anyhow::Result<()> {
    if io::IsTerminal::is_terminal(&io::stderr()) {
        eprintln!("devshell ({})", Shell::new().status());
        eprintln!("Type /help for commands.");
        eprintln!();
    }
    interact(responder, output, Console::stdin()).await?;
    Ok(())
}

/// Prompt loop. Ctrl+C cancels a running reveal and exits anywhere else.
async fn interact(
    responder: &dyn Responder,
    output: Output,
    mut console: Console,
) -> anyhow::Result<Shell> {
    let mut shell = Shell::new();

    loop {
        let input = match console.read_line("> ").await? {
            Input::Line(line) => line,
            Input::Eof | Input::Interrupted => break,
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = commands::execute_command(input, shell.processes()) {
            match result {
                CommandResult::Clear => {
                    shell.new_chat();
                    println!("Started a new chat.");
                }
                CommandResult::Exit => break,
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Deck(command) => {
                    shell.apply_deck(command);
                    println!("{}", deck_line(&shell));
                }
                CommandResult::Kill(id) => println!("{}", shell.kill(&id)),
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        let outcome = respond(&mut shell, responder, input, output, &mut console.interrupts).await?;
        match outcome {
            Outcome::Revealed(reveal) => {
                if !output.json && !ask_for_approval(&mut shell, &reveal, &mut console).await? {
                    break;
                }
            }
            Outcome::Failed => {}
            Outcome::Interrupted => break,
        }
    }

    Ok(shell)
}

/// Send a prompt and reveal the reply. Ctrl+C cuts the reveal short.
async fn respond(
    shell: &mut Shell,
    responder: &dyn Responder,
    prompt: &str,
    output: Output,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> anyhow::Result<Outcome> {
    shell.push_user(prompt);
    let reply = tokio::select! {
        biased;
        Some(()) = interrupts.recv() => return Ok(Outcome::Interrupted),
        reply = responder.respond(prompt) => reply,
    };
    let reply = match reply {
        Ok(reply) => reply,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(Outcome::Failed);
        }
    };
    let has_effects = !reply.effects.is_empty();
    let message = shell.accept_reply(reply);

    let (tx, mut rx) = mpsc::channel(64);
    let task = spawn_reveal(MessageReveal::new(message.clone(), output.cadence), tx);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if output.json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    print_event(&message, &event);
                }
                io::stdout().flush()?;
            }
            Some(()) = interrupts.recv() => {
                task.cancel();
            }
        }
    }

    let reveal = task.join().await?;
    if has_effects && !output.json {
        println!("{}", deck_line(shell));
    }
    Ok(Outcome::Revealed(reveal))
}

fn print_event(message: &Message, event: &RevealEvent) {
    match event {
        RevealEvent::StageStarted { stage, .. } if *stage > 0 => {
            if let Some(item) = message.actions().get(stage - 1) {
                match item.kind {
                    ActionKind::Thinking => println!("[thinking]"),
                    ActionKind::Terminal => {
                        println!("[{}]", item.title.as_deref().unwrap_or("terminal"))
                    }
                    ActionKind::Approval => print!("[permission required] "),
                    ActionKind::Done => print!("✔ "),
                }
            }
        }
        RevealEvent::Delta { text, .. } => print!("{}", text),
        RevealEvent::StageCompleted { .. } => println!(),
        RevealEvent::Cancelled { .. } => println!("\n[cancelled]"),
        _ => {}
    }
}

fn deck_line(shell: &Shell) -> String {
    if shell.deck().is_open() {
        format!("[deck: {} | {}]", shell.deck().mode().label(), shell.status())
    } else {
        format!("[deck closed | {}]", shell.status())
    }
}

fn parse_decision(answer: &str) -> Option<ApprovalDecision> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(ApprovalDecision::approve(false)),
        "a" | "always" => Some(ApprovalDecision::approve(true)),
        "n" | "no" => Some(ApprovalDecision::Deny),
        _ => None,
    }
}

/// Ask about every approval the reveal unlocked. Returns false to quit.
async fn ask_for_approval(
    shell: &mut Shell,
    reveal: &MessageReveal,
    console: &mut Console,
) -> anyhow::Result<bool> {
    while let Some(index) = reveal.pending_approval(shell.ledger()) {
        let answer = match console.read_line("Allow? [y]es once / [a]lways / [n]o: ").await? {
            Input::Line(answer) => answer,
            Input::Eof | Input::Interrupted => return Ok(false),
        };
        let Some(decision) = parse_decision(&answer) else {
            continue;
        };
        match reveal.decide(index, decision, shell.ledger_mut()) {
            Ok(decision) => println!("{}", decision.label()),
            Err(e) => {
                tracing::debug!(index, "approval rejected: {e}");
                return Ok(true);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devshell_core::MockResponder;
    use std::time::Duration;

    #[test]
    fn test_parse_decision() {
        assert_eq!(parse_decision("Y\n"), Some(ApprovalDecision::AllowOnce));
        assert_eq!(parse_decision("always"), Some(ApprovalDecision::AllowAlways));
        assert_eq!(parse_decision("n"), Some(ApprovalDecision::Deny));
        assert_eq!(parse_decision("maybe"), None);
    }

    #[test]
    fn test_deck_line() {
        let mut shell = Shell::new();
        assert_eq!(deck_line(&shell), "[deck closed | System Normal]");
        shell.deck_mut().toggle_system();
        assert_eq!(deck_line(&shell), "[deck: System | System Active]");
    }

    fn console() -> (Console, mpsc::UnboundedSender<String>, mpsc::UnboundedSender<()>) {
        let (lines_tx, lines) = mpsc::unbounded_channel();
        let (interrupts_tx, interrupts) = mpsc::unbounded_channel();
        (Console { lines, interrupts }, lines_tx, interrupts_tx)
    }

    fn json_output() -> Output {
        Output {
            json: true,
            cadence: RevealCadence::uniform(Duration::from_millis(1)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_runs_to_completion() {
        let responder = MockResponder::new(Duration::ZERO);
        let mut shell = Shell::new();
        let (_tx, mut interrupts) = mpsc::unbounded_channel();
        let outcome = respond(
            &mut shell,
            &responder,
            "run the ping script",
            json_output(),
            &mut interrupts,
        )
        .await
        .unwrap();
        let Outcome::Revealed(reveal) = outcome else {
            panic!("reply was not revealed");
        };
        assert!(reveal.is_finished());
        assert_eq!(reveal.pending_approval(shell.ledger()), Some(1));
        assert_eq!(shell.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_c_at_prompt_exits() {
        let responder = MockResponder::new(Duration::ZERO);
        let (console, lines, interrupts) = console();
        lines.send("run the ping script".to_string()).unwrap();
        interrupts.send(()).unwrap();

        let shell = interact(&responder, json_output(), console).await.unwrap();
        assert!(shell.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_c_while_waiting_exits() {
        let responder = MockResponder::new(Duration::from_secs(10));
        let (console, lines, interrupts) = console();
        lines.send("hello".to_string()).unwrap();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let _ = interrupts.send(());
        });

        let shell = interact(&responder, json_output(), console).await.unwrap();
        // Only the prompt, no reply
        assert_eq!(shell.messages().len(), 1);
        drop(lines);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eof_ends_session() {
        let responder = MockResponder::new(Duration::ZERO);
        let (console, lines, _interrupts) = console();
        lines.send("show cpu".to_string()).unwrap();
        drop(lines);

        let shell = interact(&responder, json_output(), console).await.unwrap();
        assert_eq!(shell.messages().len(), 2);
        assert_eq!(shell.processes().running(), 1);
    }
}
