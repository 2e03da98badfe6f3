//! devshell - conversational device shell for the terminal

mod commands;
mod config;
mod plain;
mod shell;
mod ui;

use clap::Parser;
use devshell_core::{MockResponder, Responder};
use devshell_tui::Theme;
use std::sync::Arc;
use std::time::Duration;

/// devshell - ask for tools, watch them get built
#[derive(Parser, Debug)]
#[command(name = "devshell")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Print reveal events as JSON lines (line modes only)
    #[arg(long)]
    json: bool,

    /// Color theme (dark, light)
    #[arg(long)]
    theme: Option<String>,

    /// Delay before a reply appears, in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing; stdout belongs to the UI
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("devshell=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let theme_name = args.theme.unwrap_or_else(|| cfg.theme.clone());
    let theme = Theme::by_name(&theme_name).unwrap_or_else(|| {
        tracing::warn!(theme = %theme_name, "unknown theme, using dark");
        Theme::dark()
    });
    let latency = args
        .latency_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| cfg.latency());
    let cadence = cfg.reveal_cadence();
    let use_tui = !args.no_tui && cfg.tui;

    let responder: Arc<dyn Responder> = Arc::new(MockResponder::new(latency));
    let output = plain::Output {
        json: args.json,
        cadence,
    };

    // Non-interactive mode
    if let Some(command) = args.command {
        return plain::run_command(responder.as_ref(), &command, output).await;
    }

    if use_tui && !args.json {
        return ui::run_tui(theme, cadence, responder).await;
    }

    plain::run_interactive(responder.as_ref(), output).await
}
