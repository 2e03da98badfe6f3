//! Rendering of the action blocks attached to assistant messages

use crate::theme::Theme;
use devshell_core::{ActionKind, ActionView, ApprovalDecision, Visibility};
use ratatui::{
    style::Modifier,
    text::{Line, Span},
};

/// Number of output lines a terminal block keeps on screen
pub const TERMINAL_TAIL: usize = 8;

/// Lines for one unlocked action, indented under its message.
///
/// `decision` is what the user chose for an approval item, if anything.
pub fn action_lines(
    view: &ActionView<'_>,
    decision: Option<ApprovalDecision>,
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(6).max(1);
    let streaming = view.mode == Visibility::Streaming;
    let mut lines = Vec::new();

    match view.item.kind {
        ActionKind::Thinking => {
            let marker = if view.expanded { "▾" } else { "▸" };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("{marker} Thinking Process"), theme.dim_style()),
            ]));
            if view.expanded {
                for line in textwrap::wrap(view.text, body_width) {
                    lines.push(Line::from(vec![
                        Span::styled("  │ ", theme.border_style()),
                        Span::styled(line.into_owned(), theme.thinking_style()),
                    ]));
                }
            }
        }
        ActionKind::Terminal => {
            let title = view.item.title.as_deref().unwrap_or("Terminal");
            let mut header = vec![
                Span::raw("  "),
                Span::styled(
                    format!("❯ {title}"),
                    theme.terminal_style().add_modifier(Modifier::BOLD),
                ),
            ];
            if streaming {
                header.push(Span::styled("  running", theme.accent_style()));
            }
            lines.push(Line::from(header));

            let output: Vec<&str> = view.text.lines().collect();
            let hidden = output.len().saturating_sub(TERMINAL_TAIL);
            if hidden > 0 {
                lines.push(Line::from(Span::styled(
                    format!("  │ … {hidden} earlier lines"),
                    theme.dim_style(),
                )));
            }
            for line in &output[hidden..] {
                let clipped: String = line.chars().take(body_width).collect();
                lines.push(Line::from(vec![
                    Span::styled("  │ ", theme.border_style()),
                    Span::styled(clipped, theme.terminal_style()),
                ]));
            }
        }
        ActionKind::Approval => {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled("⚠ Permission Required", theme.warning_bold()),
            ]));
            for line in textwrap::wrap(view.text, body_width) {
                lines.push(Line::from(format!("    {line}")));
            }
            let footer = match decision {
                Some(decision) => {
                    let style = if decision.is_allowed() {
                        theme.success_style()
                    } else {
                        theme.error_style()
                    };
                    Span::styled(format!("    {}", decision.label()), style)
                }
                None => Span::styled(
                    "    Ctrl+Y allow once · Ctrl+A always allow · Ctrl+N deny",
                    theme.accent_style(),
                ),
            };
            lines.push(Line::from(footer));
        }
        ActionKind::Done => {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("✔ {}", view.text), theme.success_style()),
            ]));
        }
    }

    lines
}
