//! System deck side panel

use crate::theme::Theme;
use devshell_core::{Deck, DeckMode, DeviceScreen, FileNode, ProcessStatus, ProcessTable};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// CPU history drawn as bars in the web preview
const CPU_HISTORY: [u8; 15] = [10, 15, 8, 12, 20, 15, 12, 8, 5, 12, 18, 14, 10, 8, 12];

const BAR_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Side panel showing the deck's current mode
pub struct DeckPanel<'a> {
    deck: &'a Deck,
    processes: &'a ProcessTable,
    files: &'a [FileNode],
    theme: &'a Theme,
}

impl<'a> DeckPanel<'a> {
    pub fn new(
        deck: &'a Deck,
        processes: &'a ProcessTable,
        files: &'a [FileNode],
        theme: &'a Theme,
    ) -> Self {
        Self {
            deck,
            processes,
            files,
            theme,
        }
    }

    fn tabs(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for mode in DeckMode::ALL {
            let style = if mode == self.deck.mode() {
                self.theme.accent_bold().add_modifier(Modifier::REVERSED)
            } else {
                self.theme.dim_style()
            };
            spans.push(Span::styled(format!(" {} ", mode.label()), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    /// Body lines for the current mode
    pub fn body(&self) -> Vec<Line<'static>> {
        match self.deck.mode() {
            DeckMode::Device => self.device(),
            DeckMode::Web => self.web(),
            DeckMode::Files => self.files(),
            DeckMode::System => self.system(),
        }
    }

    fn device(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from("")];
        match self.deck.screen() {
            Some(DeviceScreen::Clock) => {
                lines.push(Line::from(Span::styled(
                    "  12:45",
                    self.theme.base_style().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled("  WEDNESDAY", self.theme.dim_style())));
                lines.push(Line::from(""));
                lines.push(Line::from("  72°F  AQI 12"));
            }
            None => {
                lines.push(Line::from(Span::styled("  No Signal", self.theme.dim_style())));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Distiller Alpha",
            self.theme.border_style(),
        )));
        lines
    }

    fn web(&self) -> Vec<Line<'static>> {
        let Some(url) = self.deck.url() else {
            return vec![
                Line::from(""),
                Line::from(Span::styled("  No Active Web Process", self.theme.dim_style())),
            ];
        };

        let stat = |label: &str, value: &str, detail: &str| {
            Line::from(vec![
                Span::styled(format!("  {label:<9}"), self.theme.dim_style()),
                Span::styled(
                    value.to_string(),
                    self.theme.base_style().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {detail}"), self.theme.dim_style()),
            ])
        };
        let levels = BAR_LEVELS.len();
        let bars: String = CPU_HISTORY
            .iter()
            .map(|v| BAR_LEVELS[(*v as usize * levels / 21).min(levels - 1)])
            .collect();

        vec![
            Line::from(Span::styled(format!("  {url}"), self.theme.link_style())),
            Line::from(""),
            stat("CPU", "12%", "ARM Cortex-A53"),
            Line::from(Span::styled(format!("  {bars}"), self.theme.success_style())),
            stat("Memory", "1.2 GB", "of 4 GB"),
            stat("Storage", "14 GB", "/dev/mmcblk0"),
            stat("Network", "pamir-guest-5g", "192.168.1.42"),
        ]
    }

    fn files(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled("  workspace", self.theme.dim_style()))];
        push_tree(&mut lines, self.files, 1, self.theme);
        lines
    }

    fn system(&self) -> Vec<Line<'static>> {
        let running = self.processes.running();
        if self.processes.list().is_empty() {
            return vec![
                Line::from(""),
                Line::from(Span::styled("  System Idle", self.theme.dim_style())),
            ];
        }
        let mut lines = vec![Line::from(Span::styled(
            format!("  {running} Running"),
            self.theme.accent_bold(),
        ))];
        for process in self.processes.list() {
            let (dot, style) = match process.status {
                ProcessStatus::Running => ("●", self.theme.success_style()),
                ProcessStatus::Stopped => ("○", self.theme.dim_style()),
                ProcessStatus::Error => ("●", self.theme.error_style()),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {dot} "), style),
                Span::raw(format!("{:<14}", process.name)),
                Span::styled(format!("{:>3}% ", process.cpu), self.theme.dim_style()),
                Span::styled(process.id.clone(), self.theme.border_style()),
            ]));
        }
        lines
    }
}

fn push_tree(lines: &mut Vec<Line<'static>>, nodes: &[FileNode], depth: usize, theme: &Theme) {
    let indent = "  ".repeat(depth + 1);
    for node in nodes {
        match node {
            FileNode::Folder(name, children) => {
                lines.push(Line::from(Span::styled(
                    format!("{indent}▾ {name}/"),
                    theme.accent_style(),
                )));
                push_tree(lines, children, depth + 1, theme);
            }
            FileNode::File(name) => {
                lines.push(Line::from(format!("{indent}  {name}")));
            }
        }
    }
}

impl Widget for DeckPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(self.theme.border_style())
            .title(Span::styled(" System Deck ", self.theme.dim_style()));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let mut lines = vec![self.tabs(), Line::from("")];
        lines.extend(self.body());
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devshell_core::{DeckEffect, workspace_tree};

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_device_without_app() {
        let deck = Deck::new();
        let processes = ProcessTable::new();
        let theme = Theme::dark();
        let panel = DeckPanel::new(&deck, &processes, &[], &theme);
        assert!(text(&panel.body()).contains(&"  No Signal".to_string()));
    }

    #[test]
    fn test_device_clock_face() {
        let mut deck = Deck::new();
        let mut processes = ProcessTable::new();
        deck.apply(
            &DeckEffect::ShowOnDevice {
                screen: DeviceScreen::Clock,
            },
            &mut processes,
        );
        let theme = Theme::dark();
        let body = text(&DeckPanel::new(&deck, &processes, &[], &theme).body());
        assert_eq!(body[1], "  12:45");
        assert_eq!(body[2], "  WEDNESDAY");
    }

    #[test]
    fn test_web_needs_url() {
        let mut deck = Deck::new();
        deck.open(DeckMode::Web);
        let mut processes = ProcessTable::new();
        let theme = Theme::dark();
        let body = text(&DeckPanel::new(&deck, &processes, &[], &theme).body());
        assert_eq!(body[1], "  No Active Web Process");

        deck.apply(
            &DeckEffect::Browse {
                url: "http://localhost:3000/monitor".into(),
            },
            &mut processes,
        );
        let body = text(&DeckPanel::new(&deck, &processes, &[], &theme).body());
        assert_eq!(body[0], "  http://localhost:3000/monitor");
        assert!(body[2].starts_with("  CPU"));
    }

    #[test]
    fn test_files_tree() {
        let mut deck = Deck::new();
        deck.open(DeckMode::Files);
        let processes = ProcessTable::new();
        let theme = Theme::dark();
        let tree = workspace_tree();
        let body = text(&DeckPanel::new(&deck, &processes, &tree, &theme).body());
        assert_eq!(body[1], "    ▾ app/");
        assert_eq!(body[2], "        main.py");
        assert_eq!(body.last().unwrap(), "      README.md");
    }

    #[test]
    fn test_system_lists_processes() {
        let mut deck = Deck::new();
        deck.open(DeckMode::System);
        let mut processes = ProcessTable::new();
        let theme = Theme::dark();
        let body = text(&DeckPanel::new(&deck, &processes, &[], &theme).body());
        assert_eq!(body[1], "  System Idle");

        processes.start("proc_8821", "monitor.py", 12);
        let body = text(&DeckPanel::new(&deck, &processes, &[], &theme).body());
        assert_eq!(body[0], "  1 Running");
        assert!(body[1].contains("monitor.py"));
        assert!(body[1].ends_with("proc_8821"));
    }
}
