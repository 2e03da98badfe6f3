//! The system deck: side-panel mode state and the mock process table

use serde::{Deserialize, Serialize};

/// What the side panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckMode {
    /// Simulated e-ink device screen
    #[default]
    Device,
    /// Web preview
    Web,
    /// Workspace file browser
    Files,
    /// Process monitor
    System,
}

impl DeckMode {
    pub const ALL: [DeckMode; 4] = [
        DeckMode::Device,
        DeckMode::Web,
        DeckMode::Files,
        DeckMode::System,
    ];

    /// Tab label
    pub fn label(self) -> &'static str {
        match self {
            DeckMode::Device => "Device",
            DeckMode::Web => "Web",
            DeckMode::Files => "Files",
            DeckMode::System => "System",
        }
    }

    /// Parse a mode name as typed by the user
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "device" | "d" => Some(DeckMode::Device),
            "web" | "w" => Some(DeckMode::Web),
            "files" | "file" | "f" => Some(DeckMode::Files),
            "system" | "sys" | "s" => Some(DeckMode::System),
            _ => None,
        }
    }

    fn next(self) -> Self {
        match self {
            DeckMode::Device => DeckMode::Web,
            DeckMode::Web => DeckMode::Files,
            DeckMode::Files => DeckMode::System,
            DeckMode::System => DeckMode::Device,
        }
    }
}

/// App currently pushed to the simulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceScreen {
    Clock,
}

/// Side effect a reply has on the deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeckEffect {
    /// Open the deck on `mode`
    Open { mode: DeckMode },
    /// Push an app to the device screen
    ShowOnDevice { screen: DeviceScreen },
    /// Blank the device screen
    ClearDevice,
    /// Point the web preview at a URL
    Browse { url: String },
    /// Start a mock process (ignored if one with the same name runs)
    StartProcess { id: String, name: String, cpu: u8 },
}

/// Status of a mock process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Stopped,
    Error,
}

/// A mock process shown in the system view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: String,
    pub name: String,
    pub status: ProcessStatus,
    /// CPU usage in percent
    pub cpu: u8,
}

/// Mock process table
#[derive(Debug, Default)]
pub struct ProcessTable {
    processes: Vec<Process>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a process unless one with the same name is already listed.
    /// Returns whether a process was added.
    pub fn start(&mut self, id: impl Into<String>, name: impl Into<String>, cpu: u8) -> bool {
        let name = name.into();
        if self.processes.iter().any(|p| p.name == name) {
            return false;
        }
        let id = id.into();
        tracing::info!(%id, %name, "process started");
        self.processes.push(Process {
            id,
            name,
            status: ProcessStatus::Running,
            cpu,
        });
        true
    }

    /// Remove a process by id
    pub fn kill(&mut self, id: &str) -> Option<Process> {
        let index = self.processes.iter().position(|p| p.id == id)?;
        let process = self.processes.remove(index);
        tracing::info!(id = %process.id, name = %process.name, "process terminated");
        Some(process)
    }

    /// All listed processes
    pub fn list(&self) -> &[Process] {
        &self.processes
    }

    /// Number of running processes
    pub fn running(&self) -> usize {
        self.processes
            .iter()
            .filter(|p| p.status == ProcessStatus::Running)
            .count()
    }
}

/// Side-panel state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    open: bool,
    mode: DeckMode,
    screen: Option<DeviceScreen>,
    url: Option<String>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> DeckMode {
        self.mode
    }

    /// App on the device screen
    pub fn screen(&self) -> Option<DeviceScreen> {
        self.screen
    }

    /// URL loaded in the web preview
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Open on `mode`
    pub fn open(&mut self, mode: DeckMode) {
        self.open = true;
        self.mode = mode;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Header button behaviour: open on system, close if already showing
    /// system, otherwise switch to system.
    pub fn toggle_system(&mut self) {
        if self.open && self.mode == DeckMode::System {
            self.open = false;
        } else {
            self.open(DeckMode::System);
        }
    }

    /// Move to the next tab (opens the deck if closed)
    pub fn cycle_mode(&mut self) {
        if self.open {
            self.mode = self.mode.next();
        } else {
            self.open = true;
        }
    }

    /// Apply a reply's side effect
    pub fn apply(&mut self, effect: &DeckEffect, processes: &mut ProcessTable) {
        match effect {
            DeckEffect::Open { mode } => self.open(*mode),
            DeckEffect::ShowOnDevice { screen } => self.screen = Some(*screen),
            DeckEffect::ClearDevice => self.screen = None,
            DeckEffect::Browse { url } => self.url = Some(url.clone()),
            DeckEffect::StartProcess { id, name, cpu } => {
                processes.start(id.as_str(), name.as_str(), *cpu);
            }
        }
    }

    /// Reset for a new conversation. The device keeps its app.
    pub fn reset(&mut self) {
        self.open = false;
        self.mode = DeckMode::Device;
    }
}

/// Header status label
pub fn status_label(deck: &Deck, processes: &ProcessTable) -> String {
    if deck.is_open() {
        "System Active".to_string()
    } else if processes.running() > 0 {
        format!("{} Running", processes.running())
    } else {
        "System Normal".to_string()
    }
}

/// Entry in the workspace file tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode {
    File(&'static str),
    Folder(&'static str, Vec<FileNode>),
}

/// The mock project workspace shown in files mode
pub fn workspace_tree() -> Vec<FileNode> {
    vec![
        FileNode::Folder(
            "app",
            vec![
                FileNode::File("main.py"),
                FileNode::File("utils.py"),
                FileNode::File("styles.css"),
            ],
        ),
        FileNode::Folder(
            "config",
            vec![
                FileNode::File("settings.json"),
                FileNode::File("secrets.env"),
            ],
        ),
        FileNode::Folder(
            "logs",
            vec![FileNode::File("startup.log"), FileNode::File("error.log")],
        ),
        FileNode::File("README.md"),
    ]
}
