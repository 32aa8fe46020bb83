use crate::app_config::ConfigStore;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// The executables shipped in a TES3MP installation that the launcher can
/// start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Client,
    Launcher,
    Wizard,
    Browser,
    Server,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Client,
        Tool::Launcher,
        Tool::Wizard,
        Tool::Browser,
        Tool::Server,
    ];

    pub fn executable(self) -> &'static str {
        match self {
            Tool::Client => "tes3mp.exe",
            Tool::Launcher => "openmw-launcher.exe",
            Tool::Wizard => "openmw-wizard.exe",
            Tool::Browser => "tes3mp-browser.exe",
            Tool::Server => "tes3mp-server.exe",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Client => "TES3MP",
            Tool::Launcher => "OpenMW launcher",
            Tool::Wizard => "OpenMW wizard",
            Tool::Browser => "TES3MP browser",
            Tool::Server => "TES3MP server",
        }
    }

    pub fn started_event(self) -> &'static str {
        match self {
            Tool::Client => "tes3mp-started",
            Tool::Launcher => "openmw-launcher-started",
            Tool::Wizard => "openmw-wizard-started",
            Tool::Browser => "tes3mp-browser-started",
            Tool::Server => "tes3mp-server-started",
        }
    }

    pub fn exited_event(self) -> &'static str {
        match self {
            Tool::Client => "tes3mp-exited",
            Tool::Launcher => "openmw-launcher-exited",
            Tool::Wizard => "openmw-wizard-exited",
            Tool::Browser => "tes3mp-browser-exited",
            Tool::Server => "tes3mp-server-exited",
        }
    }

    fn exit_message(self, success: bool) -> String {
        if success {
            format!("{} completed successfully", self.display_name())
        } else {
            format!("{} exited with an error", self.display_name())
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Body of every `*-exited` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPayload {
    pub pid: u32,
    pub success: bool,
    /// `None` when the process was killed by a signal or could not be waited
    /// on.
    pub exit_code: Option<i32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started { tool: Tool, pid: u32 },
    Exited { tool: Tool, payload: ExitPayload },
}

impl ProcessEvent {
    pub fn tool(&self) -> Tool {
        match self {
            ProcessEvent::Started { tool, .. } | ProcessEvent::Exited { tool, .. } => *tool,
        }
    }

    /// Name the event is published under.
    pub fn channel(&self) -> &'static str {
        match self {
            ProcessEvent::Started { tool, .. } => tool.started_event(),
            ProcessEvent::Exited { tool, .. } => tool.exited_event(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaunchHandle {
    pub tool: Tool,
    pub pid: u32,
}

/// Starts tools and reports their lifecycle on an event channel. Every
/// launch produces one `Started` followed by exactly one `Exited`.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    events: UnboundedSender<ProcessEvent>,
}

impl ProcessSupervisor {
    pub fn new() -> (Self, UnboundedReceiver<ProcessEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }

    pub fn executable_path(install_dir: &Path, tool: Tool) -> PathBuf {
        install_dir.join(tool.executable())
    }

    /// Resolves the install dir from the config record and launches `tool`.
    pub fn launch_installed(&self, store: &ConfigStore, tool: Tool) -> CoreResult<LaunchHandle> {
        let config = store.require()?;
        if !config.is_installed() {
            return Err(CoreError::Config(
                "TES3MP is not installed, install it first".to_string(),
            ));
        }
        self.launch(&config.install_dir(), tool)
    }

    /// Spawns `tool` from `install_dir` and returns once it is running. Must
    /// be called within a Tokio runtime.
    pub fn launch(&self, install_dir: &Path, tool: Tool) -> CoreResult<LaunchHandle> {
        let exe = Self::executable_path(install_dir, tool);
        if !exe.exists() {
            return Err(CoreError::not_found(tool.display_name(), exe));
        }
        tracing::info!(%tool, path = %exe.display(), "launching");

        let mut child = command_for(tool, &exe)
            .spawn()
            .map_err(|e| CoreError::Process(format!("failed to run {tool}: {e}")))?;
        let pid = child
            .id()
            .ok_or_else(|| CoreError::Process(format!("{tool} exited before reporting a pid")))?;
        tracing::info!(%tool, pid, "started");

        // Started must be queued before the monitor can queue Exited.
        self.send(ProcessEvent::Started { tool, pid });

        let events = self.events.clone();
        tokio::spawn(async move {
            let payload = match child.wait().await {
                Ok(status) => {
                    tracing::info!(%tool, pid, code = ?status.code(), "exited");
                    ExitPayload {
                        pid,
                        success: status.success(),
                        exit_code: status.code(),
                        message: tool.exit_message(status.success()),
                    }
                }
                Err(err) => {
                    tracing::error!(%tool, pid, error = %err, "failed to wait for process");
                    ExitPayload {
                        pid,
                        success: false,
                        exit_code: None,
                        message: format!("Failed to wait for {tool}: {err}"),
                    }
                }
            };
            if events.send(ProcessEvent::Exited { tool, payload }).is_err() {
                tracing::warn!(%tool, pid, "event receiver dropped, exit not reported");
            }
        });

        Ok(LaunchHandle { tool, pid })
    }

    fn send(&self, event: ProcessEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("event receiver dropped");
        }
    }
}

#[cfg(windows)]
fn command_for(tool: Tool, exe: &Path) -> Command {
    if tool == Tool::Server {
        // Gives the server its own console window.
        let mut cmd = Command::new("powershell.exe");
        cmd.arg("-Command").arg(format!(
            "Start-Process -FilePath '{}' -WindowStyle Normal -PassThru | Wait-Process",
            exe.to_string_lossy().replace('\'', "''")
        ));
        return cmd;
    }
    Command::new(exe)
}

#[cfg(not(windows))]
fn command_for(_tool: Tool, exe: &Path) -> Command {
    Command::new(exe)
}
