use crate::config::PauseMode;
use anyhow::{anyhow, Context};
use std::io::{self, BufRead, IsTerminal};
use sysinfo::{ProcessesToUpdate, System};

/// Parent processes that mean the tool was started by double-click or by
/// dropping files onto the executable.
const FILE_MANAGERS: &[&str] = &[
    "explorer.exe",
    "nautilus",
    "dolphin",
    "thunar",
    "nemo",
    "caja",
    "pcmanfm",
    "pcmanfm-qt",
];

/// How the process was started, as far as the exit pause is concerned.
pub trait LaunchContext {
    /// stdin is a pipe or file rather than an interactive terminal.
    fn is_input_redirected(&self) -> bool;

    /// Started from a file manager window rather than a shell.
    fn is_drop_launch(&self) -> bool;
}

/// Inspects the real process: stdin and the parent process name.
#[derive(Debug, Default)]
pub struct SystemLaunchContext;

impl SystemLaunchContext {
    pub fn new() -> Self {
        Self
    }
}

impl LaunchContext for SystemLaunchContext {
    fn is_input_redirected(&self) -> bool {
        is_input_redirected()
    }

    fn is_drop_launch(&self) -> bool {
        match parent_process_name() {
            Ok(name) => {
                tracing::debug!(parent = %name, "detected parent process");
                is_file_manager(&name)
            }
            Err(e) => {
                tracing::debug!(error = %e, "parent process lookup failed");
                false
            }
        }
    }
}

/// Fixed answers, for callers that already know how they were launched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLaunchContext {
    pub input_redirected: bool,
    pub drop_launch: bool,
}

impl LaunchContext for StaticLaunchContext {
    fn is_input_redirected(&self) -> bool {
        self.input_redirected
    }

    fn is_drop_launch(&self) -> bool {
        self.drop_launch
    }
}

/// stdin of the current process is a pipe or file.
pub fn is_input_redirected() -> bool {
    !io::stdin().is_terminal()
}

pub fn is_file_manager(process_name: &str) -> bool {
    FILE_MANAGERS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(process_name))
}

/// Whether to wait for Enter before exiting. Redirected input never pauses.
pub fn should_pause(context: &dyn LaunchContext, mode: PauseMode) -> bool {
    if context.is_input_redirected() {
        return false;
    }

    match mode {
        PauseMode::Never => false,
        PauseMode::Always => true,
        PauseMode::Auto => context.is_drop_launch(),
    }
}

/// Blocks until a line (or EOF) is read from stdin.
pub fn wait_for_enter() {
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

fn parent_process_name() -> anyhow::Result<String> {
    let pid = sysinfo::get_current_pid().map_err(|e| anyhow!(e))?;

    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    let parent = system
        .process(pid)
        .and_then(|process| process.parent())
        .context("current process has no parent")?;

    system.refresh_processes(ProcessesToUpdate::Some(&[parent]), true);
    let name = system
        .process(parent)
        .with_context(|| format!("parent process {} is not visible", parent))?
        .name()
        .to_string_lossy()
        .into_owned();

    Ok(name)
}
