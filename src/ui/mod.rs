//! Interactive viewer: mode selection and session entry point.

pub mod app;
pub mod filter;
pub mod keys;
pub mod state;
pub mod theme;
pub mod view;

use std::env;
use std::io::IsTerminal;

use anyhow::{Context, Result};

use crate::source::EventSource;
use crate::ui::state::AppState;

pub use state::{Command, Message, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    On,
    Off,
}

impl UiMode {
    fn from_env() -> Self {
        Self::parse(env::var("RUNLENS_UI").ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("1" | "true" | "on") => Self::On,
            Some("0" | "false" | "off") => Self::Off,
            _ => Self::Auto,
        }
    }

    pub fn resolve(no_ui_flag: bool) -> Self {
        if no_ui_flag {
            Self::Off
        } else {
            Self::from_env()
        }
    }
}

/// Whether the interactive viewer can run in this terminal.
pub fn should_enable(mode: UiMode) -> bool {
    should_enable_for(
        mode,
        std::io::stdout().is_terminal(),
        std::io::stderr().is_terminal(),
    )
}

fn should_enable_for(mode: UiMode, stdout_is_tty: bool, stderr_is_tty: bool) -> bool {
    match mode {
        UiMode::Off => false,
        UiMode::Auto | UiMode::On => stdout_is_tty && stderr_is_tty,
    }
}

/// Take over the terminal and run the viewer until the operator quits.
pub fn run(
    state: &mut AppState,
    source: &mut dyn EventSource,
    tick: std::time::Duration,
) -> Result<()> {
    tracing::info!(tick_ms = tick.as_millis() as u64, "starting interactive viewer");
    app::run(state, source, tick).context("Terminal UI failed")?;
    let stats = state.stats();
    tracing::info!(
        received = stats.received,
        evicted = stats.evicted,
        "viewer closed"
    );
    Ok(())
}
