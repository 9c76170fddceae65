//! Plain line output with ANSI colors, used when the interactive viewer is off.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::event::Event;
use crate::interrupt;
use crate::render::Registry;
use crate::ui::filter::FilterCriteria;

/// How often the plain stream re-checks for Ctrl+C while idle.
const INTERRUPT_POLL: Duration = Duration::from_millis(100);

/// One colored line: `<time> <title>  <description>`.
pub fn format_event(event: &Event, registry: &Registry) -> String {
    let (title, description) = registry.summarize(event);
    let title = if title.starts_with('❌') {
        title.red().bold()
    } else {
        title.bold()
    };
    format!(
        "{} {}  {}",
        event.display_time().dimmed(),
        title,
        description.dimmed()
    )
}

/// Print events from `rx` until the source closes or Ctrl+C is pressed.
///
/// Returns the number of events printed.
pub fn stream(rx: &Receiver<Event>, registry: &Registry, criteria: &FilterCriteria) -> Result<usize> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut printed = 0usize;

    loop {
        if interrupt::is_interrupted() {
            tracing::info!(printed, "plain output interrupted");
            break;
        }
        match rx.recv_timeout(INTERRUPT_POLL) {
            Ok(event) => {
                if !criteria.matches(&event.event_type) {
                    continue;
                }
                writeln!(out, "{}", format_event(&event, registry))
                    .context("Failed to write event line")?;
                printed += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    out.flush().context("Failed to flush output")?;
    Ok(printed)
}

/// Closing summary for plain mode.
pub fn print_summary(printed: usize) {
    eprintln!("{}", format!("✓ {printed} events").green());
}
