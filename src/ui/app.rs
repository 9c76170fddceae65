//! UI runtime loop backed by ratatui + crossterm.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self as term, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::source::EventSource;
use crate::ui::state::{AppState, Command, Message, INGEST_BUDGET};
use crate::ui::view;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Puts the terminal back on drop, including on early returns.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

/// Run the viewer until the operator quits.
pub(super) fn run(
    state: &mut AppState,
    source: &mut dyn EventSource,
    tick: Duration,
) -> io::Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let size = terminal.size()?;
    state.update(Message::Resize {
        width: size.width,
        height: size.height,
    });

    event_loop(&mut terminal, state, source, tick)
}

fn event_loop(
    terminal: &mut Term,
    state: &mut AppState,
    source: &mut dyn EventSource,
    tick: Duration,
) -> io::Result<()> {
    loop {
        if state.update(Message::Tick) == Some(Command::CheckForEvents) {
            state.pump(source, INGEST_BUDGET);
        }

        terminal.draw(|frame| view::render(frame, state))?;

        if !term::poll(tick)? {
            continue;
        }
        // Drain everything pending so held keys and pastes cost one redraw.
        loop {
            let command = match term::read()? {
                term::Event::Key(key) if key.kind == KeyEventKind::Press => {
                    state.update(Message::Key(key))
                }
                term::Event::Resize(width, height) => {
                    state.update(Message::Resize { width, height })
                }
                _ => None,
            };
            if command == Some(Command::Quit) {
                return Ok(());
            }
            if !term::poll(Duration::ZERO)? {
                break;
            }
        }
    }
}
