//! runlens - terminal inspector for agent execution events

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};

use runlens::config::Settings;
use runlens::render::Registry;
use runlens::source::db::EventDb;
use runlens::ui::filter::FilterCriteria;
use runlens::ui::state::AppState;
use runlens::{cli, interrupt, output, source, ui};

fn main() -> ExitCode {
    match run() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = cli::Args::parse_args();

    if let Err(e) = output::logger::init() {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let settings = Settings::load(args.config.as_deref(), args.max_events)?;
    if let Some(path) = &settings.source {
        tracing::info!("Config file: {}", path.display());
    }

    let stream = args
        .stream(std::io::stdin().is_terminal())
        .map_err(|msg| anyhow!(msg))?;

    let preload = match (args.db_query(), &args.db) {
        (Some(query), Some(path)) => EventDb::open(path)?
            .load(&query)
            .with_context(|| format!("Failed to load events from {}", path.display()))?,
        _ => Vec::new(),
    };

    let criteria = FilterCriteria::from_types(args.types.iter().cloned());
    let registry = Registry::with_builtin();

    let (tx, mut rx) = source::channel();
    let _feeder = source::spawn_feeder(preload, stream, tx)?;

    let mode = ui::UiMode::resolve(args.no_ui);
    if ui::should_enable(mode) {
        let mut state = AppState::new(registry, settings.keys, settings.max_events)
            .with_auto_scroll(settings.auto_scroll)
            .with_criteria(criteria);
        ui::run(&mut state, &mut rx, settings.tick)?;
    } else {
        tracing::info!(?mode, "interactive viewer disabled, printing plain lines");
        interrupt::register_signal_handler().context("Failed to install Ctrl+C handler")?;
        let printed = output::formatter::stream(&rx, &registry, &criteria)?;
        output::formatter::print_summary(printed);
        if interrupt::is_interrupted() {
            return Ok(ExitCode::from(130));
        }
    }

    Ok(ExitCode::SUCCESS)
}
