//! CLI argument parsing using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::source::db::{DbQuery, DEFAULT_LIMIT};
use crate::source::Stream;

/// Terminal inspector for agent execution events.
///
/// Reads newline-delimited JSON events from a file or stdin, and/or loads a
/// run from the engine's SQLite database, then lets you browse, filter and
/// drill into them.
#[derive(Parser, Debug)]
#[command(name = "runlens", version, about, long_about = None)]
pub struct Args {
    /// NDJSON event file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Keep reading INPUT as it grows
    #[arg(long)]
    pub follow: bool,

    /// Maximum events kept in memory; 0 = unlimited
    #[arg(long, value_name = "N", env = "RUNLENS_MAX_EVENTS")]
    pub max_events: Option<usize>,

    /// Load events from this SQLite database before streaming
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Load the events of one run
    #[arg(long, value_name = "ID", requires = "db", conflicts_with_all = ["latest_run", "start_time", "limit"])]
    pub run_id: Option<String>,

    /// Load the events of the most recent run
    #[arg(long, requires = "db", conflicts_with_all = ["start_time", "limit"])]
    pub latest_run: bool,

    /// Start of a timestamp range to load (inclusive)
    #[arg(long, value_name = "TS", requires_all = ["db", "end_time"], conflicts_with = "limit")]
    pub start_time: Option<String>,

    /// End of a timestamp range to load (inclusive)
    #[arg(long, value_name = "TS", requires = "start_time")]
    pub end_time: Option<String>,

    /// Load the latest N events (default 100)
    #[arg(long, value_name = "N", requires = "db")]
    pub limit: Option<usize>,

    /// Only show these event types (repeatable)
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// Config file instead of the discovered .runlens.toml
    #[arg(long, value_name = "PATH", env = "RUNLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print events as plain lines instead of the interactive viewer
    #[arg(long)]
    pub no_ui: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Database query implied by the flags, when `--db` is given.
    pub fn db_query(&self) -> Option<DbQuery> {
        self.db.as_ref()?;
        let query = if let Some(run_id) = &self.run_id {
            DbQuery::Run(run_id.clone())
        } else if self.latest_run {
            DbQuery::LatestRun
        } else if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            DbQuery::Range {
                start: start.clone(),
                end: end.clone(),
            }
        } else {
            DbQuery::Latest(self.limit.unwrap_or(DEFAULT_LIMIT))
        };
        Some(query)
    }

    /// Live stream implied by INPUT.
    ///
    /// Without INPUT and without `--db`, stdin is used when it is piped.
    pub fn stream(&self, stdin_is_tty: bool) -> Result<Stream, String> {
        match self.input.as_deref() {
            Some("-") => {
                if self.follow {
                    return Err("--follow needs a file, not stdin".to_string());
                }
                Ok(Stream::Stdin)
            }
            Some(path) => Ok(Stream::File {
                path: PathBuf::from(path),
                follow: self.follow,
            }),
            None if self.follow => Err("--follow needs an INPUT file".to_string()),
            None if self.db.is_some() => Ok(Stream::None),
            None if !stdin_is_tty => Ok(Stream::Stdin),
            None => Err(
                "no events to show: pass an NDJSON file, '-' for stdin, or --db PATH".to_string(),
            ),
        }
    }
}
