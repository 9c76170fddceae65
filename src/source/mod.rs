//! Event sources feeding the viewer.
//!
//! The UI only ever sees an [`EventSource`]. Concrete producers (NDJSON
//! files, stdin, the run database) run on a feeder thread and push into a
//! bounded channel whose receiving half is the source.

pub mod db;
pub mod ndjson;

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use crate::event::Event;

/// Capacity of the producer → UI channel.
pub const CHANNEL_CAPACITY: usize = 100;

/// Outcome of a non-blocking receive.
#[derive(Debug, Clone, PartialEq)]
pub enum Recv {
    Event(Event),
    Empty,
    Closed,
}

/// A non-blocking supplier of events.
pub trait EventSource {
    fn try_recv_event(&mut self) -> Recv;
}

impl EventSource for Receiver<Event> {
    fn try_recv_event(&mut self) -> Recv {
        match self.try_recv() {
            Ok(event) => Recv::Event(event),
            Err(TryRecvError::Empty) => Recv::Empty,
            Err(TryRecvError::Disconnected) => Recv::Closed,
        }
    }
}

/// Bounded channel between a feeder thread and the UI.
pub fn channel() -> (SyncSender<Event>, Receiver<Event>) {
    mpsc::sync_channel(CHANNEL_CAPACITY)
}

/// Where live events come from after any preloaded batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stream {
    None,
    Stdin,
    File { path: std::path::PathBuf, follow: bool },
}

/// Start the feeder thread.
///
/// `preload` is sent first, in order, then `stream` is read until it ends.
/// The thread exits early once the receiver is dropped.
pub fn spawn_feeder(
    preload: Vec<Event>,
    stream: Stream,
    tx: SyncSender<Event>,
) -> Result<JoinHandle<()>> {
    let file = match &stream {
        Stream::File { path, .. } => Some(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open event file {}", path.display()))?,
        ),
        _ => None,
    };

    thread::Builder::new()
        .name("runlens-feeder".to_string())
        .spawn(move || {
            let preloaded = preload.len();
            for event in preload {
                if tx.send(event).is_err() {
                    tracing::debug!("viewer closed during preload");
                    return;
                }
            }
            tracing::debug!(preloaded, "preload delivered");

            let outcome = match (stream, file) {
                (Stream::File { follow, path }, Some(file)) => {
                    tracing::info!(path = %path.display(), follow, "streaming events from file");
                    ndjson::feed(std::io::BufReader::new(file), follow, &tx)
                }
                (Stream::Stdin, _) => {
                    tracing::info!("streaming events from stdin");
                    ndjson::feed(std::io::stdin().lock(), false, &tx)
                }
                _ => Ok(()),
            };
            if let Err(err) = outcome {
                tracing::error!("event stream failed: {err:#}");
            }
            tracing::info!("event source exhausted");
        })
        .context("Failed to spawn feeder thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn event(id: &str) -> Event {
        Event::new(id, "t", "x", "r", Value::Null)
    }

    #[test]
    fn receiver_reports_empty_then_closed() {
        let (tx, mut rx) = channel();
        assert_eq!(rx.try_recv_event(), Recv::Empty);
        tx.send(event("e1")).unwrap();
        assert_eq!(rx.try_recv_event(), Recv::Event(event("e1")));
        drop(tx);
        assert_eq!(rx.try_recv_event(), Recv::Closed);
    }

    #[test]
    fn feeder_delivers_preload_then_closes() {
        let (tx, rx) = channel();
        let handle = spawn_feeder(vec![event("a"), event("b")], Stream::None, tx).unwrap();
        let got: Vec<String> = rx.iter().map(|e| e.id).collect();
        handle.join().unwrap();
        assert_eq!(got, vec!["a", "b"]);
    }

    #[test]
    fn feeder_reads_file_after_preload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("events.ndjson");
        std::fs::write(
            &path,
            "{\"event_id\":\"f1\",\"event_type\":\"run_started\"}\n",
        )
        .unwrap();
        let (tx, rx) = channel();
        let handle = spawn_feeder(
            vec![event("db1")],
            Stream::File { path, follow: false },
            tx,
        )
        .unwrap();
        let got: Vec<String> = rx.iter().map(|e| e.id).collect();
        handle.join().unwrap();
        assert_eq!(got, vec!["db1", "f1"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let (tx, _rx) = channel();
        let err = spawn_feeder(
            Vec::new(),
            Stream::File {
                path: "/nonexistent/runlens/events.ndjson".into(),
                follow: false,
            },
            tx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to open event file"));
    }
}
