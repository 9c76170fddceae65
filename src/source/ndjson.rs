//! Newline-delimited JSON event streams.

use std::io::BufRead;
use std::sync::mpsc::SyncSender;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::event::Event;

/// Delay between polls of a followed file at EOF.
const FOLLOW_POLL: Duration = Duration::from_millis(200);

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<Result<Event, serde_json::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str(trimmed))
}

/// Read events from `reader` and send them down `tx`.
///
/// Malformed lines are logged and skipped. With `follow`, EOF is not the end:
/// the reader is polled for appended lines until the receiver goes away.
/// Returns `Ok` when the input ends or the receiver is dropped.
pub fn feed<R: BufRead>(mut reader: R, follow: bool, tx: &SyncSender<Event>) -> Result<()> {
    let mut pending = String::new();
    let mut line_no = 0usize;
    let mut sent = 0usize;

    loop {
        let read = reader
            .read_line(&mut pending)
            .context("Failed to read event stream")?;

        let complete = pending.ends_with('\n');
        if read == 0 || !complete {
            if follow {
                // Keep any partial line until the writer finishes it.
                thread::sleep(FOLLOW_POLL);
                continue;
            }
            if pending.is_empty() {
                break;
            }
        }

        line_no += 1;
        match parse_line(&pending) {
            Some(Ok(event)) => {
                if tx.send(event).is_err() {
                    tracing::debug!(sent, "receiver dropped, stopping stream");
                    return Ok(());
                }
                sent += 1;
            }
            Some(Err(err)) => {
                tracing::warn!(line = line_no, "skipping malformed event: {err}");
            }
            None => {}
        }
        pending.clear();

        if read == 0 {
            break;
        }
    }

    tracing::debug!(sent, lines = line_no, "event stream ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    #[test]
    fn parse_line_skips_blank_lines() {
        assert!(parse_line("   \n").is_none());
    }

    #[test]
    fn parse_line_reports_malformed_json() {
        assert!(matches!(parse_line("{oops"), Some(Err(_))));
    }

    #[test]
    fn parse_line_reads_event() {
        let event = parse_line(r#"{"event_id":"e1","event_type":"tool_invoked","payload":{"tool_name":"ls"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(event.id, "e1");
        assert_eq!(event.payload["tool_name"], "ls");
    }

    #[test]
    fn feed_skips_bad_lines_and_keeps_order() {
        let input = concat!(
            "{\"event_id\":\"1\",\"event_type\":\"a\"}\n",
            "not json\n",
            "\n",
            "{\"event_id\":\"2\",\"event_type\":\"b\"}\n",
            "{\"event_id\":\"3\",\"event_type\":\"c\"}"
        );
        let (tx, rx) = mpsc::sync_channel(10);
        feed(Cursor::new(input), false, &tx).unwrap();
        drop(tx);
        let ids: Vec<String> = rx.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn feed_stops_when_receiver_is_gone() {
        let input = "{\"event_id\":\"1\",\"event_type\":\"a\"}\n".repeat(5);
        let (tx, rx) = mpsc::sync_channel(10);
        drop(rx);
        assert!(feed(Cursor::new(input), false, &tx).is_ok());
    }
}
