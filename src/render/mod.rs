//! Per-event-type renderers for list summaries and the detail view.
//!
//! A [`Renderer`] turns one [`Event`] into a one-line title, a one-line
//! description and a multi-line detail text. Renderers are looked up by event
//! type through the [`Registry`]; unknown types fall back to
//! [`DefaultRenderer`].

pub mod default;
pub mod llm;
pub mod pretty;
pub mod registry;
pub mod tool;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::event::Event;

pub use default::DefaultRenderer;
pub use registry::Registry;

/// Maximum characters of a preview shown on a single line.
pub const PREVIEW_CHARS: usize = 60;

/// Error raised when an event cannot be rendered in full.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot decode {event_type} payload: {source}")]
    Payload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON formatting error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    pub fn payload(event: &Event, source: serde_json::Error) -> Self {
        Self::Payload {
            event_type: event.event_type.clone(),
            source,
        }
    }
}

/// The rendering strategy for one event type.
pub trait Renderer {
    /// Short one-line label for the event list.
    fn summary_title(&self, event: &Event) -> String;

    /// Secondary one-line text for the event list.
    fn summary_description(&self, event: &Event) -> String;

    /// Fields with a long form that is collapsed by default.
    fn expandable_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Full detail text, honoring the expand/collapse flags.
    fn render(&self, event: &Event, expanded: &ExpandedState) -> Result<String, RenderError>;
}

/// Expand/collapse flags for the sections of the event being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedState {
    fields: HashMap<String, bool>,
}

impl ExpandedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, field: &str) -> bool {
        self.fields.get(field).copied().unwrap_or(false)
    }

    /// Flip one field. Two flips restore the original state.
    pub fn toggle(&mut self, field: &str) {
        let entry = self.fields.entry(field.to_string()).or_insert(false);
        *entry = !*entry;
    }
}

/// Collapse a multi-line text into one line and cut it to `max` characters.
pub fn preview(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    let flat = flat.trim();
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    } else {
        flat.to_string()
    }
}

/// Decode an event payload into a renderer's payload struct.
pub(crate) fn decode_payload<T: DeserializeOwned>(event: &Event) -> Result<T, serde_json::Error> {
    T::deserialize(&event.payload)
}

/// Header line for an expandable section.
pub(crate) fn section_header(label: &str, expanded: bool) -> String {
    if expanded {
        format!("[-] {label} (expanded; toggle expand to collapse)")
    } else {
        format!("[+] {label} (collapsed; toggle expand to show)")
    }
}

/// Common event header shared by the specialized renderers.
pub(crate) fn write_event_header(out: &mut String, event: &Event) {
    out.push_str(&format!("Event ID: {}\n", event.id));
    out.push_str(&format!("Timestamp: {}\n", event.timestamp));
    out.push_str(&format!("Run ID: {}\n", event.run_id));
    out.push('\n');
}

/// Append `label: value` only when `value` is non-empty.
pub(crate) fn write_optional(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        out.push_str(&format!("{label}: {value}\n"));
    }
}
