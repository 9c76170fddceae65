//! Fallback renderer for event types without a dedicated view.

use crate::event::Event;
use crate::render::{ExpandedState, RenderError, Renderer};

/// Shows the event header and the payload as pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRenderer;

impl Renderer for DefaultRenderer {
    fn summary_title(&self, event: &Event) -> String {
        event.event_type.clone()
    }

    fn summary_description(&self, event: &Event) -> String {
        format!(
            "ID: {} | Time: {} | Run: {}",
            event.id, event.timestamp, event.run_id
        )
    }

    fn render(&self, event: &Event, _expanded: &ExpandedState) -> Result<String, RenderError> {
        let mut out = String::new();
        out.push_str(&format!("Event ID: {}\n", event.id));
        out.push_str(&format!("Timestamp: {}\n", event.timestamp));
        out.push_str(&format!("Event Type: {}\n", event.event_type));
        out.push_str(&format!("Run ID: {}\n\n", event.run_id));
        out.push_str("--- Payload ---\n");
        out.push_str(&serde_json::to_string_pretty(&event.payload)?);
        Ok(out)
    }
}
