//! Views for `tool_invoked` and `tool_returned` events.

use serde::Deserialize;

use crate::event::Event;
use crate::render::{
    decode_payload, preview, section_header, write_event_header, write_optional, ExpandedState,
    RenderError, Renderer, PREVIEW_CHARS,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolInvokedPayload {
    tool_name: Option<String>,
    api_name: Option<String>,
    args_summary: Option<String>,
    node_id: Option<String>,
    step: Option<i64>,
    agent_class: Option<String>,
    tool_call_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolReturnedPayload {
    tool_name: Option<String>,
    api_name: Option<String>,
    state: Option<String>,
    duration_seconds: Option<f64>,
    result_summary: Option<String>,
    error: Option<String>,
    node_id: Option<String>,
    step: Option<i64>,
    agent_class: Option<String>,
    tool_call_id: Option<String>,
}

fn write_tool_context(
    out: &mut String,
    agent_class: Option<&str>,
    node_id: Option<&str>,
    tool_call_id: Option<&str>,
    step: Option<i64>,
) {
    write_optional(out, "Agent Class", agent_class.unwrap_or_default());
    write_optional(out, "Node ID", node_id.unwrap_or_default());
    write_optional(out, "Tool Call ID", tool_call_id.unwrap_or_default());
    if let Some(step) = step.filter(|s| *s > 0) {
        out.push_str(&format!("Step: {step}\n"));
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ToolInvokedRenderer;

impl Renderer for ToolInvokedRenderer {
    fn summary_title(&self, event: &Event) -> String {
        match decode_payload::<ToolInvokedPayload>(event) {
            Ok(p) => format!("🔧 Tool: {}", p.tool_name.unwrap_or_default()),
            Err(_) => event.event_type.clone(),
        }
    }

    fn summary_description(&self, event: &Event) -> String {
        let Ok(p) = decode_payload::<ToolInvokedPayload>(event) else {
            return event.event_type.clone();
        };
        let api = p.api_name.unwrap_or_default();
        match p.args_summary.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(args) => format!("{api} | {}", preview(args, PREVIEW_CHARS)),
            None => api,
        }
    }

    fn render(&self, event: &Event, _expanded: &ExpandedState) -> Result<String, RenderError> {
        let p: ToolInvokedPayload =
            decode_payload(event).map_err(|err| RenderError::payload(event, err))?;

        let mut out = String::new();
        write_event_header(&mut out, event);
        out.push_str("Tool Invocation\n");
        out.push_str(&format!("Tool: {}\n", p.tool_name.as_deref().unwrap_or_default()));
        out.push_str(&format!("API: {}\n", p.api_name.as_deref().unwrap_or_default()));
        write_tool_context(
            &mut out,
            p.agent_class.as_deref(),
            p.node_id.as_deref(),
            p.tool_call_id.as_deref(),
            p.step,
        );
        if let Some(args) = p.args_summary.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&format!("\nArguments:\n{args}\n"));
        }
        Ok(out)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ToolReturnedRenderer;

impl Renderer for ToolReturnedRenderer {
    fn summary_title(&self, event: &Event) -> String {
        let Ok(p) = decode_payload::<ToolReturnedPayload>(event) else {
            return event.event_type.clone();
        };
        let (icon, label) = if p.error.is_some() {
            ("❌", "Error")
        } else {
            ("✅", "Done")
        };
        let mut title = format!("{icon} Tool {label}: {}", p.tool_name.unwrap_or_default());
        if let Some(duration) = p.duration_seconds {
            title.push_str(&format!(" ({duration:.1}s)"));
        }
        title
    }

    fn summary_description(&self, event: &Event) -> String {
        let Ok(p) = decode_payload::<ToolReturnedPayload>(event) else {
            return event.event_type.clone();
        };
        if let Some(error) = &p.error {
            return format!("ERROR: {error}");
        }
        if let Some(result) = p.result_summary.as_deref().filter(|s| !s.is_empty()) {
            return preview(result, PREVIEW_CHARS);
        }
        format!(
            "{} | {}",
            p.api_name.unwrap_or_default(),
            p.state.unwrap_or_default()
        )
    }

    fn expandable_fields(&self) -> &'static [&'static str] {
        &["result"]
    }

    fn render(&self, event: &Event, expanded: &ExpandedState) -> Result<String, RenderError> {
        let p: ToolReturnedPayload =
            decode_payload(event).map_err(|err| RenderError::payload(event, err))?;

        let mut out = String::new();
        write_event_header(&mut out, event);
        out.push_str("Tool Result\n");
        out.push_str(&format!("Tool: {}\n", p.tool_name.as_deref().unwrap_or_default()));
        out.push_str(&format!("API: {}\n", p.api_name.as_deref().unwrap_or_default()));
        out.push_str(&format!("State: {}\n", p.state.as_deref().unwrap_or_default()));
        if let Some(duration) = p.duration_seconds {
            out.push_str(&format!("Duration: {duration:.2} seconds\n"));
        }
        write_tool_context(
            &mut out,
            p.agent_class.as_deref(),
            p.node_id.as_deref(),
            p.tool_call_id.as_deref(),
            p.step,
        );

        if let Some(error) = &p.error {
            out.push_str(&format!("\nERROR: {error}\n"));
        }

        if let Some(result) = p.result_summary.as_deref().filter(|s| !s.is_empty()) {
            let is_expanded = expanded.is_expanded("result");
            out.push('\n');
            out.push_str(&section_header("Result", is_expanded));
            out.push('\n');
            if is_expanded {
                out.push_str(result);
            } else {
                out.push_str(&preview(result, PREVIEW_CHARS));
            }
            out.push('\n');
        }
        Ok(out)
    }
}
