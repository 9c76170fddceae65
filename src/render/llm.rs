//! Views for `llm_call_started` and `llm_call_completed` events.

use serde::Deserialize;
use serde_json::Value;

use crate::event::Event;
use crate::render::pretty;
use crate::render::{
    decode_payload, preview, section_header, write_event_header, write_optional, ExpandedState,
    RenderError, Renderer, PREVIEW_CHARS,
};

const STARTED_ICON: &str = "🤖";
const DONE_ICON: &str = "✅";
const ERROR_ICON: &str = "❌";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmCallStartedPayload {
    agent_class: Option<String>,
    model: Option<String>,
    prompt_preview: Option<String>,
    prompt: Option<Value>,
    step: Option<i64>,
    node_id: Option<String>,
    task_type: Option<String>,
    action_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmCallCompletedPayload {
    agent_class: Option<String>,
    model: Option<String>,
    duration_seconds: Option<f64>,
    result_summary: Option<String>,
    response: Option<String>,
    step: Option<i64>,
    token_usage: Option<Value>,
    node_id: Option<String>,
    error: Option<String>,
    task_type: Option<String>,
    action_name: Option<String>,
}

/// Token counts normalized from the provider-specific usage object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub total: Option<u64>,
    pub input: Option<u64>,
    pub output: Option<u64>,
}

impl TokenUsage {
    /// Read token counts from a usage value.
    ///
    /// Understands `total_tokens` and the `prompt_tokens`/`completion_tokens`
    /// and `input_tokens`/`output_tokens` pairs. Returns `None` for any other
    /// shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        let decoded = pretty::decode_structured(value).ok()?;
        let obj = decoded.as_object()?;
        let count = |key: &str| obj.get(key).and_then(as_count);

        let total = count("total_tokens");
        let (input, output) = match (count("prompt_tokens"), count("completion_tokens")) {
            (Some(i), Some(o)) => (Some(i), Some(o)),
            _ => (count("input_tokens"), count("output_tokens")),
        };

        let usage = Self {
            total,
            input,
            output,
        };
        if usage.total.is_none() && usage.pair().is_none() {
            return None;
        }
        Some(usage)
    }

    fn pair(&self) -> Option<(u64, u64)> {
        self.input.zip(self.output)
    }

    /// Total count, computed from the pair when not reported directly.
    ///
    /// A pair whose sum does not fit in `u64` has no total.
    pub fn total_tokens(&self) -> Option<u64> {
        self.total
            .or_else(|| self.pair().and_then(|(i, o)| i.checked_add(o)))
    }

    /// Compact `[N tokens]` / `[in→out tokens]` annotation for list titles.
    pub fn annotation(&self) -> String {
        match (self.total, self.pair()) {
            (Some(total), _) => format!("[{total} tokens]"),
            (None, Some((input, output))) => format!("[{input}→{output} tokens]"),
            (None, None) => String::new(),
        }
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

fn write_call_context(
    out: &mut String,
    node_id: Option<&str>,
    action_name: Option<&str>,
    task_type: Option<&str>,
    step: Option<i64>,
) {
    write_optional(out, "Node ID", node_id.unwrap_or_default());
    write_optional(out, "Action", action_name.unwrap_or_default());
    write_optional(out, "Task Type", task_type.unwrap_or_default());
    if let Some(step) = step.filter(|s| *s > 0) {
        out.push_str(&format!("Step: {step}\n"));
    }
}

/// View for the start of an LLM call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmCallStartedRenderer;

impl Renderer for LlmCallStartedRenderer {
    fn summary_title(&self, event: &Event) -> String {
        match decode_payload::<LlmCallStartedPayload>(event) {
            Ok(p) => format!(
                "{STARTED_ICON} LLM Call: {}",
                p.model.unwrap_or_default()
            ),
            Err(_) => event.event_type.clone(),
        }
    }

    fn summary_description(&self, event: &Event) -> String {
        let Ok(p) = decode_payload::<LlmCallStartedPayload>(event) else {
            return event.event_type.clone();
        };
        let agent = p.agent_class.unwrap_or_default();
        match p.prompt_preview.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(text) => format!("{agent} | {}", preview(text, PREVIEW_CHARS)),
            None => agent,
        }
    }

    fn expandable_fields(&self) -> &'static [&'static str] {
        &["prompt"]
    }

    fn render(&self, event: &Event, expanded: &ExpandedState) -> Result<String, RenderError> {
        let p: LlmCallStartedPayload =
            decode_payload(event).map_err(|err| RenderError::payload(event, err))?;

        let mut out = String::new();
        write_event_header(&mut out, event);

        out.push_str("LLM Call Details\n");
        out.push_str(&format!(
            "Agent Class: {}\n",
            p.agent_class.as_deref().unwrap_or_default()
        ));
        out.push_str(&format!("Model: {}\n", p.model.as_deref().unwrap_or_default()));
        write_call_context(
            &mut out,
            p.node_id.as_deref(),
            p.action_name.as_deref(),
            p.task_type.as_deref(),
            p.step,
        );

        out.push_str(&format!(
            "\nPrompt Preview:\n{}\n",
            p.prompt_preview.as_deref().unwrap_or_default()
        ));

        if let Some(prompt) = p.prompt.as_ref().filter(|v| !v.is_null()) {
            let is_expanded = expanded.is_expanded("prompt");
            out.push('\n');
            out.push_str(&section_header("Full Prompt", is_expanded));
            out.push('\n');
            if is_expanded {
                match pretty::decode_structured(prompt) {
                    Ok(Value::String(text)) => {
                        out.push_str(&text);
                        out.push('\n');
                    }
                    Ok(decoded) => out.push_str(&pretty::structured(&decoded)),
                    Err(err) => out.push_str(&format!("Error parsing prompt: {err}\n")),
                }
            }
        }

        Ok(out)
    }
}

/// View for the completion of an LLM call, successful or not.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmCallCompletedRenderer;

impl Renderer for LlmCallCompletedRenderer {
    fn summary_title(&self, event: &Event) -> String {
        let Ok(p) = decode_payload::<LlmCallCompletedPayload>(event) else {
            return event.event_type.clone();
        };
        let (icon, label) = if p.error.is_some() {
            (ERROR_ICON, "Error")
        } else {
            (DONE_ICON, "Done")
        };
        let mut title = format!(
            "{icon} LLM {label}: {} ({:.1}s)",
            p.model.unwrap_or_default(),
            p.duration_seconds.unwrap_or(0.0)
        );
        if let Some(usage) = p.token_usage.as_ref().and_then(TokenUsage::from_value) {
            title.push(' ');
            title.push_str(&usage.annotation());
        }
        title
    }

    fn summary_description(&self, event: &Event) -> String {
        let Ok(p) = decode_payload::<LlmCallCompletedPayload>(event) else {
            return event.event_type.clone();
        };
        if let Some(error) = &p.error {
            return format!("ERROR: {error}");
        }
        if let Some(summary) = p.result_summary.as_deref().filter(|s| !s.is_empty()) {
            return preview(summary, PREVIEW_CHARS);
        }
        if let Some(response) = p.response.as_deref().filter(|s| !s.is_empty()) {
            return preview(response, PREVIEW_CHARS);
        }
        format!("{} | Complete", p.agent_class.unwrap_or_default())
    }

    fn expandable_fields(&self) -> &'static [&'static str] {
        &["response", "token_usage"]
    }

    fn render(&self, event: &Event, expanded: &ExpandedState) -> Result<String, RenderError> {
        let p: LlmCallCompletedPayload =
            decode_payload(event).map_err(|err| RenderError::payload(event, err))?;

        let mut out = String::new();
        write_event_header(&mut out, event);

        out.push_str("LLM Call Results\n");
        out.push_str(&format!(
            "Agent Class: {}\n",
            p.agent_class.as_deref().unwrap_or_default()
        ));
        out.push_str(&format!("Model: {}\n", p.model.as_deref().unwrap_or_default()));
        out.push_str(&format!(
            "Duration: {:.2} seconds\n",
            p.duration_seconds.unwrap_or(0.0)
        ));
        write_call_context(
            &mut out,
            p.node_id.as_deref(),
            p.action_name.as_deref(),
            p.task_type.as_deref(),
            p.step,
        );

        if let Some(error) = &p.error {
            out.push_str(&format!("\nERROR: {error}\n"));
        }

        if let Some(summary) = p.result_summary.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&format!("\nResult Summary:\n{summary}\n"));
        }

        if let Some(response) = p.response.as_deref().filter(|s| !s.is_empty()) {
            let is_expanded = expanded.is_expanded("response");
            out.push('\n');
            out.push_str(&section_header("Full Response", is_expanded));
            out.push('\n');
            if is_expanded {
                out.push_str(response);
                out.push('\n');
            } else {
                out.push_str(&format!("{}\n", preview(response, PREVIEW_CHARS)));
            }
        }

        if let Some(raw) = p.token_usage.as_ref().filter(|v| !v.is_null()) {
            out.push_str("\nToken Usage\n");
            match TokenUsage::from_value(raw) {
                Some(usage) => {
                    if let Some(total) = usage.total_tokens() {
                        out.push_str(&format!("Total Tokens: {total}\n"));
                    }
                    if let Some((input, output)) = usage.pair() {
                        out.push_str(&format!("Input Tokens: {input}\n"));
                        out.push_str(&format!("Output Tokens: {output}\n"));
                    }
                }
                None => out.push_str("No token counts reported\n"),
            }

            let is_expanded = expanded.is_expanded("token_usage");
            out.push_str(&section_header("Raw Token Usage", is_expanded));
            out.push('\n');
            if is_expanded {
                match pretty::decode_structured(raw) {
                    Ok(decoded) => out.push_str(&pretty::structured(&decoded)),
                    Err(err) => out.push_str(&format!("Error parsing token usage: {err}\n")),
                }
            }
        }

        Ok(out)
    }
}
