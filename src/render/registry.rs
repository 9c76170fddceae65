use std::collections::HashMap;
use std::fmt;

use crate::event::{types, Event};
use crate::render::llm::{LlmCallCompletedRenderer, LlmCallStartedRenderer};
use crate::render::tool::{ToolInvokedRenderer, ToolReturnedRenderer};
use crate::render::{DefaultRenderer, ExpandedState, RenderError, Renderer};

/// Maps event type tags to renderers.
///
/// Filled once at startup and only read afterwards.
pub struct Registry {
    renderers: HashMap<String, Box<dyn Renderer>>,
    default: DefaultRenderer,
}

impl Registry {
    /// An empty registry; every type resolves to the default renderer.
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            default: DefaultRenderer,
        }
    }

    /// A registry with the LLM and tool renderers installed.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(types::LLM_CALL_STARTED, LlmCallStartedRenderer);
        registry.register(types::LLM_CALL_COMPLETED, LlmCallCompletedRenderer);
        registry.register(types::TOOL_INVOKED, ToolInvokedRenderer);
        registry.register(types::TOOL_RETURNED, ToolReturnedRenderer);
        registry
    }

    /// Install `renderer` for `event_type`, replacing any earlier one.
    pub fn register(&mut self, event_type: impl Into<String>, renderer: impl Renderer + 'static) {
        self.renderers.insert(event_type.into(), Box::new(renderer));
    }

    pub fn resolve(&self, event_type: &str) -> &dyn Renderer {
        match self.renderers.get(event_type) {
            Some(renderer) => renderer.as_ref(),
            None => &self.default,
        }
    }

    pub fn render_event(
        &self,
        event: &Event,
        expanded: &ExpandedState,
    ) -> Result<String, RenderError> {
        self.resolve(&event.event_type).render(event, expanded)
    }

    /// List title and description for `event`.
    pub fn summarize(&self, event: &Event) -> (String, String) {
        let renderer = self.resolve(&event.event_type);
        (
            renderer.summary_title(event),
            renderer.summary_description(event),
        )
    }

    pub fn expandable_fields(&self, event_type: &str) -> &'static [&'static str] {
        self.resolve(event_type).expandable_fields()
    }

    pub fn registered_types(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.registered_types().collect();
        types.sort_unstable();
        f.debug_struct("Registry").field("types", &types).finish()
    }
}
