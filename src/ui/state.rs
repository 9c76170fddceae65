//! Controller state for the viewer.
//!
//! [`AppState`] owns the event buffer and every piece of UI state. It is
//! driven by [`Message`]s from the runtime loop and answers with an optional
//! [`Command`]; drawing only reads it.

use std::collections::{BTreeSet, VecDeque};

use crossterm::event::KeyEvent;
use ratatui::widgets::{ListState, Paragraph, Wrap};

use crate::event::Event;
use crate::render::{ExpandedState, Registry};
use crate::source::{EventSource, Recv};
use crate::ui::filter::{FilterCriteria, FilterPanel};
use crate::ui::keys::{Action, KeyMap};

/// Upper bound on events ingested per tick so input stays responsive.
pub const INGEST_BUDGET: usize = 256;

/// Wrapping of the detail text. Scroll bounds depend on it.
pub const DETAIL_WRAP: Wrap = Wrap { trim: false };

/// Space taken by borders, header and footer around the main panel.
const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 4;

/// A buffered event with its list summary.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    pub event: Event,
    pub title: String,
    pub description: String,
}

/// Which screen has focus.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browsing,
    Detail {
        event: Event,
        expanded: ExpandedState,
    },
    Filtering,
}

/// Input to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Tick,
    Event(Event),
}

/// Request from the controller to the runtime loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Poll the event source again.
    CheckForEvents,
}

/// Scrollable text area for the detail screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    content: String,
    offset: usize,
    width: u16,
    height: u16,
}

impl Viewport {
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.offset = 0;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Visual line count once wrapped to the viewport width, using the
    /// same wrapping the detail screen draws with.
    pub fn total_lines(&self) -> usize {
        Paragraph::new(self.content.as_str())
            .wrap(DETAIL_WRAP)
            .line_count(self.width.max(1))
    }

    pub fn max_offset(&self) -> usize {
        self.total_lines().saturating_sub(usize::from(self.height))
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    fn page(&self) -> usize {
        usize::from(self.height.max(1))
    }
}

/// Counters shown in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub received: u64,
    pub evicted: u64,
}

/// The viewer controller.
#[derive(Debug)]
pub struct AppState {
    registry: Registry,
    keys: KeyMap,
    buffer: VecDeque<EventEntry>,
    max_events: usize,
    /// Criteria in effect for the list.
    criteria: FilterCriteria,
    /// Buffer positions currently listed.
    visible: Vec<usize>,
    pub list: ListState,
    list_width: u16,
    list_height: u16,
    mode: Mode,
    viewport: Viewport,
    panel: FilterPanel,
    auto_scroll: bool,
    show_help: bool,
    source_closed: bool,
    stats: Stats,
}

impl AppState {
    /// `max_events == 0` keeps every event.
    pub fn new(registry: Registry, keys: KeyMap, max_events: usize) -> Self {
        Self {
            registry,
            keys,
            buffer: VecDeque::new(),
            max_events,
            criteria: FilterCriteria::new(),
            visible: Vec::new(),
            list: ListState::default(),
            list_width: 0,
            list_height: 0,
            mode: Mode::Browsing,
            viewport: Viewport::default(),
            panel: FilterPanel::new(),
            auto_scroll: true,
            show_help: false,
            source_closed: false,
            stats: Stats::default(),
        }
    }

    pub fn with_auto_scroll(mut self, enabled: bool) -> Self {
        self.auto_scroll = enabled;
        self
    }

    /// Start with a filter already applied.
    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.panel = FilterPanel::with_criteria(criteria.clone());
        self.criteria = criteria;
        self.refresh_list();
        self
    }

    pub fn update(&mut self, msg: Message) -> Option<Command> {
        match msg {
            Message::Key(key) => self.handle_key(&key),
            Message::Resize { width, height } => {
                self.resize(width, height);
                None
            }
            Message::Tick => (!self.source_closed).then_some(Command::CheckForEvents),
            Message::Event(event) => {
                self.ingest(event);
                Some(Command::CheckForEvents)
            }
        }
    }

    /// Drain up to `budget` events from `source` without blocking.
    ///
    /// Returns the number of events ingested. A closed source is remembered
    /// and never polled again.
    pub fn pump(&mut self, source: &mut dyn EventSource, budget: usize) -> usize {
        let mut ingested = 0;
        while !self.source_closed && ingested < budget {
            match source.try_recv_event() {
                Recv::Event(event) => {
                    self.update(Message::Event(event));
                    ingested += 1;
                }
                Recv::Empty => break,
                Recv::Closed => {
                    tracing::info!(received = self.stats.received, "event source closed");
                    self.source_closed = true;
                }
            }
        }
        ingested
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<Command> {
        let action = self.keys.action_for(key);
        match action {
            Some(Action::Quit) => {
                tracing::info!("quit requested");
                return Some(Command::Quit);
            }
            Some(Action::ToggleAutoScroll) => {
                self.auto_scroll = !self.auto_scroll;
                if self.auto_scroll && self.mode == Mode::Browsing {
                    self.select_last();
                }
                return None;
            }
            Some(Action::ToggleHelp) => {
                self.show_help = !self.show_help;
                return None;
            }
            _ => {}
        }

        match self.mode {
            Mode::Browsing => self.browse(action),
            Mode::Detail { .. } => self.detail(action),
            Mode::Filtering => self.filtering(action, key),
        }
        None
    }

    fn browse(&mut self, action: Option<Action>) {
        match action {
            Some(Action::Select) => self.open_detail(),
            Some(Action::ToggleFilter) => self.open_filter(),
            Some(Action::Up) => self.move_selection(-1),
            Some(Action::Down) => self.move_selection(1),
            Some(Action::PageUp) => self.move_selection(-self.list_page()),
            Some(Action::PageDown) => self.move_selection(self.list_page()),
            Some(Action::Top) => self.select_index(0),
            Some(Action::Bottom) => self.select_last(),
            _ => {}
        }
    }

    fn detail(&mut self, action: Option<Action>) {
        match action {
            Some(Action::Back) => {
                self.mode = Mode::Browsing;
                self.viewport.clear();
            }
            Some(Action::ToggleExpand) => self.toggle_expand(),
            Some(Action::Up) => self.viewport.scroll_up(1),
            Some(Action::Down) => self.viewport.scroll_down(1),
            Some(Action::PageUp) => self.viewport.scroll_up(self.viewport.page()),
            Some(Action::PageDown) => self.viewport.scroll_down(self.viewport.page()),
            Some(Action::Top) => self.viewport.goto_top(),
            Some(Action::Bottom) => self.viewport.goto_bottom(),
            _ => {}
        }
    }

    fn filtering(&mut self, action: Option<Action>, key: &KeyEvent) {
        match action {
            Some(Action::ApplyFilter) => {
                self.criteria = self.panel.criteria().clone();
                tracing::debug!(types = ?self.criteria, "filter applied");
                self.mode = Mode::Browsing;
                self.refresh_list();
            }
            Some(Action::Back) | Some(Action::ToggleFilter) => {
                self.mode = Mode::Browsing;
            }
            _ => {
                self.panel.handle_key(key);
            }
        }
    }

    fn open_detail(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let event = entry.event.clone();
        let expanded = ExpandedState::new();
        self.viewport
            .set_content(render_detail(&self.registry, &event, &expanded));
        self.viewport.goto_top();
        self.mode = Mode::Detail { event, expanded };
    }

    fn open_filter(&mut self) {
        let known: BTreeSet<&str> = self
            .buffer
            .iter()
            .map(|entry| entry.event.event_type.as_str())
            .collect();
        self.panel
            .open(known, self.viewport.width(), self.viewport.height());
        self.mode = Mode::Filtering;
    }

    fn toggle_expand(&mut self) {
        let Mode::Detail { event, expanded } = &mut self.mode else {
            return;
        };
        let fields = self.registry.expandable_fields(&event.event_type);
        if fields.is_empty() {
            return;
        }
        for field in fields {
            expanded.toggle(field);
        }
        let content = render_detail(&self.registry, event, expanded);
        self.viewport.set_content(content);
    }

    /// Append one event, evict overflow and refresh the list.
    pub fn ingest(&mut self, event: Event) {
        let (title, description) = self.registry.summarize(&event);
        self.buffer.push_back(EventEntry {
            event,
            title,
            description,
        });
        self.stats.received += 1;

        if self.max_events > 0 {
            while self.buffer.len() > self.max_events {
                self.buffer.pop_front();
                self.stats.evicted += 1;
            }
        }

        self.refresh_list();
        if self.auto_scroll && self.mode == Mode::Browsing {
            self.select_last();
        }
    }

    /// Rebuild the listed positions from the applied criteria.
    fn refresh_list(&mut self) {
        self.visible = if self.criteria.is_empty() {
            (0..self.buffer.len()).collect()
        } else {
            self.criteria
                .apply(self.buffer.iter().map(|e| e.event.event_type.as_str()))
        };

        let selected = match (self.list.selected(), self.visible.len()) {
            (_, 0) => None,
            (Some(idx), len) => Some(idx.min(len - 1)),
            (None, _) => Some(0),
        };
        self.list.select(selected);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let w = width.saturating_sub(HORIZONTAL_MARGIN);
        let h = height.saturating_sub(VERTICAL_MARGIN);
        self.list_width = w;
        self.list_height = h;
        self.viewport.resize(w, h);
        self.panel.resize(w, h);
    }

    fn list_page(&self) -> isize {
        isize::try_from(self.list_height.max(1)).unwrap_or(1)
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let current = self.list.selected().unwrap_or(0);
        let target = current.saturating_add_signed(delta);
        self.select_index(target);
    }

    fn select_index(&mut self, idx: usize) {
        if self.visible.is_empty() {
            self.list.select(None);
        } else {
            self.list.select(Some(idx.min(self.visible.len() - 1)));
        }
    }

    fn select_last(&mut self) {
        if let Some(last) = self.visible.len().checked_sub(1) {
            self.list.select(Some(last));
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn keys(&self) -> &KeyMap {
        &self.keys
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn panel(&self) -> &FilterPanel {
        &self.panel
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn is_source_closed(&self) -> bool {
        self.source_closed
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Events in arrival order, including filtered-out ones.
    pub fn buffered(&self) -> impl Iterator<Item = &EventEntry> {
        self.buffer.iter()
    }

    /// Entries shown in the list, in order.
    pub fn visible_entries(&self) -> impl Iterator<Item = &EventEntry> {
        self.visible.iter().filter_map(|idx| self.buffer.get(*idx))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.list.selected()
    }

    pub fn selected_entry(&self) -> Option<&EventEntry> {
        let pos = *self.visible.get(self.list.selected()?)?;
        self.buffer.get(pos)
    }
}

/// Detail text for `event`, or the render error shown in its place.
fn render_detail(registry: &Registry, event: &Event, expanded: &ExpandedState) -> String {
    match registry.render_event(event, expanded) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(event_id = %event.id, "cannot render event: {err}");
            format!("Error formatting event: {err}")
        }
    }
}
