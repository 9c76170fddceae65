//! End-to-end controller sessions: events arrive over the feeder channel,
//! keys drive the state machine, and frames are drawn to a test backend.

use std::collections::BTreeMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::{json, Value};

use runlens::event::{types, Event};
use runlens::render::Registry;
use runlens::source::{self, EventSource};
use runlens::ui::filter::FilterCriteria;
use runlens::ui::keys::{Action, KeyMap};
use runlens::ui::state::{AppState, INGEST_BUDGET};
use runlens::ui::{view, Command, Message, Mode};

// ============================================================================
// Helpers
// ============================================================================

fn event(id: &str, event_type: &str, payload: Value) -> Event {
    Event::new(id, "2025-04-14T10:00:00Z", event_type, "run-1", payload)
}

fn session(max_events: usize) -> AppState {
    let mut state = AppState::new(Registry::with_builtin(), KeyMap::default(), max_events);
    state.update(Message::Resize {
        width: 100,
        height: 30,
    });
    state
}

fn press(state: &mut AppState, code: KeyCode) -> Option<Command> {
    state.update(Message::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

/// One runtime tick: ask the controller, then drain the source if told to.
fn tick(state: &mut AppState, source: &mut dyn EventSource) -> usize {
    match state.update(Message::Tick) {
        Some(Command::CheckForEvents) => state.pump(source, INGEST_BUDGET),
        _ => 0,
    }
}

fn draw(state: &mut AppState) -> String {
    draw_sized(state, 100, 30)
}

fn draw_sized(state: &mut AppState, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| view::render(frame, state)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn visible_ids(state: &AppState) -> Vec<String> {
    state
        .visible_entries()
        .map(|entry| entry.event.id.clone())
        .collect()
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn streamed_events_follow_the_tail_until_the_source_closes() {
    let (tx, mut rx) = source::channel();
    let mut state = session(0);

    assert_eq!(tick(&mut state, &mut rx), 0);
    assert!(draw(&mut state).contains("Waiting for events..."));

    for i in 1..=5 {
        tx.send(event(&format!("e{i}"), types::RUN_STARTED, json!({})))
            .unwrap();
    }
    assert_eq!(tick(&mut state, &mut rx), 5);
    assert_eq!(state.selected_index(), Some(4));

    drop(tx);
    tick(&mut state, &mut rx);
    assert!(state.is_source_closed());
    assert_eq!(state.update(Message::Tick), None);

    let frame = draw(&mut state);
    assert!(frame.contains("Event Timeline"));
    assert!(frame.contains("5/5 events"));
    assert!(frame.contains("source closed"));
}

#[test]
fn buffer_keeps_only_the_newest_events() {
    let (tx, mut rx) = source::channel();
    let mut state = session(3);
    for i in 1..=5 {
        tx.send(event(&format!("e{i}"), "custom", json!({}))).unwrap();
    }
    tick(&mut state, &mut rx);

    assert_eq!(visible_ids(&state), vec!["e3", "e4", "e5"]);
    assert_eq!(state.stats().received, 5);
    assert_eq!(state.stats().evicted, 2);
    assert!(draw(&mut state).contains("2 dropped"));
}

#[test]
fn inspect_llm_call_and_expand_prompt() {
    let mut state = session(0);
    state.update(Message::Event(event(
        "e1",
        types::LLM_CALL_STARTED,
        json!({
            "agent_class": "PlannerAgent",
            "model": "gpt-4o",
            "prompt": "Plan the trip to Lisbon",
        }),
    )));

    let frame = draw(&mut state);
    assert!(frame.contains("LLM Call: gpt-4o"));

    press(&mut state, KeyCode::Enter);
    assert!(matches!(state.mode(), Mode::Detail { .. }));
    assert!(state.viewport().content().contains("[+] Full Prompt"));

    press(&mut state, KeyCode::Char('e'));
    let content = state.viewport().content();
    assert!(content.contains("[-] Full Prompt"));
    assert!(content.contains("Plan the trip to Lisbon"));
    assert!(draw(&mut state).contains("Press 'e' to expand/collapse sections"));

    press(&mut state, KeyCode::Esc);
    assert_eq!(state.mode(), &Mode::Browsing);
    assert!(state.viewport().content().is_empty());
}

#[test]
fn filter_session_narrows_then_clears() {
    let mut state = session(0);
    for (id, event_type) in [
        ("e1", types::TOOL_INVOKED),
        ("e2", types::LLM_CALL_STARTED),
        ("e3", types::TOOL_INVOKED),
        ("e4", types::RUN_FINISHED),
    ] {
        state.update(Message::Event(event(id, event_type, json!({}))));
    }

    press(&mut state, KeyCode::Char('f'));
    assert_eq!(state.mode(), &Mode::Filtering);
    let frame = draw(&mut state);
    assert!(frame.contains("Filter Event Types"));
    assert!(frame.contains("[ ] tool_invoked"));

    // Types are listed by name: llm_call_started, run_finished, tool_invoked.
    press(&mut state, KeyCode::End);
    press(&mut state, KeyCode::Char(' '));
    state.update(Message::Key(KeyEvent::new(
        KeyCode::Char('F'),
        KeyModifiers::SHIFT,
    )));

    assert_eq!(state.mode(), &Mode::Browsing);
    assert_eq!(visible_ids(&state), vec!["e1", "e3"]);
    assert!(draw(&mut state).contains("Filter: tool_invoked"));

    // Events arriving later are filtered too.
    state.update(Message::Event(event("e5", types::RUN_STARTED, json!({}))));
    state.update(Message::Event(event("e6", types::TOOL_INVOKED, json!({}))));
    assert_eq!(visible_ids(&state), vec!["e1", "e3", "e6"]);
    assert_eq!(state.buffer_len(), 6);

    press(&mut state, KeyCode::Char('f'));
    press(&mut state, KeyCode::Char('c'));
    press(&mut state, KeyCode::Char('F'));
    assert!(state.criteria().is_empty());
    assert_eq!(state.visible_len(), 6);
}

#[test]
fn startup_criteria_apply_before_any_event() {
    let mut state = session(0).with_criteria(FilterCriteria::from_types([types::TOOL_RETURNED]));
    state.update(Message::Event(event("e1", types::TOOL_INVOKED, json!({}))));
    state.update(Message::Event(event(
        "e2",
        types::TOOL_RETURNED,
        json!({"tool_name": "search", "state": "success", "duration_seconds": 0.5}),
    )));

    assert_eq!(visible_ids(&state), vec!["e2"]);
    let frame = draw(&mut state);
    assert!(frame.contains("Tool Done: search"));
    assert!(frame.contains("1/2 events"));
}

#[test]
fn auto_scroll_off_leaves_selection_in_place() {
    let mut state = session(0).with_auto_scroll(false);
    for i in 1..=3 {
        state.update(Message::Event(event(&format!("e{i}"), "x", json!({}))));
    }
    assert_eq!(state.selected_index(), Some(0));

    press(&mut state, KeyCode::Down);
    state.update(Message::Event(event("e4", "x", json!({}))));
    assert_eq!(state.selected_index(), Some(1));
    assert!(draw(&mut state).contains("Auto-scroll: OFF"));

    press(&mut state, KeyCode::Char('a'));
    assert!(state.auto_scroll());
    assert_eq!(state.selected_index(), Some(3));
}

#[test]
fn end_of_word_wrapped_detail_is_reachable() {
    let mut state = AppState::new(Registry::with_builtin(), KeyMap::default(), 0);
    state.update(Message::Resize {
        width: 30,
        height: 12,
    });
    let words: Vec<String> = (0..40).map(|i| format!("word{i:011}")).collect();
    state.update(Message::Event(event(
        "e1",
        "custom_metric",
        json!({"text": words.join(" "), "zzz_end": true}),
    )));

    press(&mut state, KeyCode::Enter);
    press(&mut state, KeyCode::End);
    let viewport = state.viewport();
    assert!(viewport.max_offset() > 0);
    assert_eq!(viewport.offset(), viewport.max_offset());
    assert_eq!(
        viewport.total_lines(),
        viewport.offset() + usize::from(viewport.height())
    );

    let frame = draw_sized(&mut state, 30, 12);
    assert!(frame.contains("word00000000039"));
    assert!(frame.contains("zzz_end"));
}

#[test]
fn unknown_event_types_use_the_default_renderer() {
    let mut state = session(0);
    state.update(Message::Event(event(
        "e1",
        "custom_metric",
        json!({"latency_ms": 42}),
    )));
    press(&mut state, KeyCode::Enter);

    let content = state.viewport().content();
    assert!(content.contains("custom_metric"));
    assert!(content.contains("latency_ms"));
    assert!(content.contains("42"));
}

#[test]
fn rebound_quit_key_replaces_defaults() {
    let mut overrides = BTreeMap::new();
    overrides.insert(Action::Quit, vec!["x".to_string()]);
    let keys = KeyMap::with_overrides(&overrides).unwrap();
    let mut state = AppState::new(Registry::with_builtin(), keys, 0);

    assert_eq!(press(&mut state, KeyCode::Char('q')), None);
    assert_eq!(press(&mut state, KeyCode::Char('x')), Some(Command::Quit));
}

#[test]
fn help_overlay_lists_bindings() {
    let mut state = session(0);
    press(&mut state, KeyCode::Char('?'));
    assert!(state.show_help());
    let frame = draw(&mut state);
    assert!(frame.contains("Keys"));
    assert!(frame.contains("q/ctrl+c"));

    press(&mut state, KeyCode::Char('?'));
    assert!(!state.show_help());
}
