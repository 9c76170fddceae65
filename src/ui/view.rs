//! Rendering functions for the viewer screens.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

use crate::ui::keys::{Action, KeyMap};
use crate::ui::state::{AppState, EventEntry, Mode, DETAIL_WRAP};
use crate::ui::theme;

const LIST_TITLE: &str = "Event Timeline";

const HELP_ACTIONS: [Action; 14] = Action::ALL;

/// Draw one frame of the UI.
pub fn render(frame: &mut Frame<'_>, state: &mut AppState) {
    // Paint the entire frame black so no terminal background bleeds through.
    frame.render_widget(Block::default().style(theme::base()), frame.area());

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], state);
    if matches!(state.mode(), Mode::Browsing) {
        render_list(frame, root[1], state);
    } else if matches!(state.mode(), Mode::Filtering) {
        render_filter(frame, root[1], state);
    } else {
        render_detail(frame, root[1], state);
    }
    render_footer(frame, root[2], state);

    if state.show_help() {
        render_help(frame, state.keys());
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::styled("runlens", theme::title()),
        Span::raw("  "),
        Span::styled(
            format!("{}/{} events", state.visible_len(), state.buffer_len()),
            theme::status(),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "Auto-scroll: {}",
                if state.auto_scroll() { "ON" } else { "OFF" }
            ),
            theme::subdued(),
        ),
    ];
    if !state.criteria().is_empty() {
        let types: Vec<&str> = state.criteria().types().collect();
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Filter: {}", types.join(", ")),
            theme::warn(),
        ));
    }
    let evicted = state.stats().evicted;
    if evicted > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("{evicted} dropped"), theme::subdued()));
    }
    spans.push(Span::raw("  "));
    if state.is_source_closed() {
        spans.push(Span::styled("source closed", theme::warn()));
    } else {
        spans.push(Span::styled("live", theme::status()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn list_item(entry: &EventEntry) -> ListItem<'static> {
    let title_style = if entry.title.starts_with('❌') {
        theme::error()
    } else {
        theme::text()
    };
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(entry.event.display_time(), theme::subdued()),
            Span::raw(" "),
            Span::styled(entry.title.clone(), title_style),
        ]),
        Line::from(Span::styled(
            format!("  {}", entry.description),
            theme::subdued(),
        )),
    ])
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &mut AppState) {
    let items: Vec<ListItem<'static>> = state.visible_entries().map(list_item).collect();
    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .title(LIST_TITLE)
                .borders(Borders::ALL)
                .border_style(theme::border())
                .title_style(theme::title()),
        )
        .highlight_style(theme::selected())
        .highlight_symbol("▶ ");

    if empty {
        let waiting = if state.is_source_closed() {
            "No events."
        } else {
            "Waiting for events..."
        };
        let placeholder = Paragraph::new(waiting).style(theme::subdued()).block(
            Block::default()
                .title(LIST_TITLE)
                .borders(Borders::ALL)
                .border_style(theme::border())
                .title_style(theme::title()),
        );
        frame.render_widget(placeholder, area);
        return;
    }
    frame.render_stateful_widget(list, area, &mut state.list);
}

fn render_detail(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let Mode::Detail { event, .. } = state.mode() else {
        return;
    };
    let viewport = state.viewport();
    let max_offset = viewport.max_offset();
    let title = if max_offset > 0 {
        format!(
            "{} [scroll {}/{}]",
            event.event_type,
            viewport.offset(),
            max_offset
        )
    } else {
        event.event_type.clone()
    };
    let body = Paragraph::new(viewport.content())
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(theme::border())
                .title_style(theme::title()),
        )
        .style(theme::text())
        .wrap(DETAIL_WRAP)
        .scroll((u16::try_from(viewport.offset()).unwrap_or(u16::MAX), 0));
    frame.render_widget(body, area);
}

fn render_filter(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let panel = state.panel();
    let block = Block::default()
        .title("Filter Event Types")
        .borders(Borders::ALL)
        .border_style(theme::border())
        .title_style(theme::title());

    if panel.is_empty() {
        let placeholder = Paragraph::new("No event types seen yet.")
            .style(theme::subdued())
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem<'_>> = panel
        .items()
        .map(|(event_type, checked)| {
            let (mark, style) = if checked {
                ("[x] ", theme::checked())
            } else {
                ("[ ] ", theme::text())
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, style),
                Span::styled(event_type, style),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected())
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default().with_selected(Some(panel.cursor()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let keys = state.keys();
    let text = match state.mode() {
        Mode::Browsing => format!(
            "{} select · {} filter · {} auto-scroll · {} help · {} quit",
            keys.label(Action::Select),
            keys.label(Action::ToggleFilter),
            keys.label(Action::ToggleAutoScroll),
            keys.label(Action::ToggleHelp),
            keys.label(Action::Quit),
        ),
        Mode::Detail { .. } => format!(
            "Press '{}' to expand/collapse sections · {} back · ↑/↓ scroll",
            keys.label(Action::ToggleExpand),
            keys.label(Action::Back),
        ),
        Mode::Filtering => format!(
            "↑/↓ move · space toggle · c clear · {} apply · {} cancel",
            keys.label(Action::ApplyFilter),
            keys.label(Action::Back),
        ),
    };
    frame.render_widget(Paragraph::new(text).style(theme::subdued()), area);
}

fn render_help(frame: &mut Frame<'_>, keys: &KeyMap) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let rows = keys.help_entries(&HELP_ACTIONS);
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let lines: Vec<Line<'_>> = rows
        .into_iter()
        .map(|(k, description)| {
            Line::from(vec![
                Span::styled(format!("{k:<width$}"), theme::status()),
                Span::raw("  "),
                Span::styled(description, theme::text()),
            ])
        })
        .collect();
    let help = Paragraph::new(lines).style(theme::base()).block(
        Block::default()
            .title("Keys")
            .borders(Borders::ALL)
            .border_style(theme::modal_border()),
    );
    frame.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{types, Event};
    use crate::render::Registry;
    use crate::ui::state::Message;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;
    use serde_json::json;

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(state: &mut AppState) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn press(state: &mut AppState, code: KeyCode) {
        state.update(Message::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn populated() -> AppState {
        let mut state = AppState::new(Registry::with_builtin(), KeyMap::default(), 100);
        state.update(Message::Resize {
            width: 100,
            height: 30,
        });
        state.ingest(Event::new(
            "e1",
            "not-a-timestamp",
            types::TOOL_INVOKED,
            "r1",
            json!({"tool_name": "search", "api_name": "web"}),
        ));
        state.ingest(Event::new(
            "e2",
            "later",
            "custom_metric",
            "r1",
            json!({"value": 1}),
        ));
        state
    }

    #[test]
    fn empty_list_shows_waiting_placeholder() {
        let mut state = AppState::new(Registry::with_builtin(), KeyMap::default(), 10);
        let text = draw(&mut state);
        assert!(text.contains("Event Timeline"));
        assert!(text.contains("Waiting for events..."));
        assert!(text.contains("Auto-scroll: ON"));
    }

    #[test]
    fn list_shows_summaries() {
        let mut state = populated();
        let text = draw(&mut state);
        assert!(text.contains("Tool: search"));
        assert!(text.contains("custom_metric"));
        assert!(text.contains("2/2 events"));
    }

    #[test]
    fn detail_shows_rendered_event_and_expand_hint() {
        let mut state = populated();
        press(&mut state, KeyCode::Enter);
        let text = draw(&mut state);
        assert!(text.contains("Event Type: custom_metric"));
        assert!(text.contains("Press 'e' to expand/collapse sections"));
    }

    #[test]
    fn filter_panel_lists_types() {
        let mut state = populated();
        press(&mut state, KeyCode::Char('f'));
        press(&mut state, KeyCode::Char(' '));
        let text = draw(&mut state);
        assert!(text.contains("Filter Event Types"));
        assert!(text.contains("[x] custom_metric"));
        assert!(text.contains("[ ] tool_invoked"));
    }

    #[test]
    fn help_overlay_lists_bindings() {
        let mut state = populated();
        press(&mut state, KeyCode::Char('?'));
        let text = draw(&mut state);
        assert!(text.contains("Keys"));
        assert!(text.contains("toggle auto-scroll"));
        assert!(text.contains("apply filter"));
    }
}
