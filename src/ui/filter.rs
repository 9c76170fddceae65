//! Event-type filtering: the criteria and the panel used to edit them.

use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Event types to include. Empty means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    types: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.types.contains(event_type)
    }

    pub fn matches(&self, event_type: &str) -> bool {
        self.types.is_empty() || self.types.contains(event_type)
    }

    /// Flip membership of one type.
    pub fn toggle(&mut self, event_type: &str) {
        if !self.types.remove(event_type) {
            self.types.insert(event_type.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.types.clear();
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// Positions of the matching entries, in input order.
    pub fn apply<'a, I>(&self, event_types: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        event_types
            .into_iter()
            .enumerate()
            .filter(|(_, event_type)| self.matches(event_type))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Checklist of known event types.
///
/// Edits are staged in the panel and only take effect when the controller
/// commits them; cancelling leaves them staged for the next visit.
#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    known: BTreeSet<String>,
    staged: FilterCriteria,
    cursor: usize,
    width: u16,
    height: u16,
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel pre-loaded with criteria, e.g. from the command line.
    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        let known = criteria.types().map(str::to_string).collect();
        Self {
            known,
            staged: criteria,
            ..Self::default()
        }
    }

    /// Prepare the panel for display.
    pub fn open<'a, I>(&mut self, known_types: I, width: u16, height: u16)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.known.extend(known_types.into_iter().map(str::to_string));
        self.resize(width, height);
        self.cursor = self.cursor.min(self.known.len().saturating_sub(1));
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The staged criteria.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.staged
    }

    /// Known types with their checked state, sorted by name.
    pub fn items(&self) -> impl Iterator<Item = (&str, bool)> {
        self.known
            .iter()
            .map(|t| (t.as_str(), self.staged.contains(t)))
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Handle a key while the panel has focus. Returns whether it was used.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.known.len() {
                    self.cursor += 1;
                }
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.known.len().saturating_sub(1);
                true
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(event_type) = self.known.iter().nth(self.cursor).cloned() {
                    self.staged.toggle(&event_type);
                }
                true
            }
            KeyCode::Char('c') => {
                self.staged.clear();
                true
            }
            _ => false,
        }
    }
}
