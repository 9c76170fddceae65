//! Key bindings and their mapping to viewer actions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;
use thiserror::Error;

/// Something the operator can ask the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ToggleAutoScroll,
    ToggleHelp,
    Quit,
    Back,
    Select,
    ToggleExpand,
    ToggleFilter,
    ApplyFilter,
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

impl Action {
    pub const ALL: [Action; 14] = [
        Action::ToggleAutoScroll,
        Action::ToggleHelp,
        Action::Quit,
        Action::Back,
        Action::Select,
        Action::ToggleExpand,
        Action::ToggleFilter,
        Action::ApplyFilter,
        Action::Up,
        Action::Down,
        Action::PageUp,
        Action::PageDown,
        Action::Top,
        Action::Bottom,
    ];

    pub fn description(self) -> &'static str {
        match self {
            Action::ToggleAutoScroll => "toggle auto-scroll",
            Action::ToggleHelp => "toggle help",
            Action::Quit => "quit",
            Action::Back => "back",
            Action::Select => "select",
            Action::ToggleExpand => "expand/collapse sections",
            Action::ToggleFilter => "filter events",
            Action::ApplyFilter => "apply filter",
            Action::Up => "up",
            Action::Down => "down",
            Action::PageUp => "page up",
            Action::PageDown => "page down",
            Action::Top => "first",
            Action::Bottom => "last",
        }
    }

    fn default_keys(self) -> &'static [&'static str] {
        match self {
            Action::ToggleAutoScroll => &["a"],
            Action::ToggleHelp => &["?"],
            Action::Quit => &["q", "ctrl+c"],
            Action::Back => &["esc"],
            Action::Select => &["enter"],
            Action::ToggleExpand => &["e"],
            Action::ToggleFilter => &["f"],
            Action::ApplyFilter => &["F"],
            Action::Up => &["up", "k"],
            Action::Down => &["down", "j"],
            Action::PageUp => &["pgup"],
            Action::PageDown => &["pgdown"],
            Action::Top => &["home", "g"],
            Action::Bottom => &["end", "G"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key spec")]
    Empty,
    #[error("unknown modifier '{0}'")]
    Modifier(String),
    #[error("unknown key '{0}'")]
    Key(String),
}

/// One key chord such as `ctrl+c`, `F` or `pgdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether a terminal key event is this chord.
    ///
    /// For character keys SHIFT is ignored: the character itself already
    /// carries the case, and terminals disagree on reporting the modifier.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if self.code != key.code {
            return false;
        }
        match self.code {
            KeyCode::Char(_) => {
                self.modifiers.difference(KeyModifiers::SHIFT)
                    == key.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => self.modifiers == key.modifiers,
        }
    }
}

impl FromStr for KeySpec {
    type Err = KeyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(KeyParseError::Empty);
        }
        // A lone "+" is the plus key, not a separator.
        if raw == "+" {
            return Ok(Self::new(KeyCode::Char('+'), KeyModifiers::NONE));
        }

        let mut parts: Vec<&str> = raw.split('+').collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or(KeyParseError::Empty)?;

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "meta" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(KeyParseError::Modifier(part.to_string())),
            };
        }

        let mut chars = key.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(Self::new(KeyCode::Char(ch), modifiers));
        }

        let code = match key.to_ascii_lowercase().as_str() {
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "space" => KeyCode::Char(' '),
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "pgup" | "pageup" => KeyCode::PageUp,
            "pgdown" | "pagedown" => KeyCode::PageDown,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            lower => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n) if (1..=12).contains(&n) => KeyCode::F(n),
                _ => return Err(KeyParseError::Key(key.to_string())),
            },
        };
        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            f.write_str("shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(ch) => write!(f, "{ch}"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::BackTab => f.write_str("backtab"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Up => f.write_str("↑"),
            KeyCode::Down => f.write_str("↓"),
            KeyCode::Left => f.write_str("←"),
            KeyCode::Right => f.write_str("→"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdown"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::F(n) => write!(f, "f{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Action → key chords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: BTreeMap<Action, Vec<KeySpec>>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = Action::ALL
            .iter()
            .map(|action| {
                let keys = action
                    .default_keys()
                    .iter()
                    .filter_map(|raw| raw.parse().ok())
                    .collect();
                (*action, keys)
            })
            .collect();
        Self { bindings }
    }
}

impl KeyMap {
    /// Defaults with some actions rebound.
    ///
    /// Each override replaces every default key of its action.
    pub fn with_overrides(
        overrides: &BTreeMap<Action, Vec<String>>,
    ) -> Result<Self, KeyParseError> {
        let mut map = Self::default();
        for (action, raw_keys) in overrides {
            let keys = raw_keys
                .iter()
                .map(|raw| raw.parse())
                .collect::<Result<Vec<KeySpec>, _>>()?;
            map.bindings.insert(*action, keys);
        }
        Ok(map)
    }

    /// First action bound to `key`, in [`Action::ALL`] order.
    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        Action::ALL.into_iter().find(|action| self.is(*action, key))
    }

    pub fn is(&self, action: Action, key: &KeyEvent) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|spec| spec.matches(key)))
    }

    pub fn keys(&self, action: Action) -> &[KeySpec] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Label for the first key of `action`, e.g. `"e"`.
    pub fn label(&self, action: Action) -> String {
        self.keys(action)
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unbound".to_string())
    }

    /// `(keys, description)` rows for the help panel.
    pub fn help_entries(&self, actions: &[Action]) -> Vec<(String, &'static str)> {
        actions
            .iter()
            .map(|action| {
                let keys = self
                    .keys(*action)
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("/");
                (keys, action.description())
            })
            .collect()
    }
}
