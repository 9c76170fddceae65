//! Viewer configuration: `.runlens.toml` layered under CLI flags.
//!
//! Resolution order is CLI flag, then config file, then built-in default.
//! The file is either given explicitly or found by walking up from the
//! current directory; having none is fine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::de::IntoDeserializer;
use serde::Deserialize;

use crate::ui::keys::{Action, KeyMap};

pub const CONFIG_FILE: &str = ".runlens.toml";

/// Shortest accepted redraw/poll interval.
const MIN_TICK_MS: u64 = 10;

/// Contents of `.runlens.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Action name → key specs, e.g. `quit = ["q", "ctrl+c"]`.
    #[serde(default)]
    pub keys: BTreeMap<String, Vec<String>>,
}

/// `[viewer]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Buffer capacity; 0 keeps everything.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    #[serde(default = "default_true")]
    pub auto_scroll: bool,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
            auto_scroll: true,
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_max_events() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

fn default_tick_ms() -> u64 {
    50
}

/// Fully resolved settings used to start the viewer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub max_events: usize,
    pub auto_scroll: bool,
    pub tick: Duration,
    pub keys: KeyMap,
    /// The config file the settings came from, if any.
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Layer CLI overrides on top of a parsed config file.
    pub fn resolve(
        file: FileConfig,
        source: Option<PathBuf>,
        max_events: Option<usize>,
    ) -> Result<Self> {
        let overrides = file
            .keys
            .iter()
            .map(|(name, keys)| Ok((parse_action(name)?, keys.clone())))
            .collect::<Result<BTreeMap<Action, Vec<String>>>>()?;
        let keys = KeyMap::with_overrides(&overrides).context("Invalid [keys] binding")?;

        Ok(Self {
            max_events: max_events.unwrap_or(file.viewer.max_events),
            auto_scroll: file.viewer.auto_scroll,
            tick: Duration::from_millis(file.viewer.tick_ms.max(MIN_TICK_MS)),
            keys,
            source,
        })
    }

    /// Load the config file (explicit or discovered) and apply CLI overrides.
    pub fn load(explicit: Option<&Path>, max_events: Option<usize>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover()?,
        };
        let file = match &path {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, path, max_events)
    }
}

fn parse_action(name: &str) -> Result<Action> {
    Action::deserialize(name.into_deserializer())
        .map_err(|_: serde::de::value::Error| anyhow!("Unknown action '{name}' in [keys]"))
}

/// Find `.runlens.toml` by walking up from the current directory.
pub fn discover() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir().context("Failed to read current directory")?;
    Ok(discover_from(&cwd))
}

fn discover_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Parse one config file.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn temp_config(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let (_dir, path) = temp_config("");
        let file = load_file(&path).unwrap();
        assert_eq!(file, FileConfig::default());
        let settings = Settings::resolve(file, None, None).unwrap();
        assert_eq!(settings.max_events, 1000);
        assert!(settings.auto_scroll);
        assert_eq!(settings.tick, Duration::from_millis(50));
    }

    #[test]
    fn file_values_and_cli_override() {
        let (_dir, path) = temp_config("[viewer]\nmax_events = 50\nauto_scroll = false\ntick_ms = 1\n");
        let file = load_file(&path).unwrap();
        assert_eq!(file.viewer.max_events, 50);

        let settings = Settings::resolve(file.clone(), None, None).unwrap();
        assert_eq!(settings.max_events, 50);
        assert!(!settings.auto_scroll);
        assert_eq!(settings.tick, Duration::from_millis(MIN_TICK_MS));

        let settings = Settings::resolve(file, None, Some(0)).unwrap();
        assert_eq!(settings.max_events, 0);
    }

    #[test]
    fn key_overrides_are_applied() {
        let (_dir, path) = temp_config("[keys]\ntoggle_expand = [\"x\"]\nquit = [\"ctrl+q\"]\n");
        let settings = Settings::resolve(load_file(&path).unwrap(), None, None).unwrap();
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(settings.keys.action_for(&x), Some(Action::ToggleExpand));
        assert_eq!(settings.keys.action_for(&q), None);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let (_dir, path) = temp_config("[keys]\nexplode = [\"x\"]\n");
        let err = Settings::resolve(load_file(&path).unwrap(), None, None).unwrap_err();
        assert!(err.to_string().contains("explode"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let (_dir, path) = temp_config("[viewer]\nmax_event = 5\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn discovers_config_two_directories_up() {
        let (dir, path) = temp_config("");
        let subdir = dir.path().join("a").join("b");
        fs::create_dir_all(&subdir).unwrap();
        assert_eq!(discover_from(&subdir), Some(path));
    }

    #[test]
    fn missing_config_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep");
        fs::create_dir_all(&nested).unwrap();
        // A stray file further up the real filesystem would be found too, so
        // only check that nothing inside the temp dir matched.
        assert!(discover_from(&nested).map_or(true, |p| !p.starts_with(dir.path())));
    }
}
