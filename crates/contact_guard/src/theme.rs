//! Light/dark theme preference and its persistence.
//!
//! The preference lives under a single key in a small JSON key-value file
//! (`<project>/data/preferences.json`). Other keys in that file are left
//! alone. Without a stored value the system appearance decides.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter};
use tracing::{debug, warn};

use crate::error::{GuardError, Result};

/// Key of the theme entry in the preference file.
pub const THEME_KEY: &str = "portal-theme";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

impl ThemePreference {
    pub fn toggle(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }
}

impl FromStr for ThemePreference {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(GuardError::UnknownTheme(other.to_string())),
        }
    }
}

/// Appearance reported by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemAppearance {
    pub prefers_dark: bool,
}

impl SystemAppearance {
    /// Detect from the process environment.
    pub fn detect() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Detect from an arbitrary variable lookup.
    ///
    /// `PORTAL_PREFERS_DARK` wins when set (`1/true/yes/on` or
    /// `0/false/no/off`). Otherwise the background index of `COLORFGBG`
    /// decides (7 and 9..=15 are light backgrounds). Default is dark.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("PORTAL_PREFERS_DARK") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => return Self { prefers_dark: true },
                "0" | "false" | "no" | "off" => return Self { prefers_dark: false },
                _ => {}
            }
        }

        if let Some(v) = lookup("COLORFGBG") {
            if let Some(bg) = v.rsplit(';').next().and_then(|s| s.trim().parse::<u8>().ok()) {
                let light = bg == 7 || (9..=15).contains(&bg);
                return Self {
                    prefers_dark: !light,
                };
            }
        }

        Self { prefers_dark: true }
    }

    pub fn preference(self) -> ThemePreference {
        if self.prefers_dark {
            ThemePreference::Dark
        } else {
            ThemePreference::Light
        }
    }
}

/// Reads and writes the theme key of the preference file.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored preference, if any. Unreadable or corrupt files count as
    /// "nothing stored".
    pub fn load(&self) -> Option<ThemePreference> {
        let map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable preference file: {e}");
                return None;
            }
        };
        let raw = map.get(THEME_KEY)?.as_str()?;
        match raw.parse() {
            Ok(pref) => Some(pref),
            Err(e) => {
                warn!("ignoring stored theme: {e}");
                None
            }
        }
    }

    /// Stored preference, else the system appearance.
    pub fn resolve(&self, system: SystemAppearance) -> ThemePreference {
        self.load().unwrap_or_else(|| {
            debug!(prefers_dark = system.prefers_dark, "no stored theme, using system appearance");
            system.preference()
        })
    }

    /// Persist `pref`, keeping every other key of the file. A corrupt file
    /// is replaced.
    pub fn save(&self, pref: ThemePreference) -> Result<()> {
        let mut map = self.read_map().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "overwriting corrupt preference file: {e}");
            BTreeMap::new()
        });
        map.insert(THEME_KEY.to_string(), Value::String(pref.as_str().to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&map)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(theme = %pref, path = %self.path.display(), "theme saved");
        Ok(())
    }
}

/// Current theme plus the lock that swallows toggles during a transition.
#[derive(Debug, Clone)]
pub struct ThemeSwitch {
    current: ThemePreference,
    transitioning: bool,
}

impl ThemeSwitch {
    pub fn new(current: ThemePreference) -> Self {
        Self {
            current,
            transitioning: false,
        }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Flip the theme and lock. Returns `None` while a transition runs.
    pub fn toggle(&mut self) -> Option<ThemePreference> {
        if self.transitioning {
            return None;
        }
        self.current = self.current.toggle();
        self.transitioning = true;
        Some(self.current)
    }

    pub fn finish_transition(&mut self) {
        self.transitioning = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("Light".parse::<ThemePreference>().unwrap(), ThemePreference::Light);
        assert_eq!(ThemePreference::Dark.to_string(), "dark");
        assert!(matches!(
            "sepia".parse::<ThemePreference>(),
            Err(GuardError::UnknownTheme(_))
        ));
    }

    #[test]
    fn system_appearance_sources() {
        assert!(SystemAppearance::from_lookup(lookup(&[])).prefers_dark);
        assert!(!SystemAppearance::from_lookup(lookup(&[("COLORFGBG", "0;15")])).prefers_dark);
        assert!(SystemAppearance::from_lookup(lookup(&[("COLORFGBG", "15;0")])).prefers_dark);
        assert!(
            !SystemAppearance::from_lookup(lookup(&[
                ("PORTAL_PREFERS_DARK", "no"),
                ("COLORFGBG", "15;0"),
            ]))
            .prefers_dark
        );
    }

    #[test]
    fn missing_file_falls_back_to_system() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("data/preferences.json"));
        assert_eq!(store.load(), None);
        let light = SystemAppearance {
            prefers_dark: false,
        };
        assert_eq!(store.resolve(light), ThemePreference::Light);
    }

    #[test]
    fn save_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"volume": 3}"#).unwrap();

        let store = ThemeStore::new(&path);
        store.save(ThemePreference::Light).unwrap();
        assert_eq!(store.load(), Some(ThemePreference::Light));

        let map: BTreeMap<String, Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(map.get("volume"), Some(&Value::from(3)));
    }

    #[test]
    fn save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let store = ThemeStore::new(&path);
        store.save(ThemePreference::Light).unwrap();
        store.save(ThemePreference::Dark).unwrap();

        assert_eq!(store.load(), Some(ThemePreference::Dark));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["preferences.json".to_string()]);
    }

    #[test]
    fn corrupt_file_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let store = ThemeStore::new(&path);
        assert_eq!(store.load(), None);
        store.save(ThemePreference::Dark).unwrap();
        assert_eq!(store.load(), Some(ThemePreference::Dark));
    }

    #[test]
    fn toggle_is_locked_during_transition() {
        let mut switch = ThemeSwitch::new(ThemePreference::Dark);
        assert_eq!(switch.toggle(), Some(ThemePreference::Light));
        assert_eq!(switch.toggle(), None);
        assert_eq!(switch.current(), ThemePreference::Light);
        switch.finish_transition();
        assert_eq!(switch.toggle(), Some(ThemePreference::Dark));
    }
}
