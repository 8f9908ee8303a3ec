use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use contact_guard::GuardConfig;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    /// Overrides the config directory from the path context.
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

/// Settings of the terminal front end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Ticks per second.
    pub tick_rate: f64,
    /// Frames per second.
    pub frame_rate: f64,
    /// Duration of a card switch.
    pub card_transition_ms: u64,
    /// Lock time of the theme toggle.
    pub theme_transition_ms: u64,
    pub guard: GuardConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            tick_rate: 4.0,
            frame_rate: 30.0,
            card_transition_ms: 800,
            theme_transition_ms: 600,
            guard: GuardConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Load `config.json5` / `config.toml` from `config_dir` (or from
    /// `$PORTAL_CONFIG` when set), then `PORTAL__*` environment variables.
    /// Every file is optional.
    pub fn load(config_dir: &Path) -> Result<Self, config::ConfigError> {
        let config_dir = CONFIG_FOLDER.clone().unwrap_or_else(|| config_dir.to_path_buf());
        let defaults = config::Config::try_from(&PortalConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            let source = config::File::from(path.clone())
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if path.exists() {
                info!(path = %path.display(), "loading configuration file");
                found_config = true;
            }
        }
        if !found_config {
            debug!(dir = %config_dir.display(), "no configuration file, using defaults");
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&PROJECT_NAME)
                .prefix_separator("__")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    pub fn card_transition(&self) -> Duration {
        Duration::from_millis(self.card_transition_ms)
    }

    pub fn theme_transition(&self) -> Duration {
        Duration::from_millis(self.theme_transition_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PortalConfig::load(dir.path()).unwrap();
        assert_eq!(cfg, PortalConfig::default());
    }

    #[test]
    fn toml_overrides_nested_guard_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "card_transition_ms = 200\n[guard]\nmax_attempts = 5\n",
        )
        .unwrap();
        let cfg = PortalConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.card_transition(), Duration::from_millis(200));
        assert_eq!(cfg.guard.max_attempts, 5);
        assert_eq!(cfg.guard.window_secs, 60);
    }

    #[test]
    fn json5_document_deserializes() {
        let cfg: PortalConfig =
            json5::from_str("{ frame_rate: 60.0, guard: { multiline_limit: 800 } }").unwrap();
        assert_eq!(cfg.frame_rate, 60.0);
        assert_eq!(cfg.guard.multiline_limit, 800);
        assert_eq!(cfg.tick_rate, 4.0);
    }
}
