//! One-shot subcommands that don't need the terminal UI.

use color_eyre::Result;
use contact_guard::{
    ContentValidator, FieldKind, GuardConfig, SystemAppearance, ThemePreference, ThemeStore,
};
use tracing::info;

use crate::cli::ThemeCmd;

/// `portal check`: verdict of the validator as pretty JSON.
pub fn check(text: &str, multiline: bool, guard: &GuardConfig) -> Result<String> {
    let kind = if multiline {
        FieldKind::Multiline
    } else {
        FieldKind::Text
    };
    let verdict = ContentValidator::new(guard).validate(text, kind);
    info!(valid = verdict.valid, ?kind, "checked text");
    Ok(serde_json::to_string_pretty(&verdict)?)
}

/// `portal theme ...`: returns the line to print.
pub fn theme(store: &ThemeStore, action: ThemeCmd, system: SystemAppearance) -> Result<String> {
    match action {
        ThemeCmd::Show => Ok(match store.load() {
            Some(pref) => format!("{pref} (stored in {})", store.path().display()),
            None => format!("{} (system default)", system.preference()),
        }),
        ThemeCmd::Toggle => {
            let next = store.resolve(system).toggle();
            store.save(next)?;
            Ok(format!("theme set to {next}"))
        }
        ThemeCmd::Set { theme } => {
            let pref = ThemePreference::from(theme);
            store.save(pref)?;
            Ok(format!("theme set to {pref}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ThemeArg;
    use serde_json::Value;

    #[test]
    fn check_reports_rejections_as_json() {
        let out = check("DROP TABLE users", false, &GuardConfig::default()).unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["valid"], Value::Bool(false));
        assert_eq!(json["reason"], "denylisted");
        assert_eq!(json["category"], "sql_keyword");
    }

    #[test]
    fn check_respects_multiline_limit() {
        let long = "a".repeat(300);
        let guard = GuardConfig::default();
        let single: Value = serde_json::from_str(&check(&long, false, &guard).unwrap()).unwrap();
        let multi: Value = serde_json::from_str(&check(&long, true, &guard).unwrap()).unwrap();
        assert_eq!(single["valid"], Value::Bool(false));
        assert_eq!(multi["valid"], Value::Bool(true));
    }

    #[test]
    fn theme_commands_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("preferences.json"));
        let dark = SystemAppearance { prefers_dark: true };

        assert_eq!(theme(&store, ThemeCmd::Show, dark).unwrap(), "dark (system default)");
        assert_eq!(theme(&store, ThemeCmd::Toggle, dark).unwrap(), "theme set to light");
        assert_eq!(store.load(), Some(ThemePreference::Light));
        theme(
            &store,
            ThemeCmd::Set {
                theme: ThemeArg::Dark,
            },
            dark,
        )
        .unwrap();
        assert!(theme(&store, ThemeCmd::Show, dark)
            .unwrap()
            .starts_with("dark (stored in"));
    }
}
