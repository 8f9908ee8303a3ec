mod action;
mod cli;
mod commands;
mod components;
mod config;
mod errors;
mod portal;
mod state;
mod theme;
mod tui;

use app::{AppBuilder, Application, ConsoleLogging};
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use contact_guard::{SystemAppearance, ThemeStore};

use crate::cli::{Cli, Cmd, ThemeCmd};
use crate::config::PortalConfig;
use crate::portal::PortalApp;
use crate::theme::{ColorMode, Theme};

struct Portal;

impl Application for Portal {
    const APP_ID: &'static str = "portal";
}

#[tokio::main]
pub async fn main() -> Result<()> {
    errors::init()?;
    let args = Cli::parse();
    let cmd = args.cmd.unwrap_or(Cmd::Run);

    // the TUI owns stdout, so it only logs to file
    let console = match cmd {
        Cmd::Run => ConsoleLogging::Disabled,
        _ => ConsoleLogging::Enabled,
    };
    let context = AppBuilder::<Portal>::new(env!("CARGO_PKG_VERSION"), console)
        .map_err(|e| eyre!("failed to initialize portal: {e}"))?
        .build_simple();

    let config = PortalConfig::load(&context.path_context().config_dir())?;
    let store = ThemeStore::new(context.path_context().preferences_file());
    let system = SystemAppearance::detect();

    match cmd {
        Cmd::Run => {
            let theme = Theme::new(store.resolve(system), ColorMode::detect());
            let mut app = PortalApp::new(config, store, theme);
            app.run().await?;
        }
        Cmd::Check { text, multiline } => {
            println!("{}", commands::check(&text, multiline, &config.guard)?);
        }
        Cmd::Theme { action } => {
            let action = action.unwrap_or(ThemeCmd::Show);
            println!("{}", commands::theme(&store, action, system)?);
        }
    }
    Ok(())
}
