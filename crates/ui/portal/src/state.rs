use contact_guard::{CardNavigator, ThemeSwitch};

use crate::theme::Theme;

/// Page state shared by every component. Owned by the app loop.
pub struct State {
    pub navigator: CardNavigator,
    pub theme_switch: ThemeSwitch,
    pub theme: Theme,
    /// Last error worth showing in the status line.
    pub status: Option<String>,
}

impl State {
    pub fn new(theme: Theme) -> Self {
        Self {
            navigator: CardNavigator::new(),
            theme_switch: ThemeSwitch::new(theme.preference),
            theme,
            status: None,
        }
    }
}
