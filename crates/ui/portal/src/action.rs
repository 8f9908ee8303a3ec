use contact_guard::{Card, FormEvent};
use strum::Display;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Quit,
    Error(String),
    /// Ask the navigator for a card switch.
    Navigate(Card),
    /// Back button.
    Back,
    /// A card switch timer finished.
    TransitionDone(u64),
    ToggleTheme,
    /// The theme toggle lock expired.
    ThemeSettled,
    Submit,
    /// Clear the contact form and drop a submission in flight.
    ResetForm,
    /// Result of the submission driver.
    Form(FormEvent),
    Update,
}
