use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::{
    action::Action,
    state::State,
    tui::{EventResponse, Frame},
};

pub mod card;
pub mod contact_form;
pub mod nav;
pub mod projects;

/// `Component` is a visual and interactive element of the user interface.
///
/// Implementors receive key events and actions from the app loop and draw
/// themselves into the area they are given.
pub trait Component {
    fn handle_key_events(
        &mut self,
        _key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn handle_paste(&mut self, _text: &str, _state: &mut State) -> Result<Option<Action>> {
        Ok(None)
    }

    fn update(&mut self, _action: &Action, _state: &mut State) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &State) -> Result<()>;
}
