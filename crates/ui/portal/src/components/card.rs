use color_eyre::Result;
use contact_guard::Card;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::Component;
use crate::{state::State, theme::UiGroup, tui::Frame};

/// Static content of the non-form cards.
#[derive(Default)]
pub struct CardView;

impl CardView {
    pub fn new() -> Self {
        Self
    }

    fn body(card: Card) -> &'static [&'static str] {
        match card {
            Card::Hero => &[
                "Building calm software for noisy problems.",
                "",
                "Automation, tooling and the occasional hologram.",
                "",
                "Use 1-5 or Left/Right to move between cards.",
            ],
            Card::Story => &[
                "Started out scripting the boring parts of a job away,",
                "kept going until the scripts became products.",
                "",
                "These days: workflow automation, internal tools and",
                "small, sharp web experiences.",
            ],
            Card::Tools => &[
                "Automation Station",
                "",
                "Reusable building blocks for reports, sync jobs and",
                "notifications. Ask about them on the Contact card.",
            ],
            // drawn by their own components
            Card::Projects | Card::Contact => &[],
        }
    }
}

impl Component for CardView {
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &State) -> Result<()> {
        let theme = &state.theme;
        let card = state.navigator.current();
        let lines: Vec<Line> = Self::body(card)
            .iter()
            .map(|l| Line::from(Span::styled(*l, theme.style(UiGroup::Base))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.style(UiGroup::Border))
            .title(Span::styled(format!(" {} ", card.label()), theme.style(UiGroup::Title)));
        f.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
        Ok(())
    }
}
