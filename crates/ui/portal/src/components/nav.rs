use color_eyre::Result;
use contact_guard::Card;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use strum::IntoEnumIterator;

use super::Component;
use crate::{state::State, theme::UiGroup, tui::Frame};

/// Top line: one tab per card, plus the theme indicator.
#[derive(Default)]
pub struct NavBar;

impl NavBar {
    pub fn new() -> Self {
        Self
    }

    /// Card for the digit keys `1`..`5`.
    pub fn card_for_digit(c: char) -> Option<Card> {
        let idx = c.to_digit(10)?.checked_sub(1)? as usize;
        Card::iter().nth(idx)
    }

    /// Neighbour of `card` in tab order, wrapping around.
    pub fn neighbour(card: Card, forward: bool) -> Card {
        let cards: Vec<Card> = Card::iter().collect();
        let idx = cards.iter().position(|c| *c == card).unwrap_or(0);
        let len = cards.len();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        cards[next]
    }
}

impl Component for NavBar {
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &State) -> Result<()> {
        let theme = &state.theme;
        let current = state.navigator.current();
        let target = state.navigator.transition().map(|t| t.to);

        let mut spans = Vec::new();
        for (i, card) in Card::iter().enumerate() {
            let style = if card == current {
                theme.style(UiGroup::NavActive)
            } else if Some(card) == target {
                theme.style(UiGroup::Accent)
            } else {
                theme.style(UiGroup::Dimmed)
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, card.label()), style));
            spans.push(Span::raw(" "));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);

        let right = match target {
            Some(card) => Span::styled(card.loading_text(), theme.style(UiGroup::Accent)),
            None => Span::styled(
                format!("{} theme", state.theme_switch.current()),
                theme.style(UiGroup::Dimmed),
            ),
        };
        f.render_widget(
            Paragraph::new(Line::from(right)).alignment(Alignment::Right),
            area,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_cards() {
        assert_eq!(NavBar::card_for_digit('1'), Some(Card::Hero));
        assert_eq!(NavBar::card_for_digit('5'), Some(Card::Contact));
        assert_eq!(NavBar::card_for_digit('0'), None);
        assert_eq!(NavBar::card_for_digit('6'), None);
    }

    #[test]
    fn neighbours_wrap() {
        assert_eq!(NavBar::neighbour(Card::Contact, true), Card::Hero);
        assert_eq!(NavBar::neighbour(Card::Hero, false), Card::Contact);
        assert_eq!(NavBar::neighbour(Card::Story, true), Card::Projects);
    }
}
