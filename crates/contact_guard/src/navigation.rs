//! Which portal card is showing, and the lock held while switching cards.

use serde::Serialize;
use strum::{Display, EnumIter};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Card {
    #[default]
    Hero,
    Story,
    Projects,
    Tools,
    Contact,
}

impl Card {
    /// Navigation label.
    pub fn label(self) -> &'static str {
        match self {
            Card::Hero => "Home",
            Card::Story => "About",
            Card::Projects => "Projects",
            Card::Tools => "Automation Station",
            Card::Contact => "Contact",
        }
    }

    /// Text shown while switching to this card.
    pub fn loading_text(self) -> String {
        format!("Loading {}...", self.label())
    }
}

/// An in-flight card switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub id: u64,
    pub from: Card,
    pub to: Card,
}

#[derive(Debug, Clone, Default)]
pub struct CardNavigator {
    current: Card,
    transition: Option<Transition>,
    next_id: u64,
}

impl CardNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Card {
        self.current
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Start switching to `target`. `None` while another switch runs or if
    /// `target` is already showing.
    pub fn request(&mut self, target: Card) -> Option<Transition> {
        if let Some(t) = self.transition {
            debug!(to = %target, running = %t.to, "card request ignored, transition running");
            return None;
        }
        if target == self.current {
            return None;
        }
        self.next_id += 1;
        let transition = Transition {
            id: self.next_id,
            from: self.current,
            to: target,
        };
        self.transition = Some(transition);
        Some(transition)
    }

    /// Back button: go home.
    pub fn back(&mut self) -> Option<Transition> {
        self.request(Card::Hero)
    }

    /// Finish transition `id`. Returns the new current card, or `None` when
    /// `id` is not the running transition.
    pub fn complete(&mut self, id: u64) -> Option<Card> {
        match self.transition {
            Some(t) if t.id == id => {
                self.transition = None;
                self.current = t.to;
                debug!(card = %t.to, "card transition finished");
                Some(t.to)
            }
            _ => None,
        }
    }

    /// Drop any running switch and show the hero card.
    pub fn recover(&mut self) {
        if let Some(t) = self.transition.take() {
            warn!(from = %t.from, to = %t.to, "card transition aborted, returning home");
        }
        self.current = Card::Hero;
    }
}
