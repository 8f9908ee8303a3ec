//! Projects card: the portfolio table with search, status and tech filters.
//!
//! `/` starts a search; Enter or Esc ends it and keeps the term. Outside the
//! search line only the filter keys are taken, so digits, arrows and `q`
//! still reach the global key map.

use color_eyre::Result;
use contact_guard::{ProjectCatalog, ProjectFilter, ProjectStatus};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use strum::IntoEnumIterator;
use tui_input::{backend::crossterm::EventHandler, Input, InputRequest};

use super::Component;
use crate::{
    action::Action,
    state::State,
    theme::{Theme, UiGroup},
    tui::{EventResponse, Frame},
};

const SEARCH_PROMPT: &str = "Search: ";

pub struct ProjectsView {
    catalog: ProjectCatalog,
    filter: ProjectFilter,
    search: Input,
    searching: bool,
    /// Highlighted entry of the tech chip row.
    tech_cursor: usize,
}

impl ProjectsView {
    pub fn new(catalog: ProjectCatalog) -> Self {
        Self {
            catalog,
            filter: ProjectFilter::new(),
            search: Input::default(),
            searching: false,
            tech_cursor: 0,
        }
    }

    pub fn filter(&self) -> &ProjectFilter {
        &self.filter
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Status toggled by its initial: `l`ive, `d`evelopment, `c`oncept.
    fn status_for_key(c: char) -> Option<ProjectStatus> {
        ProjectStatus::iter().find(|s| s.to_string().starts_with(c))
    }

    fn move_tech_cursor(&mut self, forward: bool) {
        let len = self.catalog.techs().len();
        if len == 0 {
            return;
        }
        self.tech_cursor = if forward {
            (self.tech_cursor + 1) % len
        } else {
            (self.tech_cursor + len - 1) % len
        };
    }

    fn toggle_tech_under_cursor(&mut self) {
        let tech = self.catalog.techs().get(self.tech_cursor).map(|t| t.to_string());
        if let Some(tech) = tech {
            self.filter.toggle_tech(&tech);
        }
    }

    fn clear(&mut self) {
        self.filter.clear();
        self.search = Input::default();
        self.searching = false;
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.searching = false,
            _ => {
                let changed = self
                    .search
                    .handle_event(&CrosstermEvent::Key(key))
                    .is_some_and(|c| c.value);
                if changed {
                    self.filter.set_search(self.search.value());
                }
            }
        }
    }

    fn chip<'a>(label: String, active: bool, theme: &Theme) -> Span<'a> {
        let group = if active {
            UiGroup::NavActive
        } else {
            UiGroup::Dimmed
        };
        Span::styled(label, theme.style(group))
    }

    fn status_chips(&self, theme: &Theme) -> Line<'static> {
        let mut spans = vec![
            Span::styled("Status  ", theme.style(UiGroup::Title)),
            Self::chip(" a all ".into(), self.filter.statuses().is_empty(), theme),
        ];
        for status in ProjectCatalog::statuses() {
            let name = status.to_string();
            let key = name.chars().next().unwrap_or(' ');
            let active = self.filter.statuses().contains(&status);
            spans.push(Span::raw(" "));
            spans.push(Self::chip(format!(" {key} {name} "), active, theme));
        }
        Line::from(spans)
    }

    fn tech_chips(&self, theme: &Theme) -> Line<'static> {
        let mut spans = vec![Span::styled("Tech    ", theme.style(UiGroup::Title))];
        for (i, tech) in self.catalog.techs().into_iter().enumerate() {
            let active = self.filter.techs().iter().any(|t| t == tech);
            let mut chip = Self::chip(format!(" {tech} "), active, theme);
            if i == self.tech_cursor {
                chip.style = chip.style.add_modifier(Modifier::UNDERLINED);
            }
            spans.push(chip);
        }
        Line::from(spans)
    }
}

impl Component for ProjectsView {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if self.searching {
            self.handle_search_key(key);
            return Ok(Some(EventResponse::Stop(Action::Render)));
        }
        match key.code {
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('a') => self.filter.all_statuses(),
            KeyCode::Char('x') => self.clear(),
            KeyCode::Char('[') => self.move_tech_cursor(false),
            KeyCode::Char(']') => self.move_tech_cursor(true),
            KeyCode::Char(' ') => self.toggle_tech_under_cursor(),
            KeyCode::Char(c) => match Self::status_for_key(c) {
                Some(status) => self.filter.toggle_status(status),
                None => return Ok(None),
            },
            _ => return Ok(None),
        }
        Ok(Some(EventResponse::Stop(Action::Render)))
    }

    fn handle_paste(&mut self, text: &str, _state: &mut State) -> Result<Option<Action>> {
        if !self.searching {
            return Ok(None);
        }
        for c in text.chars().filter(|c| !c.is_control()) {
            self.search.handle(InputRequest::InsertChar(c));
        }
        self.filter.set_search(self.search.value());
        Ok(Some(Action::Render))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &State) -> Result<()> {
        let theme = &state.theme;
        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.style(UiGroup::Border))
            .title(Span::styled(" Projects ", theme.style(UiGroup::Title)));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let [search_area, status_area, tech_area, summary_area, table_area, hint_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(inner);

        let search_style = if self.searching {
            theme.style(UiGroup::InputFocused)
        } else {
            theme.style(UiGroup::Base)
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(SEARCH_PROMPT, theme.style(UiGroup::Title)),
                Span::styled(self.search.value().to_string(), search_style),
            ])),
            search_area,
        );
        if self.searching {
            let cursor = (SEARCH_PROMPT.len() + self.search.visual_cursor()) as u16;
            f.set_cursor_position((search_area.x + cursor, search_area.y));
        }

        f.render_widget(Paragraph::new(self.status_chips(theme)), status_area);
        f.render_widget(Paragraph::new(self.tech_chips(theme)), tech_area);

        if let Some(line) = self.catalog.status_line(&self.filter) {
            let group = if self.catalog.visible(&self.filter).is_empty() {
                UiGroup::Warn
            } else {
                UiGroup::Accent
            };
            f.render_widget(Paragraph::new(line).style(theme.style(group)), summary_area);
        }

        let rows = self.catalog.visible(&self.filter).into_iter().map(|p| {
            Row::new(vec![
                Cell::from(p.name.clone()),
                Cell::from(p.status.to_string()),
                Cell::from(p.tech.join(", ")),
                Cell::from(p.description.clone()),
            ])
            .style(theme.style(UiGroup::Base))
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(20),
                Constraint::Length(12),
                Constraint::Length(26),
                Constraint::Fill(1),
            ],
        )
        .header(
            Row::new(vec!["Project", "Status", "Tech", "About"]).style(theme.style(UiGroup::Title)),
        );
        f.render_widget(table, table_area);

        f.render_widget(
            Paragraph::new("/ search · a/l/d/c status · [ ] pick tech · Space toggle · x clear")
                .style(theme.style(UiGroup::Dimmed)),
            hint_area,
        );
        Ok(())
    }
}
