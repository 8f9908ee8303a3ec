//! Contact card: the terminal rendition of the guarded contact form.
//!
//! The component owns the [`FormOrchestrator`] and the [`SubmissionDriver`].
//! Keystrokes edit a `tui-input` buffer for the focused field; every change
//! is fed to the orchestrator as an `input` event and focus changes become
//! `blur`/`focus` events. When the controller rewrites a value the buffer is
//! replaced with the sanitized text.
//!
//! The honeypot has no widget. Humans can't fill it from here, but the
//! orchestrator still enforces it.

use color_eyre::Result;
use contact_guard::{
    Banner, FieldController, FieldStatus, FormEvent, FormLayout, FormOrchestrator, GuardConfig,
    SubmissionDriver, SubmitOutcome,
};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tui_input::{backend::crossterm::EventHandler, Input, InputRequest};

use super::Component;
use crate::{
    action::Action,
    state::State,
    theme::{Theme, UiGroup},
    tui::{EventResponse, Frame},
};

pub struct ContactForm {
    form: Option<FormOrchestrator>,
    driver: SubmissionDriver,
    /// Index into the visible fields; `fields.len()` is the submit button.
    focused: usize,
    input: Input,
}

impl ContactForm {
    /// Build the contact form. A broken layout disables the form instead of
    /// failing the whole UI.
    pub fn new(guard: &GuardConfig, events: UnboundedSender<FormEvent>) -> Self {
        let form = match FormOrchestrator::new(FormLayout::contact(), guard) {
            Ok(form) => Some(form),
            Err(e) => {
                warn!("contact form disabled: {e}");
                None
            }
        };
        Self::with_parts(form, SubmissionDriver::simulated(guard, events))
    }

    pub fn with_parts(form: Option<FormOrchestrator>, driver: SubmissionDriver) -> Self {
        Self {
            form,
            driver,
            focused: 0,
            input: Input::default(),
        }
    }

    pub fn form(&self) -> Option<&FormOrchestrator> {
        self.form.as_ref()
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    fn field_count(&self) -> usize {
        self.form.as_ref().map_or(0, |f| f.fields().len())
    }

    fn on_submit_button(&self) -> bool {
        self.focused >= self.field_count()
    }

    fn focused_field(&self) -> Option<&FieldController> {
        self.form.as_ref()?.fields().get(self.focused)
    }

    fn focused_key(&self) -> Option<String> {
        self.focused_field().map(|f| f.key().to_string())
    }

    /// Move focus to `index`, blurring the field that had it.
    fn focus(&mut self, index: usize) {
        if let (Some(key), Some(form)) = (self.focused_key(), self.form.as_mut()) {
            form.on_blur(&key);
        }
        self.focused = index.min(self.field_count());
        let value = match (self.focused_key(), self.form.as_mut()) {
            (Some(key), Some(form)) => {
                form.on_focus(&key);
                form.field(&key).map(|f| f.value().to_string()).unwrap_or_default()
            }
            _ => String::new(),
        };
        self.input = Input::new(value);
    }

    fn move_focus(&mut self, forward: bool) {
        let slots = self.field_count() + 1;
        let next = if forward {
            (self.focused + 1) % slots
        } else {
            (self.focused + slots - 1) % slots
        };
        self.focus(next);
    }

    /// Called when the contact card becomes visible.
    pub fn enter(&mut self) {
        self.focus(0);
    }

    /// Push the buffer into the orchestrator as a live `input` event.
    fn sync_input(&mut self) {
        let (Some(key), Some(form)) = (self.focused_key(), self.form.as_mut()) else {
            return;
        };
        if let Some(feedback) = form.on_input(&key, self.input.value()) {
            if let Some(replaced) = feedback.replaced {
                self.input = Input::new(replaced);
            }
        }
    }

    fn editable(&self) -> bool {
        self.form.as_ref().is_some_and(|f| f.is_editable())
    }

    fn submit(&mut self) {
        if let Some(key) = self.focused_key() {
            if let Some(form) = self.form.as_mut() {
                form.on_blur(&key);
            }
        }
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.submit() {
            SubmitOutcome::Accepted { ticket, submission } => {
                self.driver.dispatch(ticket, submission);
            }
            SubmitOutcome::Blocked { reason, message } => {
                info!(%reason, %message, "contact form submit blocked");
            }
        }
        if let Some(value) = self.focused_field().map(|f| f.value().to_string()) {
            self.input = Input::new(value);
        }
    }

    fn apply(&mut self, event: &FormEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let reset = match event {
            FormEvent::Sent(ticket) => {
                form.complete_send(*ticket);
                false
            }
            FormEvent::SendFailed { ticket, message } => {
                form.fail_send(*ticket, message.clone());
                false
            }
            FormEvent::ResetDue(ticket) => form.finish_success(*ticket),
        };
        if reset {
            self.focused = 0;
            self.input = Input::default();
        }
    }

    /// Clear the form and drop any submission in flight.
    pub fn reset(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.reset();
        }
        self.driver.cancel_all();
        self.focused = 0;
        self.input = Input::default();
    }

    pub fn shutdown(&mut self) {
        self.driver.shutdown();
    }

    fn field_height(field: &FieldController) -> u16 {
        let input_rows = if field.spec().kind.is_multiline() { 6 } else { 3 };
        input_rows + 1
    }

    fn draw_field(
        &self,
        f: &mut Frame<'_>,
        area: Rect,
        field: &FieldController,
        focused: bool,
        theme: &Theme,
    ) {
        let [box_area, error_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .areas(area);

        let border = if focused {
            theme.style(UiGroup::Accent)
        } else {
            match field.status() {
                FieldStatus::Valid => theme.style(UiGroup::Success),
                FieldStatus::Invalid => theme.style(UiGroup::Error),
                FieldStatus::Pristine => theme.style(UiGroup::Border),
            }
        };
        let spec = field.spec();
        let mut title = format!(" {} ", spec.label);
        if spec.requirement == contact_guard::Requirement::Required {
            title.push_str("* ");
        }
        let counter_style = if field.char_count() > field.limit() {
            theme.style(UiGroup::Error)
        } else {
            theme.style(UiGroup::Dimmed)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(title, theme.style(UiGroup::Title)))
            .title_bottom(
                Line::from(Span::styled(
                    format!(" {}/{} ", field.char_count(), field.limit()),
                    counter_style,
                ))
                .right_aligned(),
            );

        let value = if focused {
            self.input.value()
        } else {
            field.value()
        };
        let inner_width = box_area.width.saturating_sub(2) as usize;
        if spec.kind.is_multiline() {
            f.render_widget(
                Paragraph::new(value.to_string())
                    .style(theme.style(UiGroup::Base))
                    .block(block)
                    .wrap(Wrap { trim: false }),
                box_area,
            );
        } else {
            let scroll = if focused {
                self.input.visual_scroll(inner_width)
            } else {
                0
            };
            f.render_widget(
                Paragraph::new(value.to_string())
                    .style(theme.style(UiGroup::Base))
                    .scroll((0, scroll as u16))
                    .block(block),
                box_area,
            );
            if focused && self.editable() {
                let cursor = self.input.visual_cursor().saturating_sub(scroll) as u16;
                f.set_cursor_position((box_area.x + 1 + cursor, box_area.y + 1));
            }
        }

        let below = match (field.error(), &spec.help) {
            (Some(err), _) => Span::styled(err.to_string(), theme.style(UiGroup::Error)),
            (None, Some(help)) => Span::styled(help.clone(), theme.style(UiGroup::Dimmed)),
            (None, None) => Span::raw(""),
        };
        f.render_widget(Paragraph::new(Line::from(below)), error_area);
    }
}

impl Component for ContactForm {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if self.form.is_none() {
            return Ok(None);
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => Ok(Some(EventResponse::Stop(Action::Submit))),
            KeyCode::Char('r') if ctrl => Ok(Some(EventResponse::Stop(Action::ResetForm))),
            KeyCode::Esc => Ok(None),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
            KeyCode::Enter if self.on_submit_button() => {
                Ok(Some(EventResponse::Stop(Action::Submit)))
            }
            KeyCode::Enter => {
                let multiline = self
                    .focused_field()
                    .is_some_and(|f| f.spec().kind.is_multiline());
                if multiline && self.editable() {
                    self.input.handle(InputRequest::InsertChar('\n'));
                    self.sync_input();
                } else {
                    self.move_focus(true);
                }
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
            _ if ctrl => Ok(None),
            _ => {
                if !self.on_submit_button() && self.editable() {
                    let changed = self
                        .input
                        .handle_event(&CrosstermEvent::Key(key))
                        .is_some_and(|c| c.value);
                    if changed {
                        self.sync_input();
                    }
                }
                // swallow everything else so typing never triggers global keys
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
        }
    }

    fn handle_paste(&mut self, text: &str, _state: &mut State) -> Result<Option<Action>> {
        if self.on_submit_button() || !self.editable() {
            return Ok(None);
        }
        for c in text.chars() {
            self.input.handle(InputRequest::InsertChar(c));
        }
        self.sync_input();
        Ok(Some(Action::Update))
    }

    fn update(&mut self, action: &Action, _state: &mut State) -> Result<Option<Action>> {
        match action {
            Action::Submit => self.submit(),
            Action::Form(event) => self.apply(event),
            Action::ResetForm => self.reset(),
            _ => return Ok(None),
        }
        Ok(Some(Action::Render))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &State) -> Result<()> {
        let theme = &state.theme;
        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.style(UiGroup::Border))
            .title(Span::styled(" Contact ", theme.style(UiGroup::Title)));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let Some(form) = self.form.as_ref() else {
            f.render_widget(
                Paragraph::new("The contact form is unavailable right now.")
                    .style(theme.style(UiGroup::Warn)),
                inner,
            );
            return Ok(());
        };

        let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
        constraints.extend(
            form.fields()
                .iter()
                .map(|field| Constraint::Length(Self::field_height(field))),
        );
        constraints.extend([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ]);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let snapshot = form.snapshot();
        let percent = (snapshot.progress * 100.0).round() as u16;
        f.render_widget(
            Gauge::default()
                .gauge_style(theme.style(UiGroup::Accent))
                .percent(percent.min(100))
                .label(format!("{percent}% complete")),
            rows[0],
        );

        if let Some(banner) = &snapshot.banner {
            let (text, style) = match banner {
                Banner::Success(text) => (text, theme.style(UiGroup::Success)),
                Banner::Error(text) => (text, theme.style(UiGroup::Error)),
            };
            f.render_widget(Paragraph::new(text.as_str()).style(style), rows[1]);
        }

        for (i, field) in form.fields().iter().enumerate() {
            self.draw_field(f, rows[i + 2], field, i == self.focused, theme);
        }

        let button_row = rows[form.fields().len() + 2];
        let button_style = if !snapshot.submit_enabled {
            theme.style(UiGroup::Dimmed)
        } else if self.on_submit_button() {
            theme.style(UiGroup::NavActive)
        } else {
            theme.style(UiGroup::Accent)
        };
        f.render_widget(
            Paragraph::new(Span::styled(format!("[ {} ]", snapshot.submit_label), button_style)),
            button_row,
        );

        let hints = rows[form.fields().len() + 3];
        f.render_widget(
            Paragraph::new("Tab/Shift-Tab move · Enter next · Ctrl-S send · Ctrl-R clear · Esc back")
                .style(theme.style(UiGroup::Dimmed)),
            hints,
        );
        Ok(())
    }
}
