use std::time::Duration;

use color_eyre::Result;
use contact_guard::{Card, FormEvent, ProjectCatalog, ThemeStore, Transition};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    action::Action,
    components::{
        card::CardView, contact_form::ContactForm, nav::NavBar, projects::ProjectsView, Component,
    },
    config::PortalConfig,
    state::State,
    theme::{Theme, UiGroup},
    tui::{Event, EventResponse, Frame, Tui},
};

/// What woke the main loop.
enum Incoming {
    Terminal(Event),
    Form(FormEvent),
}

pub struct PortalApp {
    config: PortalConfig,
    store: ThemeStore,
    state: State,
    nav: NavBar,
    card: CardView,
    contact: ContactForm,
    projects: ProjectsView,
    form_rx: UnboundedReceiver<FormEvent>,
    /// Parent of every scheduled timer; cancelled on shutdown.
    timers: CancellationToken,
    should_quit: bool,
}

impl PortalApp {
    pub fn new(config: PortalConfig, store: ThemeStore, theme: Theme) -> Self {
        let (form_tx, form_rx) = mpsc::unbounded_channel();
        let contact = ContactForm::new(&config.guard, form_tx);
        Self {
            config,
            store,
            state: State::new(theme),
            nav: NavBar::new(),
            card: CardView::new(),
            contact,
            projects: ProjectsView::new(ProjectCatalog::portfolio()),
            form_rx,
            timers: CancellationToken::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let mut tui = Tui::new()?
            .tick_rate(self.config.tick_rate)
            .frame_rate(self.config.frame_rate);
        tui.enter()?;
        info!(theme = %self.state.theme.preference, "portal started");

        loop {
            let incoming = tokio::select! {
                event = tui.next() => match event {
                    Some(event) => Incoming::Terminal(event),
                    None => break,
                },
                Some(event) = self.form_rx.recv() => Incoming::Form(event),
            };
            match incoming {
                Incoming::Terminal(event) => self.handle_event(event, &action_tx)?,
                Incoming::Form(event) => action_tx.send(Action::Form(event))?,
            }

            while let Ok(action) = action_rx.try_recv() {
                if !matches!(action, Action::Tick | Action::Render) {
                    debug!("{action:?}");
                }
                if let Action::Resize(w, h) = action {
                    tui.resize(Rect::new(0, 0, w, h))?;
                }
                if self.update(action, &action_tx)? {
                    self.render(&mut tui, &action_tx)?;
                }
            }

            if self.should_quit {
                tui.stop()?;
                break;
            }
        }

        self.timers.cancel();
        self.contact.shutdown();
        tui.exit()?;
        info!("portal stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tx: &UnboundedSender<Action>) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key(key, tx)?,
            Event::Paste(text) => {
                let action = match self.active_card() {
                    Some(Card::Contact) => self.contact.handle_paste(&text, &mut self.state)?,
                    Some(Card::Projects) => self.projects.handle_paste(&text, &mut self.state)?,
                    _ => None,
                };
                if let Some(action) = action {
                    tx.send(action)?;
                }
            }
            Event::Tick => tx.send(Action::Tick)?,
            Event::Render => tx.send(Action::Render)?,
            Event::Resize(w, h) => tx.send(Action::Resize(w, h))?,
            Event::Error => tx.send(Action::Error("terminal event error".into()))?,
            _ => {}
        }
        Ok(())
    }

    /// Card that takes keys before the global map, if it is fully shown.
    fn active_card(&self) -> Option<Card> {
        (!self.state.navigator.is_transitioning()).then(|| self.state.navigator.current())
    }

    fn handle_key(&mut self, key: KeyEvent, tx: &UnboundedSender<Action>) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Ok(tx.send(Action::Quit)?),
                KeyCode::Char('t') => return Ok(tx.send(Action::ToggleTheme)?),
                _ => {}
            }
        }

        let response = match self.active_card() {
            Some(Card::Contact) => self.contact.handle_key_events(key, &mut self.state)?,
            Some(Card::Projects) => self.projects.handle_key_events(key, &mut self.state)?,
            _ => None,
        };
        match response {
            Some(EventResponse::Stop(action)) => return Ok(tx.send(action)?),
            Some(EventResponse::Continue(action)) => tx.send(action)?,
            None => {}
        }

        // arrows aim at the card being loaded, so repeated presses don't stall
        let anchor = self
            .state
            .navigator
            .transition()
            .map_or(self.state.navigator.current(), |t| t.to);
        let action = match key.code {
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Right | KeyCode::Tab => Some(Action::Navigate(NavBar::neighbour(anchor, true))),
            KeyCode::Left | KeyCode::BackTab => {
                Some(Action::Navigate(NavBar::neighbour(anchor, false)))
            }
            KeyCode::Char(c) => NavBar::card_for_digit(c).map(Action::Navigate),
            _ => None,
        };
        if let Some(action) = action {
            tx.send(action)?;
        }
        Ok(())
    }

    /// Apply one action. Returns `true` when the screen should be redrawn.
    fn update(&mut self, action: Action, tx: &UnboundedSender<Action>) -> Result<bool> {
        let mut redraw = false;
        match &action {
            Action::Tick | Action::Update => {}
            Action::Render | Action::Resize(..) => redraw = true,
            Action::Quit => self.should_quit = true,
            Action::Navigate(card) => {
                if let Some(transition) = self.state.navigator.request(*card) {
                    self.begin_transition(transition, tx);
                    redraw = true;
                }
            }
            Action::Back => {
                if let Some(transition) = self.state.navigator.back() {
                    self.begin_transition(transition, tx);
                    redraw = true;
                }
            }
            Action::TransitionDone(id) => {
                if let Some(card) = self.state.navigator.complete(*id) {
                    if card == Card::Contact {
                        self.contact.enter();
                    }
                    redraw = true;
                }
            }
            Action::ToggleTheme => {
                if let Some(pref) = self.state.theme_switch.toggle() {
                    self.state.theme = self.state.theme.with_preference(pref);
                    if let Err(e) = self.store.save(pref) {
                        // the toggle still applies for this session
                        warn!("failed to persist theme preference: {e}");
                    }
                    self.schedule(self.config.theme_transition(), Action::ThemeSettled, tx);
                    redraw = true;
                }
            }
            Action::ThemeSettled => self.state.theme_switch.finish_transition(),
            Action::Error(msg) => {
                error!("{msg}");
                self.state.navigator.recover();
                self.state.status = Some(msg.clone());
                redraw = true;
            }
            Action::Submit | Action::ResetForm | Action::Form(_) => {}
        }

        if let Some(next) = self.contact.update(&action, &mut self.state)? {
            tx.send(next)?;
        }
        Ok(redraw)
    }

    fn begin_transition(&self, transition: Transition, tx: &UnboundedSender<Action>) {
        debug!(from = %transition.from, to = %transition.to, "card transition started");
        self.schedule(
            self.config.card_transition(),
            Action::TransitionDone(transition.id),
            tx,
        );
    }

    /// Send `action` after `after`, unless the app shuts down first.
    fn schedule(&self, after: Duration, action: Action, tx: &UnboundedSender<Action>) {
        let token = self.timers.child_token();
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    tx.send(action).ok();
                }
            }
        });
    }

    fn render(&mut self, tui: &mut Tui, tx: &UnboundedSender<Action>) -> Result<()> {
        let mut failure = None;
        tui.draw(|f| {
            if let Err(e) = self.draw(f) {
                failure = Some(e);
            }
        })?;
        if let Some(err) = failure {
            tx.send(Action::Error(format!("Failed to draw: {err:?}")))?;
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame<'_>) -> Result<()> {
        let [nav_area, body, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(f.area());

        self.nav.draw(f, nav_area, &self.state)?;
        match self.state.navigator.current() {
            Card::Contact => self.contact.draw(f, body, &self.state)?,
            Card::Projects => self.projects.draw(f, body, &self.state)?,
            _ => self.card.draw(f, body, &self.state)?,
        }

        let theme = &self.state.theme;
        let status = match &self.state.status {
            Some(msg) => Span::styled(msg.clone(), theme.style(UiGroup::Error)),
            None => Span::styled(
                "1-5 cards · Esc home · Ctrl-T theme · q quit",
                theme.style(UiGroup::Dimmed),
            ),
        };
        f.render_widget(Paragraph::new(Line::from(status)), status_area);
        Ok(())
    }
}

impl Drop for PortalApp {
    fn drop(&mut self) {
        self.timers.cancel();
    }
}
