//! Application layer.
//!
//! [`ShelfApp`] connects the navigator to the content layer. Navigator outcomes are
//! applied in order: render tickets are drawn and registered, activations become
//! state changes and queued server calls, and focus moves repaint the frame. Server
//! calls never run during input handling; they wait in an outbox until
//! [`ShelfApp::pump_requests`] (or an external executor fed by
//! [`ShelfApp::take_requests`]) delivers each completion through
//! [`ShelfApp::on_api_reply`].

mod actions;
mod player;
mod replies;


use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde_json::json;

use crate::error::Result;
use crate::logging::{LogLevel, emit, json_kv};
use crate::nav::{
    ElementId, FocusableElement, METRICS_TARGET, NavConfig, NavEvent, NavInput, NavOutcome,
    Navigator, RenderTicket, Screen,
};
use crate::render::{RenderBoundary, RenderStatus};

use super::api::{AfterLoad, ApiCall, ApiReply, MediaApi, Request, dispatch};
use super::config::{DevConfig, DevLogin, ShelfConfig};
use super::playback::{PlaybackBoundary, SyncTimer};
use super::settings::{AuthType, Preferences, SettingsResult, SettingsStore};
use super::state::{ShelfState, TextField};
use super::views::{ShelfAction, build_view};

pub(crate) const APP_TARGET: &str = "shelf::app";
/// Origin shared by every sign-in call, whichever element started it.
pub const CONNECT_BUTTON: &str = "connect-btn";
/// Origin used when a search starts from the query field.
pub const SEARCH_BUTTON: &str = "search-submit-btn";

type Outcome = NavOutcome<ShelfAction>;

pub struct ShelfApp<R> {
    nav: Navigator<ShelfAction>,
    state: ShelfState,
    store: Box<dyn SettingsStore>,
    playback: Box<dyn PlaybackBoundary>,
    renderer: R,
    outbox: VecDeque<Request>,
    /// Outstanding calls per origin; the navigator's flight ends when this hits zero.
    in_flight: HashMap<ElementId, usize>,
    next_request: u64,
    /// Replies to requests at or below this id were issued before sign-out.
    discard_through: u64,
    /// Frame drawn for a ticket whose renderer reported `Pending`.
    drawn: Option<(RenderTicket, Vec<FocusableElement<ShelfAction>>)>,
    sync_timer: SyncTimer,
    since_metrics: Duration,
    auto_login: bool,
    config: ShelfConfig,
}

impl<R: RenderBoundary<ShelfAction>> ShelfApp<R> {
    pub fn new(
        config: ShelfConfig,
        store: Box<dyn SettingsStore>,
        playback: Box<dyn PlaybackBoundary>,
        renderer: R,
    ) -> Self {
        let nav = Navigator::with_config(NavConfig {
            logger: config.logger.clone(),
        });
        Self {
            nav,
            state: ShelfState::default(),
            store,
            playback,
            renderer,
            outbox: VecDeque::new(),
            in_flight: HashMap::new(),
            next_request: 0,
            discard_through: 0,
            drawn: None,
            sync_timer: SyncTimer::new(config.sync_interval),
            since_metrics: Duration::ZERO,
            auto_login: false,
            config,
        }
    }

    pub fn navigator(&self) -> &Navigator<ShelfAction> {
        &self.nav
    }

    pub fn state(&self) -> &ShelfState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn config(&self) -> &ShelfConfig {
        &self.config
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = &Request> {
        self.outbox.iter()
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Load persisted settings, draw the login screen, and sign in from the
    /// development config or saved credentials when either is available.
    pub fn start(&mut self) -> Result<()> {
        self.state.settings = self.store.app_settings();
        let saved = self.store.credentials();
        self.state.login.host_url = saved.host_url.clone();
        self.state.login.auth_type = saved.auth_type;
        if saved.auth_type == AuthType::ApiKey {
            self.state.login.api_key = saved.api_token.clone();
        }

        let mut out = self.nav.start();
        if let Some(login) = self.dev_login() {
            self.fill_dev_login(login);
            self.auto_login = true;
            out.merge(self.connect());
        } else if saved.is_complete() {
            self.log(
                LogLevel::Info,
                "resume_session",
                [json_kv("host", json!(saved.host_url))],
            );
            let origin = ElementId::new(CONNECT_BUTTON);
            self.state.connecting = true;
            self.queue(
                Some(origin.clone()),
                ApiCall::Configure {
                    host: saved.host_url,
                    token: saved.api_token,
                },
                AfterLoad::Nothing,
            );
            self.queue(Some(origin), ApiCall::ListLibraries, AfterLoad::Nothing);
            out.merge(self.nav.refresh());
        }
        self.apply(out)
    }

    fn dev_login(&self) -> Option<DevLogin> {
        let path = self.config.dev_config_path.as_ref()?;
        match DevConfig::load(path) {
            Ok(config) => config.and_then(|config| config.login()),
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "dev_config_unreadable",
                    [json_kv("error", json!(err.to_string()))],
                );
                None
            }
        }
    }

    fn fill_dev_login(&mut self, login: DevLogin) {
        let form = &mut self.state.login;
        match login {
            DevLogin::ApiKey { host, api_key } => {
                form.host_url = host;
                form.auth_type = AuthType::ApiKey;
                form.api_key = api_key;
            }
            DevLogin::Password {
                host,
                username,
                password,
            } => {
                form.host_url = host;
                form.auth_type = AuthType::Username;
                form.username = username;
                form.password = password;
            }
        }
    }

    pub fn handle_input(&mut self, input: NavInput) -> Result<()> {
        let out = self.nav.handle_input(input);
        self.apply(out)
    }

    /// Translate a platform key code. Returns `false` for unmapped codes.
    pub fn handle_key_code(&mut self, code: u32) -> Result<bool> {
        match self.config.key_map.resolve(code) {
            Some(input) => {
                self.handle_input(input)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Text field under focus, if any.
    pub fn focused_field(&self) -> Option<TextField> {
        self.nav
            .focused_element()
            .filter(|element| element.is_text_input())
            .and_then(|element| TextField::for_element(&element.id))
    }

    /// Type into the focused text field. Returns `false` when no field has focus.
    pub fn insert_char(&mut self, ch: char) -> Result<bool> {
        let Some(field) = self.focused_field() else {
            return Ok(false);
        };
        self.state.field_mut(field).push(ch);
        self.repaint_if_settled()?;
        Ok(true)
    }

    pub fn delete_char(&mut self) -> Result<bool> {
        let Some(field) = self.focused_field() else {
            return Ok(false);
        };
        self.state.field_mut(field).pop();
        self.repaint_if_settled()?;
        Ok(true)
    }

    pub fn set_field(&mut self, field: TextField, value: impl Into<String>) -> Result<()> {
        *self.state.field_mut(field) = value.into();
        self.repaint_if_settled()
    }

    /// Execute every queued call against `api`, including follow-ups queued by the
    /// completions themselves. Returns the number of calls made.
    pub fn pump_requests(&mut self, api: &mut dyn MediaApi) -> Result<usize> {
        let mut handled = 0;
        while let Some(request) = self.outbox.pop_front() {
            let result = dispatch(api, &request.call);
            self.on_api_reply(ApiReply { request, result })?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Hand queued calls to an external executor. Each must come back through
    /// [`ShelfApp::on_api_reply`].
    pub fn take_requests(&mut self) -> Vec<Request> {
        self.outbox.drain(..).collect()
    }

    /// Register the frame drawn for `ticket` once an asynchronous renderer finishes.
    pub fn render_complete(&mut self, ticket: RenderTicket) -> Result<()> {
        let elements = match self.drawn.take() {
            Some((drawn, elements)) if drawn == ticket => elements,
            other => {
                self.drawn = other;
                Vec::new()
            }
        };
        let out = self.nav.register_focusables(ticket, &elements);
        self.apply(out)
    }

    pub(crate) fn queue(&mut self, origin: Option<ElementId>, call: ApiCall, after: AfterLoad) {
        if let Some(origin) = &origin {
            let count = self.in_flight.entry(origin.clone()).or_insert(0);
            if *count == 0 {
                self.nav.begin_flight(origin.clone());
            }
            *count += 1;
        }
        self.next_request += 1;
        self.log(
            LogLevel::Debug,
            "request_queued",
            [
                json_kv("id", json!(self.next_request)),
                json_kv("call", json!(call.name())),
                json_kv("origin", json!(origin.as_ref().map(ElementId::as_str))),
            ],
        );
        self.outbox.push_back(Request {
            id: self.next_request,
            origin,
            call,
            after,
        });
    }

    /// Run a settings write. A failure is logged and shown on the error channel;
    /// the in-memory state stays as it is and the flow carries on.
    fn persist<F>(&mut self, what: &'static str, write: F) -> bool
    where
        F: FnOnce(&mut dyn SettingsStore) -> SettingsResult<()>,
    {
        match write(self.store.as_mut()) {
            Ok(()) => true,
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "settings_write_failed",
                    [
                        json_kv("what", json!(what)),
                        json_kv("error", json!(err.to_string())),
                    ],
                );
                self.state.error = Some(format!("Could not save {what}: {err}"));
                false
            }
        }
    }

    /// One call for `origin` finished. Ends the navigator's flight when it was the
    /// last outstanding call of the chain.
    fn settle_flight(&mut self, origin: &ElementId) -> Outcome {
        let Some(count) = self.in_flight.get_mut(origin) else {
            return Outcome::new();
        };
        *count = count.saturating_sub(1);
        if *count > 0 {
            return Outcome::new();
        }
        self.in_flight.remove(origin);
        self.nav.finish_flight(origin);
        if origin.as_str() == CONNECT_BUTTON {
            self.auto_login = false;
            if self.state.connecting {
                self.state.connecting = false;
                if self.nav.screen() == Screen::Login {
                    return self.nav.refresh();
                }
            }
        }
        Outcome::new()
    }

    /// Process navigator events in order, including the events they cause.
    fn apply(&mut self, outcome: Outcome) -> Result<()> {
        let mut work: VecDeque<NavEvent<ShelfAction>> = outcome.into_iter().collect();
        let mut repaint = false;
        while let Some(event) = work.pop_front() {
            let follow_up = match event {
                NavEvent::RenderRequested(ticket) => {
                    // Superseded tickets are skipped; only the newest is drawn.
                    if self.nav.pending_ticket() == Some(ticket) {
                        self.render(ticket)?
                    } else {
                        Outcome::new()
                    }
                }
                NavEvent::FocusChanged { .. } => {
                    repaint = true;
                    Outcome::new()
                }
                NavEvent::Activated { element, action } => self.activate(element, action),
                NavEvent::PassThrough { element } => self.pass_through(&element),
                NavEvent::Suppressed { element } => {
                    self.log(
                        LogLevel::Debug,
                        "activation_ignored",
                        [json_kv("element", json!(element.as_str()))],
                    );
                    Outcome::new()
                }
                NavEvent::StopPlayback
                | NavEvent::ScreenChanged {
                    from: Screen::Player,
                    ..
                } => {
                    self.stop_playback();
                    Outcome::new()
                }
                NavEvent::ScreenChanged { .. }
                | NavEvent::OverlayOpened(_)
                | NavEvent::OverlayClosed(_) => Outcome::new(),
            };
            work.extend(follow_up);
        }
        if repaint {
            self.repaint_if_settled()?;
        }
        Ok(())
    }

    fn render(&mut self, ticket: RenderTicket) -> Result<Outcome> {
        let view = build_view(&self.state, self.nav.context(), self.nav.focused());
        match self.renderer.render(&view, self.nav.focused())? {
            RenderStatus::Ready => {
                self.drawn = None;
                Ok(self.nav.register_focusables(ticket, &view.elements))
            }
            RenderStatus::Pending => {
                self.drawn = Some((ticket, view.elements));
                Ok(Outcome::new())
            }
        }
    }

    /// Redraw without registering; a pending ticket will draw the frame anyway.
    fn repaint_if_settled(&mut self) -> Result<()> {
        if self.nav.is_awaiting_content() {
            return Ok(());
        }
        let view = build_view(&self.state, self.nav.context(), self.nav.focused());
        self.renderer.render(&view, self.nav.focused())?;
        Ok(())
    }

    fn emit_metrics(&self) {
        if let Some(logger) = &self.config.logger {
            let event = self.nav.metrics_snapshot().to_log_event(METRICS_TARGET);
            let _ = logger.log_event(event);
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.config.logger.as_ref(), level, APP_TARGET, message, fields);
    }
}
