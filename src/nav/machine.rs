use std::fmt;
use std::time::Instant;

use serde_json::json;

use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::metrics::{MetricSnapshot, NavMetrics};

use super::context::{NavigationContext, Overlay, RenderTicket, Scope, Screen};
use super::element::{ElementId, ElementRole, FocusableElement};
use super::flight::SingleFlight;
use super::input::{Direction, NavInput};
use super::layout::layout_for;
use super::policy::{self, Move};
use super::registry::FocusRegistry;

pub(crate) const NAV_TARGET: &str = "shelf::nav";
pub const METRICS_TARGET: &str = "shelf::nav.metrics";

/// Configuration knobs for the navigator.
#[derive(Clone, Default)]
pub struct NavConfig {
    /// Optional structured logger for focus moves and transitions.
    pub logger: Option<Logger>,
}

/// Side effects produced by the navigator for the content and render layers.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent<A> {
    FocusChanged {
        from: Option<ElementId>,
        to: Option<ElementId>,
    },
    /// Invoke the content layer's action exactly once.
    Activated { element: ElementId, action: A },
    /// Activation ignored because the origin's previous action is still outstanding.
    Suppressed { element: ElementId },
    /// Select on a text field; the platform's own editing applies.
    PassThrough { element: ElementId },
    /// Render the ticket's scope and register its focusables once drawn.
    RenderRequested(RenderTicket),
    ScreenChanged { from: Screen, to: Screen },
    OverlayOpened(Overlay),
    OverlayClosed(Overlay),
    /// Emitted before leaving the player; playback must stop.
    StopPlayback,
}

/// Ordered events produced by one navigator call.
#[derive(Debug, Clone, PartialEq)]
pub struct NavOutcome<A> {
    events: Vec<NavEvent<A>>,
}

impl<A> Default for NavOutcome<A> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<A> NavOutcome<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: NavEvent<A>) {
        self.events.push(event);
    }

    pub fn merge(&mut self, other: NavOutcome<A>) {
        self.events.extend(other.events);
    }

    pub fn events(&self) -> &[NavEvent<A>] {
        &self.events
    }

    pub fn into_events(self) -> Vec<NavEvent<A>> {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn render_tickets(&self) -> Vec<RenderTicket> {
        self.events
            .iter()
            .filter_map(|event| match event {
                NavEvent::RenderRequested(ticket) => Some(*ticket),
                _ => None,
            })
            .collect()
    }

    pub fn activation(&self) -> Option<(&ElementId, &A)> {
        self.events.iter().find_map(|event| match event {
            NavEvent::Activated { element, action } => Some((element, action)),
            _ => None,
        })
    }
}

impl<A> IntoIterator for NavOutcome<A> {
    type Item = NavEvent<A>;
    type IntoIter = std::vec::IntoIter<NavEvent<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PendingRender {
    pub(crate) ticket: RenderTicket,
    /// Element to focus once content arrives, if it is still present.
    pub(crate) restore: Option<ElementId>,
}

/// Owns the navigation context and maps logical inputs to focus moves and transitions.
///
/// `A` is the content layer's action type carried by [`ElementRole::Action`].
pub struct Navigator<A> {
    pub(crate) context: NavigationContext,
    pub(crate) registry: FocusRegistry<A>,
    pub(crate) pending: Option<PendingRender>,
    pub(crate) flights: SingleFlight<ElementId>,
    pub(crate) epoch: u64,
    pub(crate) metrics: NavMetrics,
    config: NavConfig,
    started: Instant,
}

impl<A: Clone + fmt::Debug> Default for Navigator<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone + fmt::Debug> Navigator<A> {
    pub fn new() -> Self {
        Self::with_config(NavConfig::default())
    }

    pub fn with_config(config: NavConfig) -> Self {
        Self {
            context: NavigationContext::new(),
            registry: FocusRegistry::new(),
            pending: None,
            flights: SingleFlight::new(),
            epoch: 0,
            metrics: NavMetrics::new(),
            config,
            started: Instant::now(),
        }
    }

    pub fn context(&self) -> &NavigationContext {
        &self.context
    }

    pub fn scope(&self) -> Scope {
        self.context.scope()
    }

    pub fn screen(&self) -> Screen {
        self.context.screen()
    }

    pub fn focused(&self) -> Option<&ElementId> {
        self.context.focused()
    }

    pub fn focused_element(&self) -> Option<&FocusableElement<A>> {
        self.context
            .focused()
            .and_then(|id| self.registry.find(id))
    }

    pub fn focusables(&self) -> &[FocusableElement<A>] {
        self.registry.elements()
    }

    pub fn pending_ticket(&self) -> Option<RenderTicket> {
        self.pending.as_ref().map(|pending| pending.ticket)
    }

    pub fn is_awaiting_content(&self) -> bool {
        self.pending.is_some()
    }

    pub fn metrics(&self) -> &NavMetrics {
        &self.metrics
    }

    pub fn metrics_snapshot(&self) -> MetricSnapshot {
        self.metrics.snapshot(self.started.elapsed())
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.config.logger.as_ref()
    }

    /// Focus is either absent with an empty set, or names a member of the set
    /// registered for the active scope.
    pub fn invariant_holds(&self) -> bool {
        match self.context.focused() {
            Some(id) => {
                self.registry.scope() == Some(self.context.scope()) && self.registry.contains(id)
            }
            None => self.registry.is_empty(),
        }
    }

    /// Mark `origin` as having an outstanding action. Returns `false` if it already has one.
    pub fn begin_flight(&mut self, origin: ElementId) -> bool {
        self.flights.begin(origin)
    }

    pub fn finish_flight(&mut self, origin: &ElementId) -> bool {
        self.flights.finish(origin)
    }

    pub fn is_in_flight(&self, origin: &ElementId) -> bool {
        self.flights.is_in_flight(origin)
    }

    /// Process one logical input. Never fails; a boundary or missing focus is a no-op.
    pub fn handle_input(&mut self, input: NavInput) -> NavOutcome<A> {
        self.metrics.record_input();
        let mut out = NavOutcome::new();
        match input {
            NavInput::Move(direction) => self.handle_move(direction, &mut out),
            NavInput::Select => self.handle_select(&mut out),
            NavInput::Back => self.handle_back(&mut out),
        }
        self.log(
            LogLevel::Trace,
            "input_handled",
            [
                json_kv("input", json!(input.as_str())),
                json_kv("scope", json!(self.context.scope().describe())),
                json_kv("events", json!(out.events().len())),
            ],
        );
        out
    }

    fn handle_move(&mut self, direction: Direction, out: &mut NavOutcome<A>) {
        let scope = self.context.scope();
        let elements: &[FocusableElement<A>] = if self.registry.scope() == Some(scope) {
            self.registry.elements()
        } else {
            &[]
        };
        let current = self
            .context
            .focused()
            .and_then(|id| elements.iter().position(|element| &element.id == id));

        match policy::resolve(layout_for(scope), elements, current, direction) {
            Move::Stay => {
                self.metrics.record_boundary();
            }
            Move::Focus(index) => {
                let target = elements.get(index).map(|element| element.id.clone());
                self.apply_focus(target, out);
            }
            Move::OpenSidebar => out.merge(self.open_overlay(Overlay::Sidebar)),
            Move::Dismiss => out.merge(self.close_overlay()),
        }
    }

    fn handle_select(&mut self, out: &mut NavOutcome<A>) {
        let Some(id) = self.context.focused().cloned() else {
            return;
        };
        let Some(element) = self.registry.find(&id) else {
            self.log(
                LogLevel::Warn,
                "focus_dangling",
                [json_kv("element", json!(id.as_str()))],
            );
            self.apply_focus(None, out);
            return;
        };

        match element.role.clone() {
            ElementRole::Opener(overlay) => out.merge(self.open_overlay(overlay)),
            ElementRole::TextInput => out.push(NavEvent::PassThrough { element: id }),
            ElementRole::Inert => {}
            ElementRole::Action(action) => {
                if self.flights.is_in_flight(&id) {
                    self.metrics.record_suppressed();
                    self.log(
                        LogLevel::Debug,
                        "activation_suppressed",
                        [json_kv("element", json!(id.as_str()))],
                    );
                    out.push(NavEvent::Suppressed { element: id });
                } else {
                    self.metrics.record_activation();
                    self.log(
                        LogLevel::Debug,
                        "activated",
                        [
                            json_kv("element", json!(id.as_str())),
                            json_kv("action", json!(format!("{action:?}"))),
                        ],
                    );
                    out.push(NavEvent::Activated {
                        element: id,
                        action,
                    });
                }
            }
        }
    }

    fn handle_back(&mut self, out: &mut NavOutcome<A>) {
        if let Some(index) = self.context.innermost_index() {
            out.merge(self.close_overlay_at(index));
            return;
        }

        match self.context.screen() {
            // Back on the library enters the sidebar rather than leaving.
            Screen::Library => out.merge(self.open_overlay(Overlay::Sidebar)),
            Screen::Search => out.merge(self.switch_screen(Screen::Library)),
            Screen::Player => {
                out.push(NavEvent::StopPlayback);
                out.merge(self.switch_screen(Screen::Library));
            }
            Screen::LibrarySelection => out.merge(self.switch_screen(Screen::Login)),
            Screen::Login => {}
        }
    }

    pub(crate) fn apply_focus(&mut self, target: Option<ElementId>, out: &mut NavOutcome<A>) {
        if self.context.focused() == target.as_ref() {
            return;
        }
        let previous = self.context.set_focus(target.clone());
        if target.is_some() {
            self.metrics.record_focus_move();
        }
        self.log(
            LogLevel::Debug,
            "focus_changed",
            [
                json_kv("from", json!(previous.as_ref().map(ElementId::as_str))),
                json_kv("to", json!(target.as_ref().map(ElementId::as_str))),
            ],
        );
        out.push(NavEvent::FocusChanged {
            from: previous,
            to: target,
        });
    }

    pub(crate) fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.config.logger.as_ref(), level, NAV_TARGET, message, fields);
    }
}
