//! Screen and overlay transitions.
//!
//! Every transition clears focus, issues a fresh [`RenderTicket`], and waits for
//! the render layer to report the new scope's focusables through
//! [`Navigator::register_focusables`]. Registrations carrying any other ticket are
//! dropped, so late content from a screen the user already left never moves focus.

use std::fmt;

use serde_json::json;

use crate::logging::{LogLevel, json_kv};

use super::context::{Overlay, OverlayLayer, RenderTicket, Screen};
use super::element::{ElementId, FocusableElement};
use super::machine::{NavEvent, NavOutcome, Navigator, PendingRender};

impl<A: Clone + fmt::Debug> Navigator<A> {
    /// Request the first render of the current scope.
    pub fn start(&mut self) -> NavOutcome<A> {
        let mut out = NavOutcome::new();
        self.issue_ticket(None, &mut out);
        out
    }

    /// Replace the screen, dropping every overlay and the current focus.
    pub fn switch_screen(&mut self, screen: Screen) -> NavOutcome<A> {
        let mut out = NavOutcome::new();
        let from = self.context.screen();
        let previous = self.context.focused().cloned();

        self.context.reset_to(screen);
        self.registry.invalidate();
        if previous.is_some() {
            out.push(NavEvent::FocusChanged {
                from: previous,
                to: None,
            });
        }
        out.push(NavEvent::ScreenChanged { from, to: screen });
        self.metrics.record_transition();
        self.log(
            LogLevel::Info,
            "screen_changed",
            [
                json_kv("from", json!(from.as_str())),
                json_kv("to", json!(screen.as_str())),
            ],
        );
        self.issue_ticket(None, &mut out);
        out
    }

    /// Push `overlay` above the current scope. Opening an overlay that is already
    /// open is a no-op.
    pub fn open_overlay(&mut self, overlay: Overlay) -> NavOutcome<A> {
        let mut out = NavOutcome::new();
        if self.context.has_overlay(overlay) {
            return out;
        }

        let origin = self.effective_focus();
        let previous = self.context.set_focus(None);
        self.context.push_overlay(OverlayLayer {
            overlay,
            origin: origin.clone(),
        });
        self.registry.invalidate();
        if previous.is_some() {
            out.push(NavEvent::FocusChanged {
                from: previous,
                to: None,
            });
        }
        out.push(NavEvent::OverlayOpened(overlay));
        self.metrics.record_transition();
        self.log(
            LogLevel::Debug,
            "overlay_opened",
            [
                json_kv("overlay", json!(overlay.as_str())),
                json_kv("origin", json!(origin.as_ref().map(ElementId::as_str))),
            ],
        );
        self.issue_ticket(None, &mut out);
        out
    }

    /// Close the innermost overlay and restore focus to its origin once the
    /// underlying scope has re-rendered.
    pub fn close_overlay(&mut self) -> NavOutcome<A> {
        match self.context.innermost_index() {
            Some(index) => self.close_overlay_at(index),
            None => NavOutcome::new(),
        }
    }

    /// Close a specific overlay wherever it sits in the stack.
    pub fn close_overlay_kind(&mut self, overlay: Overlay) -> NavOutcome<A> {
        let index = self
            .context
            .overlays()
            .iter()
            .rposition(|layer| layer.overlay == overlay);
        match index {
            Some(index) => self.close_overlay_at(index),
            None => NavOutcome::new(),
        }
    }

    pub(crate) fn close_overlay_at(&mut self, index: usize) -> NavOutcome<A> {
        let mut out = NavOutcome::new();
        let Some(layer) = self.context.remove_overlay(index) else {
            return out;
        };

        let previous = self.context.set_focus(None);
        self.registry.invalidate();
        if previous.is_some() {
            out.push(NavEvent::FocusChanged {
                from: previous,
                to: None,
            });
        }
        out.push(NavEvent::OverlayClosed(layer.overlay));
        self.metrics.record_transition();
        self.log(
            LogLevel::Debug,
            "overlay_closed",
            [
                json_kv("overlay", json!(layer.overlay.as_str())),
                json_kv(
                    "restore",
                    json!(layer.origin.as_ref().map(ElementId::as_str)),
                ),
            ],
        );
        self.issue_ticket(layer.origin, &mut out);
        out
    }

    /// Re-render the current scope after its content changed, keeping focus on the
    /// same element if it survives.
    pub fn refresh(&mut self) -> NavOutcome<A> {
        let mut out = NavOutcome::new();
        let restore = self.effective_focus();
        self.issue_ticket(restore, &mut out);
        out
    }

    /// Accept the focusables drawn for `ticket`.
    ///
    /// Only the most recently issued ticket is honoured. Focus moves to the pending
    /// restore target when present, stays on the current element when it survived,
    /// and otherwise falls back to the first element of the new set.
    pub fn register_focusables(
        &mut self,
        ticket: RenderTicket,
        raw: &[FocusableElement<A>],
    ) -> NavOutcome<A> {
        let mut out = NavOutcome::new();
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket)
            && ticket.scope == self.context.scope();
        if !is_current {
            self.metrics.record_stale_registration();
            self.log(
                LogLevel::Debug,
                "stale_registration",
                [
                    json_kv("scope", json!(ticket.scope.describe())),
                    json_kv("epoch", json!(ticket.epoch)),
                ],
            );
            return out;
        }

        let restore = self.pending.take().and_then(|pending| pending.restore);
        let changed = self.registry.rebuild(ticket.scope, raw);

        let target = restore
            .filter(|id| self.registry.contains(id))
            .or_else(|| {
                self.context
                    .focused()
                    .filter(|id| self.registry.contains(id))
                    .cloned()
            })
            .or_else(|| self.registry.first().map(|element| element.id.clone()));

        self.log(
            LogLevel::Debug,
            "focusables_registered",
            [
                json_kv("scope", json!(ticket.scope.describe())),
                json_kv("count", json!(self.registry.len())),
                json_kv("changed", json!(changed)),
            ],
        );
        self.apply_focus(target, &mut out);
        out
    }

    /// Focus now, or the element a pending render will restore.
    fn effective_focus(&self) -> Option<ElementId> {
        self.context.focused().cloned().or_else(|| {
            self.pending
                .as_ref()
                .and_then(|pending| pending.restore.clone())
        })
    }

    fn issue_ticket(
        &mut self,
        restore: Option<ElementId>,
        out: &mut NavOutcome<A>,
    ) -> RenderTicket {
        self.epoch += 1;
        let ticket = RenderTicket {
            scope: self.context.scope(),
            epoch: self.epoch,
        };
        self.pending = Some(PendingRender { ticket, restore });
        self.log(
            LogLevel::Trace,
            "render_requested",
            [
                json_kv("scope", json!(ticket.scope.describe())),
                json_kv("epoch", json!(ticket.epoch)),
            ],
        );
        out.push(NavEvent::RenderRequested(ticket));
        ticket
    }
}

#[cfg(test)]
mod tests {
    use crate::nav::context::{ModalKind, Overlay, Scope, Screen};
    use crate::nav::element::{ElementId, FocusableElement, Region};
    use crate::nav::fixtures::{Fixture, settle};
    use crate::nav::machine::{NavEvent, Navigator};

    fn focused<'a>(nav: &'a Navigator<&'static str>) -> Option<&'a str> {
        nav.focused().map(ElementId::as_str)
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let fixture = Fixture::library(2, 2);
        let mut nav = Navigator::new();
        let login = nav.start().render_tickets()[0];
        let selection = nav.switch_screen(Screen::LibrarySelection).render_tickets()[0];

        let out = nav.register_focusables(login, &fixture.content(login.scope));
        assert!(out.is_empty());
        assert!(nav.focused().is_none());
        assert!(nav.is_awaiting_content());

        nav.register_focusables(selection, &fixture.content(selection.scope));
        assert_eq!(focused(&nav), Some("library-0"));
        assert_eq!(nav.metrics_snapshot().stale_registrations, 1);

        // The same ticket cannot be replayed.
        assert!(nav
            .register_focusables(selection, &fixture.content(selection.scope))
            .is_empty());
    }

    #[test]
    fn focus_is_null_until_content_is_ready() {
        let mut nav: Navigator<&'static str> = Navigator::new();
        let out = nav.switch_screen(Screen::Search);
        assert!(out.events().contains(&NavEvent::ScreenChanged {
            from: Screen::Login,
            to: Screen::Search,
        }));
        assert!(nav.focused().is_none());
        assert!(nav.invariant_holds());
    }

    #[test]
    fn switch_clears_overlays_and_focus() {
        let fixture = Fixture::library(2, 2);
        let mut nav = Navigator::new();
        nav.switch_screen(Screen::Library);
        settle(&mut nav, &fixture);
        nav.open_overlay(Overlay::Sidebar);
        settle(&mut nav, &fixture);
        assert_eq!(focused(&nav), Some("sidebar-search"));

        let out = nav.switch_screen(Screen::Search);
        assert_eq!(
            out.events()[0],
            NavEvent::FocusChanged {
                from: Some(ElementId::from("sidebar-search")),
                to: None,
            }
        );
        assert!(nav.context().overlays().is_empty());
        assert_eq!(nav.scope(), Scope::screen(Screen::Search));
        settle(&mut nav, &fixture);
        assert_eq!(focused(&nav), Some("search-input"));
    }

    #[test]
    fn nested_overlay_restores_through_the_chain() {
        let fixture = Fixture::library(2, 3);
        let mut nav = Navigator::new();
        nav.switch_screen(Screen::Library);
        settle(&mut nav, &fixture);
        let mut out = crate::nav::machine::NavOutcome::new();
        nav.apply_focus(Some(ElementId::from("recent-1")), &mut out);

        nav.open_overlay(Overlay::Modal(ModalKind::Settings));
        settle(&mut nav, &fixture);
        nav.apply_focus(Some(ElementId::from("settings-color")), &mut out);
        nav.open_overlay(Overlay::Modal(ModalKind::ColorPicker));
        settle(&mut nav, &fixture);
        assert_eq!(focused(&nav), Some("color-0"));

        nav.close_overlay();
        settle(&mut nav, &fixture);
        assert_eq!(focused(&nav), Some("settings-color"));
        nav.close_overlay();
        settle(&mut nav, &fixture);
        assert_eq!(focused(&nav), Some("recent-1"));
    }

    #[test]
    fn overlay_opened_before_content_inherits_pending_restore() {
        let fixture = Fixture::library(1, 3);
        let mut nav = Navigator::new();
        nav.switch_screen(Screen::Library);
        settle(&mut nav, &fixture);
        let mut out = crate::nav::machine::NavOutcome::new();
        nav.apply_focus(Some(ElementId::from("recent-2")), &mut out);

        nav.open_overlay(Overlay::Sidebar);
        settle(&mut nav, &fixture);
        // Sidebar entry opens settings; the sidebar closes before settings renders.
        nav.close_overlay_kind(Overlay::Sidebar);
        nav.open_overlay(Overlay::Modal(ModalKind::Settings));
        settle(&mut nav, &fixture);
        nav.close_overlay();
        settle(&mut nav, &fixture);
        assert_eq!(focused(&nav), Some("recent-2"));
    }

    #[test]
    fn restore_target_that_vanished_falls_back_to_first() {
        let mut nav = Navigator::new();
        nav.switch_screen(Screen::Library);
        settle(&mut nav, &Fixture::library(1, 4));
        let mut out = crate::nav::machine::NavOutcome::new();
        nav.apply_focus(Some(ElementId::from("recent-3")), &mut out);

        nav.open_overlay(Overlay::Modal(ModalKind::BookDetails));
        settle(&mut nav, &Fixture::library(1, 4));
        nav.close_overlay();
        settle(&mut nav, &Fixture::library(1, 2));
        assert_eq!(focused(&nav), Some("continue-0"));
    }

    #[test]
    fn refresh_keeps_focus_when_element_survives() {
        let mut nav = Navigator::new();
        nav.switch_screen(Screen::Library);
        settle(&mut nav, &Fixture::library(0, 2));
        let mut out = crate::nav::machine::NavOutcome::new();
        nav.apply_focus(Some(ElementId::from("recent-1")), &mut out);

        let refresh = nav.refresh();
        assert_eq!(refresh.render_tickets().len(), 1);
        assert_eq!(focused(&nav), Some("recent-1"));
        settle(&mut nav, &Fixture::library(3, 5));
        assert_eq!(focused(&nav), Some("recent-1"));

        nav.refresh();
        settle(&mut nav, &Fixture::library(0, 1));
        assert_eq!(focused(&nav), Some("recent-0"));
    }

    #[test]
    fn empty_registration_clears_focus() {
        let mut nav = Navigator::new();
        nav.switch_screen(Screen::Library);
        settle(&mut nav, &Fixture::library(1, 1));
        assert!(nav.focused().is_some());
        nav.refresh();
        let empty: Vec<FocusableElement<&'static str>> = Vec::new();
        if let Some(ticket) = nav.pending_ticket() {
            nav.register_focusables(ticket, &empty);
        }
        assert!(nav.focused().is_none());
        assert!(nav.invariant_holds());
    }

    #[test]
    fn hidden_first_element_is_skipped() {
        let mut nav = Navigator::new();
        let ticket = nav.start().render_tickets()[0];
        let raw = vec![
            FocusableElement::action("hidden", Region::MainList, 0, "", "noop").with_hidden(true),
            FocusableElement::action("disabled", Region::MainList, 1, "", "noop")
                .with_disabled(true),
            FocusableElement::action("shown", Region::MainList, 2, "", "noop"),
        ];
        nav.register_focusables(ticket, &raw);
        assert_eq!(focused(&nav), Some("shown"));
        assert_eq!(nav.focusables().len(), 1);
    }

    #[test]
    fn opening_an_open_overlay_is_a_noop() {
        let fixture = Fixture::library(1, 1);
        let mut nav = Navigator::new();
        nav.switch_screen(Screen::Library);
        settle(&mut nav, &fixture);
        assert!(!nav.open_overlay(Overlay::Sidebar).is_empty());
        assert!(nav.open_overlay(Overlay::Sidebar).is_empty());
        assert_eq!(nav.context().overlays().len(), 1);
        assert!(nav.close_overlay_kind(Overlay::Dropdown).is_empty());
    }
}
