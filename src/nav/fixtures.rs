//! Scripted content layer shared by the navigator tests.

use super::context::{ModalKind, Overlay, Scope, Screen};
use super::element::{FocusableElement, Region};
use super::machine::Navigator;

type Element = FocusableElement<&'static str>;

pub(crate) struct Fixture {
    continue_len: usize,
    recent_len: usize,
}

impl Fixture {
    pub(crate) fn library(continue_len: usize, recent_len: usize) -> Self {
        Self {
            continue_len,
            recent_len,
        }
    }

    /// Everything drawn for `scope`, including layers the scope does not own.
    pub(crate) fn content(&self, scope: Scope) -> Vec<Element> {
        let mut raw = match scope.screen {
            Screen::Login => vec![
                Element::opener("auth-type-btn", Region::MainList, 0, "Auth", Overlay::Dropdown),
                Element::text_input("host-url", Region::MainList, 1, "Server"),
                Element::text_input("username", Region::MainList, 2, "Username"),
                Element::text_input("password", Region::MainList, 3, "Password"),
                Element::text_input("api-key", Region::MainList, 4, "API key").with_hidden(true),
                Element::action("connect-btn", Region::MainList, 5, "Connect", "connect"),
            ],
            Screen::LibrarySelection => vec![
                Element::action("library-0", Region::MainList, 0, "Books", "toggle-library"),
                Element::action("library-1", Region::MainList, 1, "Podcasts", "toggle-library"),
                Element::action("continue-btn", Region::MainList, 2, "Continue", "choose-library"),
            ],
            Screen::Library => {
                let card = |row, i| {
                    let id = if row == 0 { format!("continue-{i}") } else { format!("recent-{i}") };
                    Element::action(id, Region::CarouselRow(row), i, "", "open-book")
                };
                let continue_row = (0..self.continue_len).map(|i| card(0, i));
                let recent_row = (0..self.recent_len).map(|i| card(1, i));
                continue_row.chain(recent_row).collect()
            }
            Screen::Search => vec![
                Element::text_input("search-input", Region::MainList, 0, "Search"),
                Element::action("search-submit", Region::MainList, 1, "Go", "search"),
                Element::action("result-0", Region::MainList, 2, "", "open-book"),
                Element::action("result-1", Region::MainList, 3, "", "open-book"),
            ],
            Screen::Player => vec![
                Element::action("skip-back", Region::MainList, 0, "-30s", "noop"),
                Element::action("play-pause", Region::MainList, 1, "Play", "noop"),
                Element::action("skip-forward", Region::MainList, 2, "+30s", "noop"),
                Element::action("player-close", Region::MainList, 3, "Close", "stop"),
            ],
        };

        raw.extend([
            Element::action("auth-username", Region::Dropdown, 0, "Username", "pick-auth"),
            Element::action("auth-apikey", Region::Dropdown, 1, "API key", "pick-auth"),
            Element::action("sidebar-search", Region::Sidebar, 0, "Search", "open-search"),
            Element::opener(
                "sidebar-settings",
                Region::Sidebar,
                1,
                "Settings",
                Overlay::Modal(ModalKind::Settings),
            ),
            Element::action("sidebar-library-0", Region::Sidebar, 2, "Books", "switch-library"),
        ]);
        if let Some(Overlay::Modal(kind)) = scope.overlay {
            raw.extend(modal_content(kind));
        }
        raw
    }

    /// Perform what the content layer would do for `action`.
    pub(crate) fn apply(&self, nav: &mut Navigator<&'static str>, action: &str) {
        match action {
            "connect" => {
                nav.switch_screen(Screen::LibrarySelection);
            }
            "choose-library" | "switch-library" | "stop" => {
                nav.switch_screen(Screen::Library);
            }
            "open-book" => {
                nav.open_overlay(Overlay::Modal(ModalKind::BookDetails));
            }
            "play" => {
                nav.switch_screen(Screen::Player);
            }
            "open-search" => {
                nav.switch_screen(Screen::Search);
            }
            "logout" => {
                nav.switch_screen(Screen::Login);
            }
            "close-modal" | "pick-color" => {
                nav.close_overlay();
            }
            "pick-auth" => {
                nav.close_overlay_kind(Overlay::Dropdown);
            }
            "search" | "toggle-library" => {
                nav.refresh();
            }
            _ => {}
        }
    }
}

fn modal_content(kind: ModalKind) -> Vec<Element> {
    match kind {
        ModalKind::Settings => vec![
            Element::opener(
                "settings-libraries",
                Region::Modal,
                0,
                "Libraries",
                Overlay::Modal(ModalKind::LibraryPicker),
            ),
            Element::opener(
                "settings-color",
                Region::Modal,
                1,
                "Color",
                Overlay::Modal(ModalKind::ColorPicker),
            ),
            Element::action("settings-logout", Region::Modal, 2, "Logout", "logout"),
            Element::action("settings-close", Region::Modal, 3, "Close", "close-modal"),
        ],
        ModalKind::ColorPicker => (0..8)
            .map(|i| {
                Element::action(format!("color-{i}"), Region::Modal, i, "", "pick-color")
                    .with_column(i % 2)
            })
            .collect(),
        ModalKind::LibraryPicker => vec![
            Element::action("picker-library-0", Region::Modal, 0, "Books", "toggle-library"),
            Element::action("picker-close", Region::Modal, 1, "Close", "close-modal"),
        ],
        ModalKind::BookDetails => vec![
            Element::action("details-play", Region::Modal, 0, "Play", "play"),
            Element::action("details-close", Region::Modal, 1, "Close", "close-modal"),
        ],
    }
}

/// Register content for whichever ticket the navigator is waiting on.
pub(crate) fn settle(nav: &mut Navigator<&'static str>, fixture: &Fixture) {
    if let Some(ticket) = nav.pending_ticket() {
        nav.register_focusables(ticket, &fixture.content(ticket.scope));
    }
}
