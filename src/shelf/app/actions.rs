use serde_json::json;

use crate::logging::{LogLevel, json_kv};
use crate::nav::{ElementId, ModalKind, Overlay, Screen};
use crate::render::RenderBoundary;
use crate::shelf::api::{AfterLoad, ApiCall, ItemQuery};
use crate::shelf::settings::{AuthType, Preferences};
use crate::shelf::state::TextField;
use crate::shelf::views::ShelfAction;

use super::{CONNECT_BUTTON, Outcome, SEARCH_BUTTON, ShelfApp};

impl<R: RenderBoundary<ShelfAction>> ShelfApp<R> {
    /// Run the action behind an activated element. A new activation clears the
    /// error channel.
    pub(super) fn activate(&mut self, element: ElementId, action: ShelfAction) -> Outcome {
        self.log(
            LogLevel::Info,
            "action",
            [
                json_kv("element", json!(element.as_str())),
                json_kv("action", json!(format!("{action:?}"))),
            ],
        );
        let had_error = self.state.error.take().is_some();

        let mut out = match action {
            ShelfAction::Connect => self.connect(),
            ShelfAction::ChooseAuth(auth_type) => {
                self.state.login.auth_type = auth_type;
                self.nav.close_overlay_kind(Overlay::Dropdown)
            }
            ShelfAction::ToggleLibrary(id) => {
                self.state.toggle_selected(&id);
                self.nav.refresh()
            }
            ShelfAction::ContinueWithLibraries => self.continue_with_libraries(element),
            ShelfAction::OpenBook(item_id) => self.open_book(element, &item_id),
            ShelfAction::OpenSearch => {
                self.state.search_query.clear();
                self.state.search_results = None;
                self.nav.switch_screen(Screen::Search)
            }
            ShelfAction::OpenSettings => {
                // The sidebar outranks modals, so it has to go first.
                let mut out = self.nav.close_overlay_kind(Overlay::Sidebar);
                out.merge(self.nav.open_overlay(Overlay::Modal(ModalKind::Settings)));
                out
            }
            ShelfAction::SwitchLibrary(id) => self.switch_library(element, id),
            ShelfAction::SubmitSearch => self.search(element),
            ShelfAction::OpenSearchResult(item_id) => {
                self.queue(Some(element), ApiCall::ItemDetails { item_id }, AfterLoad::Nothing);
                Outcome::new()
            }
            ShelfAction::AdjustItemLimit(delta) => {
                self.state.settings.adjust_item_limit(delta);
                self.save_settings();
                self.nav.refresh()
            }
            ShelfAction::AdjustSpeed(tenths) => self.adjust_speed(tenths),
            ShelfAction::PickColor(color) => {
                self.state.settings.progress_bar_color = color;
                self.save_settings();
                self.nav
                    .close_overlay_kind(Overlay::Modal(ModalKind::ColorPicker))
            }
            ShelfAction::TogglePickerLibrary(id) => self.toggle_picker_library(element, &id),
            ShelfAction::CloseModal(kind) => self.nav.close_overlay_kind(Overlay::Modal(kind)),
            ShelfAction::Logout => self.logout(),
            ShelfAction::Play => self.play(element),
            ShelfAction::PreviousTrack => self.previous_track(),
            ShelfAction::SeekBy(seconds) => self.seek_by(seconds),
            ShelfAction::TogglePlay => self.toggle_play(),
            ShelfAction::NextTrack => self.next_track(),
        };

        if (had_error || self.state.error.is_some()) && out.render_tickets().is_empty() {
            out.merge(self.nav.refresh());
        }
        out
    }

    /// Enter on a text field: sign in from the login form, search from the query.
    pub(super) fn pass_through(&mut self, element: &ElementId) -> Outcome {
        let Some(field) = TextField::for_element(element) else {
            return Outcome::new();
        };
        self.state.error = None;
        if field.is_login() {
            self.connect()
        } else {
            self.search(ElementId::new(SEARCH_BUTTON))
        }
    }

    /// Validate the login form and queue the sign-in call.
    pub(super) fn connect(&mut self) -> Outcome {
        let origin = ElementId::new(CONNECT_BUTTON);
        if self.nav.is_in_flight(&origin) {
            return Outcome::new();
        }

        let form = &self.state.login;
        let host = form.host_url.trim().trim_end_matches('/').to_string();
        let call = if host.is_empty() {
            Err("Please enter a server URL")
        } else if !form.host_is_valid() {
            Err("Server URL must start with http:// or https://")
        } else {
            match form.auth_type {
                AuthType::ApiKey if form.api_key.trim().is_empty() => {
                    Err("Please enter an API key")
                }
                AuthType::ApiKey => Ok(ApiCall::VerifyKey {
                    host,
                    api_key: form.api_key.trim().to_string(),
                }),
                AuthType::Username
                    if form.username.trim().is_empty() || form.password.is_empty() =>
                {
                    Err("Please enter username and password")
                }
                AuthType::Username => Ok(ApiCall::Login {
                    host,
                    username: form.username.trim().to_string(),
                    password: form.password.clone(),
                }),
            }
        };

        match call {
            Ok(call) => {
                self.state.connecting = true;
                self.queue(Some(origin), call, AfterLoad::Nothing);
            }
            Err(message) => self.state.error = Some(message.to_string()),
        }
        self.nav.refresh()
    }

    fn continue_with_libraries(&mut self, element: ElementId) -> Outcome {
        if self.state.selected_library_ids.is_empty() {
            return Outcome::new();
        }
        let selected = self.state.selected_library_ids.clone();
        let current = self
            .state
            .current_library_id
            .clone()
            .filter(|id| selected.contains(id))
            .or_else(|| selected.first().cloned());
        self.state.current_library_id = current;
        self.save_library_selection();
        self.load_books(Some(element), AfterLoad::EnterLibrary)
    }

    /// Queue the recent/in-progress listing chain for the current library; `after`
    /// runs once both rows are in.
    pub(super) fn load_books(&mut self, origin: Option<ElementId>, after: AfterLoad) -> Outcome {
        let Some(library_id) = self.state.current_library_id.clone() else {
            self.state.recent.clear();
            self.state.continue_listening.clear();
            return self.books_loaded(after);
        };
        let query = ItemQuery::recent(self.state.settings.item_limit);
        self.queue(origin, ApiCall::RecentItems { library_id, query }, after);
        Outcome::new()
    }

    pub(super) fn queue_in_progress(
        &mut self,
        library_id: String,
        origin: Option<ElementId>,
        after: AfterLoad,
    ) {
        let query = ItemQuery::in_progress(self.config.continue_limit);
        self.queue(origin, ApiCall::InProgressItems { library_id, query }, after);
    }

    pub(super) fn books_loaded(&mut self, after: AfterLoad) -> Outcome {
        match after {
            AfterLoad::EnterLibrary if self.nav.screen() != Screen::Library => {
                self.nav.switch_screen(Screen::Library)
            }
            AfterLoad::CloseSidebar if self.nav.context().has_overlay(Overlay::Sidebar) => {
                self.nav.close_overlay_kind(Overlay::Sidebar)
            }
            _ => self.nav.refresh(),
        }
    }

    fn switch_library(&mut self, element: ElementId, id: String) -> Outcome {
        if self.state.current_library_id.as_deref() == Some(id.as_str()) {
            return self.nav.close_overlay_kind(Overlay::Sidebar);
        }
        self.persist("current library", |store| store.save_current_library(&id));
        self.state.current_library_id = Some(id);
        self.load_books(Some(element), AfterLoad::CloseSidebar)
    }

    fn toggle_picker_library(&mut self, element: ElementId, id: &str) -> Outcome {
        let before = self.state.current_library_id.clone();
        if !self.state.toggle_picker(id) {
            return Outcome::new();
        }
        self.save_library_selection();
        let mut out = self.nav.refresh();
        if self.state.current_library_id != before {
            out.merge(self.load_books(Some(element), AfterLoad::Nothing));
        }
        out
    }

    fn open_book(&mut self, element: ElementId, item_id: &str) -> Outcome {
        let Some(item) = self.state.find_card(item_id).cloned() else {
            return Outcome::new();
        };
        self.state.current_book = Some(item);
        self.state.current_progress = None;
        self.queue(
            Some(element),
            ApiCall::Progress {
                item_id: item_id.to_string(),
            },
            AfterLoad::Nothing,
        );
        self.nav.open_overlay(Overlay::Modal(ModalKind::BookDetails))
    }

    fn search(&mut self, origin: ElementId) -> Outcome {
        let query = self.state.search_query.trim().to_string();
        if query.is_empty() {
            self.state.search_results = None;
            return self.nav.refresh();
        }
        let Some(library_id) = self.state.current_library_id.clone() else {
            self.state.error = Some("No library selected".to_string());
            return self.nav.refresh();
        };
        if self.nav.is_in_flight(&origin) {
            return Outcome::new();
        }
        self.queue(Some(origin), ApiCall::Search { library_id, query }, AfterLoad::Nothing);
        Outcome::new()
    }

    fn adjust_speed(&mut self, tenths: i32) -> Outcome {
        self.state.settings.adjust_speed(tenths);
        self.save_settings();
        if self.state.player.is_some() {
            if let Err(err) = self.playback.set_rate(self.state.settings.playback_speed) {
                self.state.error = Some(err.to_string());
            }
        }
        self.nav.refresh()
    }

    fn play(&mut self, element: ElementId) -> Outcome {
        let Some(item_id) = self.state.current_book.as_ref().map(|book| book.id.clone()) else {
            return Outcome::new();
        };
        let device = self.config.device.device_info();
        self.queue(
            Some(element),
            ApiCall::StartSession { item_id, device },
            AfterLoad::Nothing,
        );
        Outcome::new()
    }

    /// Stop playback, wipe persisted state, and return to the login screen.
    fn logout(&mut self) -> Outcome {
        self.stop_playback();
        self.state.error = None;
        self.persist("sign-out", |store| store.clear());
        self.outbox
            .retain(|request| matches!(request.call, ApiCall::CloseSession { .. }));
        let origins: Vec<ElementId> = self.in_flight.drain().map(|(origin, _)| origin).collect();
        for origin in &origins {
            self.nav.finish_flight(origin);
        }
        self.discard_through = self.next_request;
        self.auto_login = false;
        // A failed wipe stays on screen after the reset.
        let error = self.state.error.take();
        self.state.reset();
        self.state.error = error;
        self.log(LogLevel::Info, "logged_out", std::iter::empty());
        self.nav.switch_screen(Screen::Login)
    }

    fn save_settings(&mut self) {
        let settings = self.state.settings;
        self.persist("settings", |store| store.save_app_settings(&settings));
    }

    fn save_library_selection(&mut self) {
        let selected = self.state.selected_library_ids.clone();
        let current = self.state.current_library_id.clone();
        self.persist("library selection", |store| {
            store.save_selected_libraries(&selected)?;
            match &current {
                Some(current) => store.save_current_library(current),
                None => Ok(()),
            }
        });
    }
}
