use serde_json::json;

use crate::error::Result;
use crate::logging::{LogLevel, json_kv};
use crate::nav::{ElementId, ModalKind, Overlay, Screen};
use crate::render::RenderBoundary;
use crate::shelf::api::{
    AfterLoad, ApiCall, ApiError, ApiPayload, ApiReply, Item, Library, Request,
};
use crate::shelf::format::error_message;
use crate::shelf::settings::{AuthType, Credentials, Preferences};
use crate::shelf::views::ShelfAction;

use super::{Outcome, ShelfApp};

const NO_LIBRARIES: &str = "No libraries found on server";
const LIBRARIES_FAILED: &str = "Failed to load libraries. Please check your credentials.";

impl<R: RenderBoundary<ShelfAction>> ShelfApp<R> {
    /// Deliver one completed call. Follow-up calls of the same chain are queued
    /// before the origin's flight is settled, so the origin stays suppressed until
    /// the whole chain is done. The flight is settled on every path, including
    /// failed settings writes.
    pub fn on_api_reply(&mut self, reply: ApiReply) -> Result<()> {
        let ApiReply { request, result } = reply;
        if request.id <= self.discard_through {
            self.log(
                LogLevel::Debug,
                "reply_discarded",
                [
                    json_kv("id", json!(request.id)),
                    json_kv("call", json!(request.call.name())),
                ],
            );
            return Ok(());
        }

        let mut out = match result {
            Ok(payload) => {
                self.log(
                    LogLevel::Debug,
                    "request_completed",
                    [
                        json_kv("id", json!(request.id)),
                        json_kv("call", json!(request.call.name())),
                    ],
                );
                self.on_success(&request, payload)
            }
            Err(err) => self.on_failure(&request, err),
        };
        if let Some(origin) = &request.origin {
            out.merge(self.settle_flight(origin));
        }
        self.apply(out)
    }

    fn on_success(&mut self, request: &Request, payload: ApiPayload) -> Outcome {
        let origin = request.origin.clone();
        let out = match (&request.call, payload) {
            (ApiCall::Login { host, .. }, ApiPayload::Token(token)) => {
                self.signed_in(host, token, AuthType::Username, origin)
            }
            (ApiCall::VerifyKey { host, .. }, ApiPayload::Token(token)) => {
                self.signed_in(host, token, AuthType::ApiKey, origin)
            }
            (ApiCall::ListLibraries, ApiPayload::Libraries(libraries)) => {
                self.libraries_loaded(libraries, origin)
            }
            (ApiCall::RecentItems { library_id, .. }, ApiPayload::Items(items)) => {
                self.state.recent = items;
                self.queue_in_progress(library_id.clone(), origin, request.after);
                Outcome::new()
            }
            (ApiCall::InProgressItems { .. }, ApiPayload::Items(items)) => {
                self.state.continue_listening =
                    items.into_iter().filter(Item::is_in_progress).collect();
                self.books_loaded(request.after)
            }
            (ApiCall::Search { .. }, ApiPayload::Search(results)) => {
                self.state.search_results = Some(results);
                self.nav.refresh()
            }
            (ApiCall::ItemDetails { .. }, ApiPayload::Item(item)) => {
                self.show_details(item, origin)
            }
            (ApiCall::Progress { item_id }, ApiPayload::Progress(progress)) => {
                let current = self.state.current_book.as_ref().map(|book| book.id.as_str());
                if current == Some(item_id.as_str()) {
                    self.state.current_progress = progress;
                    self.nav.refresh()
                } else {
                    Outcome::new()
                }
            }
            (ApiCall::StartSession { .. }, ApiPayload::Session(session)) => {
                self.session_started(session)
            }
            _ => Outcome::new(),
        };
        out
    }

    fn on_failure(&mut self, request: &Request, err: ApiError) -> Outcome {
        self.log(
            LogLevel::Warn,
            "request_failed",
            [
                json_kv("id", json!(request.id)),
                json_kv("call", json!(request.call.name())),
                json_kv("error", json!(err.to_string())),
            ],
        );
        if err == ApiError::Unauthorized {
            self.persist("credentials", |store| store.clear_credentials());
        }

        match &request.call {
            ApiCall::ListLibraries => {
                self.persist("credentials", |store| store.clear_credentials());
                self.state.error = Some(LIBRARIES_FAILED.to_string());
                self.nav.refresh()
            }
            ApiCall::Login { .. } | ApiCall::VerifyKey { .. } => {
                let message = error_message(&err);
                self.state.error = Some(match (self.auto_login, &request.call) {
                    (true, ApiCall::VerifyKey { .. }) => {
                        format!("Config file API key invalid: {message}")
                    }
                    (true, _) => format!("Config file credentials invalid: {message}"),
                    (false, _) => message,
                });
                self.nav.refresh()
            }
            ApiCall::RecentItems { library_id, .. } => {
                // Keep going so the library still opens, with an empty row.
                self.state.recent.clear();
                self.state.error = Some(error_message(&err));
                self.queue_in_progress(library_id.clone(), request.origin.clone(), request.after);
                Outcome::new()
            }
            ApiCall::InProgressItems { .. } => {
                self.state.continue_listening.clear();
                self.books_loaded(request.after)
            }
            ApiCall::Progress { .. } => {
                self.state.current_progress = None;
                Outcome::new()
            }
            ApiCall::Configure { .. }
            | ApiCall::SyncSession { .. }
            | ApiCall::CloseSession { .. } => Outcome::new(),
            ApiCall::Search { .. }
            | ApiCall::ItemDetails { .. }
            | ApiCall::StartSession { .. } => {
                self.state.error = Some(error_message(&err));
                self.nav.refresh()
            }
        }
    }

    fn signed_in(
        &mut self,
        host: &str,
        token: String,
        auth_type: AuthType,
        origin: Option<ElementId>,
    ) -> Outcome {
        let credentials = Credentials {
            host_url: host.to_string(),
            api_token: token,
            auth_type,
        };
        self.persist("credentials", |store| store.save_credentials(&credentials));
        self.log(
            LogLevel::Info,
            "signed_in",
            [
                json_kv("host", json!(host)),
                json_kv("auth_type", json!(auth_type.label())),
            ],
        );
        self.queue(origin, ApiCall::ListLibraries, AfterLoad::Nothing);
        Outcome::new()
    }

    /// Saved selections go straight to the library; otherwise the user picks first.
    fn libraries_loaded(&mut self, libraries: Vec<Library>, origin: Option<ElementId>) -> Outcome {
        if libraries.is_empty() {
            self.state.libraries.clear();
            self.state.error = Some(NO_LIBRARIES.to_string());
            return self.nav.refresh();
        }
        self.state.libraries = libraries;

        let saved: Vec<String> = self
            .store
            .selected_libraries()
            .into_iter()
            .filter(|id| self.state.library(id).is_some())
            .collect();
        if saved.is_empty() {
            self.state.selected_library_ids.clear();
            return self.nav.switch_screen(Screen::LibrarySelection);
        }

        let current = self
            .store
            .current_library()
            .filter(|id| self.state.library(id).is_some())
            .or_else(|| saved.first().cloned());
        self.state.selected_library_ids = saved;
        self.state.current_library_id = current;
        self.load_books(origin, AfterLoad::EnterLibrary)
    }

    fn show_details(&mut self, item: Item, origin: Option<ElementId>) -> Outcome {
        let item_id = item.id.clone();
        self.state.current_book = Some(item);
        self.state.current_progress = None;
        self.queue(origin, ApiCall::Progress { item_id }, AfterLoad::Nothing);
        let out = self.nav.open_overlay(Overlay::Modal(ModalKind::BookDetails));
        if out.is_empty() {
            self.nav.refresh()
        } else {
            out
        }
    }
}
