use crate::nav::ElementId;

use super::api::{Item, Library, Progress, SearchResults};
use super::playback::PlayerState;
use super::settings::{AppSettings, AuthType};

/// Editable credential fields on the login screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub host_url: String,
    pub username: String,
    pub password: String,
    pub api_key: String,
    pub auth_type: AuthType,
}

impl LoginForm {
    /// Host must carry an explicit http(s) scheme.
    pub fn host_is_valid(&self) -> bool {
        let host = self.host_url.trim();
        !host.is_empty() && (host.starts_with("http://") || host.starts_with("https://"))
    }
}

/// Text fields addressable by element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    HostUrl,
    Username,
    Password,
    ApiKey,
    SearchQuery,
}

impl TextField {
    pub fn for_element(id: &ElementId) -> Option<Self> {
        match id.as_str() {
            "host-url" => Some(TextField::HostUrl),
            "username" => Some(TextField::Username),
            "password" => Some(TextField::Password),
            "api-key" => Some(TextField::ApiKey),
            "search-input" => Some(TextField::SearchQuery),
            _ => None,
        }
    }

    pub fn is_login(self) -> bool {
        !matches!(self, TextField::SearchQuery)
    }
}

/// Everything the content layer draws from.
#[derive(Debug, Clone, Default)]
pub struct ShelfState {
    pub login: LoginForm,
    /// Busy flag for the connect button label.
    pub connecting: bool,
    /// User-visible error channel.
    pub error: Option<String>,
    pub libraries: Vec<Library>,
    pub selected_library_ids: Vec<String>,
    pub current_library_id: Option<String>,
    pub recent: Vec<Item>,
    pub continue_listening: Vec<Item>,
    pub current_book: Option<Item>,
    pub current_progress: Option<Progress>,
    pub search_query: String,
    pub search_results: Option<SearchResults>,
    pub settings: AppSettings,
    pub player: Option<PlayerState>,
}

impl ShelfState {
    pub fn current_library(&self) -> Option<&Library> {
        let id = self.current_library_id.as_deref()?;
        self.libraries.iter().find(|library| library.id == id)
    }

    pub fn library(&self, id: &str) -> Option<&Library> {
        self.libraries.iter().find(|library| library.id == id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_library_ids.iter().any(|selected| selected == id)
    }

    /// Selected libraries in server order.
    pub fn selected_libraries(&self) -> impl Iterator<Item = &Library> {
        self.libraries
            .iter()
            .filter(|library| self.is_selected(&library.id))
    }

    /// Flip selection on the library-selection screen.
    pub fn toggle_selected(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selected_library_ids.retain(|selected| selected != id);
        } else {
            self.selected_library_ids.push(id.to_string());
        }
    }

    /// Flip selection from the settings picker, which never empties the selection.
    /// Returns whether the selection changed.
    pub fn toggle_picker(&mut self, id: &str) -> bool {
        if self.is_selected(id) {
            if self.selected_library_ids.len() <= 1 {
                return false;
            }
            self.selected_library_ids.retain(|selected| selected != id);
            if self.current_library_id.as_deref() == Some(id) {
                self.current_library_id = self.selected_library_ids.first().cloned();
            }
        } else {
            self.selected_library_ids.push(id.to_string());
        }
        true
    }

    /// Book shown on either carousel row.
    pub fn find_card(&self, item_id: &str) -> Option<&Item> {
        self.continue_listening
            .iter()
            .chain(&self.recent)
            .find(|item| item.id == item_id)
    }

    pub fn find_search_hit(&self, item_id: &str) -> Option<&Item> {
        self.search_results
            .as_ref()?
            .books
            .iter()
            .map(|hit| &hit.library_item)
            .find(|item| item.id == item_id)
    }

    pub fn field_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::HostUrl => &mut self.login.host_url,
            TextField::Username => &mut self.login.username,
            TextField::Password => &mut self.login.password,
            TextField::ApiKey => &mut self.login.api_key,
            TextField::SearchQuery => &mut self.search_query,
        }
    }

    pub fn field(&self, field: TextField) -> &str {
        match field {
            TextField::HostUrl => &self.login.host_url,
            TextField::Username => &self.login.username,
            TextField::Password => &self.login.password,
            TextField::ApiKey => &self.login.api_key,
            TextField::SearchQuery => &self.search_query,
        }
    }

    /// Back to a signed-out state; the host URL survives for convenience.
    pub fn reset(&mut self) {
        let host_url = std::mem::take(&mut self.login.host_url);
        *self = Self {
            login: LoginForm {
                host_url,
                ..LoginForm::default()
            },
            ..Self::default()
        };
    }
}
