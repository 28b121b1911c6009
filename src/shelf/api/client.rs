use thiserror::Error;

use crate::nav::ElementId;

use super::records::{
    DeviceInfo, Item, ItemQuery, Library, Progress, SearchResults, Session, SessionReport,
};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP 401")]
    Unauthorized,
    #[error("HTTP 404")]
    NotFound,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Http(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound,
            other => ApiError::Http(other),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Request/response boundary to the media server.
///
/// Calls block the caller; the application only invokes them from
/// [`ShelfApp::pump_requests`](crate::shelf::ShelfApp::pump_requests), never while
/// handling input.
pub trait MediaApi {
    /// Point subsequent calls at `host`, authenticating with `token` when non-empty.
    fn configure(&mut self, host: &str, token: &str);
    /// Exchange a username and password for an access token.
    fn login(&mut self, username: &str, password: &str) -> ApiResult<String>;
    fn verify_key(&mut self) -> ApiResult<()>;
    fn list_libraries(&mut self) -> ApiResult<Vec<Library>>;
    fn list_items(&mut self, library_id: &str, query: &ItemQuery) -> ApiResult<Vec<Item>>;
    fn search(&mut self, library_id: &str, query: &str) -> ApiResult<SearchResults>;
    fn item_details(&mut self, item_id: &str) -> ApiResult<Item>;
    fn start_session(&mut self, item_id: &str, device: &DeviceInfo) -> ApiResult<Session>;
    fn sync_session(&mut self, session_id: &str, report: &SessionReport) -> ApiResult<()>;
    fn close_session(&mut self, session_id: &str, report: &SessionReport) -> ApiResult<()>;
    /// `None` when the server has no progress for the item.
    fn get_progress(&mut self, item_id: &str) -> ApiResult<Option<Progress>>;
    fn stream_url(&self, content_url: &str) -> String;
}

/// One queued collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Configure {
        host: String,
        token: String,
    },
    Login {
        host: String,
        username: String,
        password: String,
    },
    VerifyKey {
        host: String,
        api_key: String,
    },
    ListLibraries,
    RecentItems {
        library_id: String,
        query: ItemQuery,
    },
    InProgressItems {
        library_id: String,
        query: ItemQuery,
    },
    Search {
        library_id: String,
        query: String,
    },
    ItemDetails {
        item_id: String,
    },
    Progress {
        item_id: String,
    },
    StartSession {
        item_id: String,
        device: DeviceInfo,
    },
    SyncSession {
        session_id: String,
        report: SessionReport,
    },
    CloseSession {
        session_id: String,
        report: SessionReport,
    },
}

impl ApiCall {
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::Configure { .. } => "configure",
            ApiCall::Login { .. } => "login",
            ApiCall::VerifyKey { .. } => "verify_key",
            ApiCall::ListLibraries => "list_libraries",
            ApiCall::RecentItems { .. } => "recent_items",
            ApiCall::InProgressItems { .. } => "in_progress_items",
            ApiCall::Search { .. } => "search",
            ApiCall::ItemDetails { .. } => "item_details",
            ApiCall::Progress { .. } => "progress",
            ApiCall::StartSession { .. } => "start_session",
            ApiCall::SyncSession { .. } => "sync_session",
            ApiCall::CloseSession { .. } => "close_session",
        }
    }
}

/// Successful result of an [`ApiCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    Done,
    Token(String),
    Libraries(Vec<Library>),
    Items(Vec<Item>),
    Search(SearchResults),
    Item(Item),
    Progress(Option<Progress>),
    Session(Session),
}

/// Continuation to run once a book listing chain has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterLoad {
    Nothing,
    EnterLibrary,
    CloseSidebar,
}

/// A queued call and the element whose activation issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: u64,
    pub origin: Option<ElementId>,
    pub call: ApiCall,
    pub after: AfterLoad,
}

/// Completion delivered back to the application.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub request: Request,
    pub result: ApiResult<ApiPayload>,
}

/// Execute `call` against `api`. Session tracks come back with playable stream URLs.
pub fn dispatch(api: &mut dyn MediaApi, call: &ApiCall) -> ApiResult<ApiPayload> {
    match call {
        ApiCall::Configure { host, token } => {
            api.configure(host, token);
            Ok(ApiPayload::Done)
        }
        ApiCall::Login {
            host,
            username,
            password,
        } => {
            api.configure(host, "");
            let token = api.login(username, password)?;
            api.configure(host, &token);
            Ok(ApiPayload::Token(token))
        }
        ApiCall::VerifyKey { host, api_key } => {
            api.configure(host, api_key);
            api.verify_key()?;
            Ok(ApiPayload::Token(api_key.clone()))
        }
        ApiCall::ListLibraries => api.list_libraries().map(ApiPayload::Libraries),
        ApiCall::RecentItems { library_id, query }
        | ApiCall::InProgressItems { library_id, query } => {
            api.list_items(library_id, query).map(ApiPayload::Items)
        }
        ApiCall::Search { library_id, query } => {
            api.search(library_id, query).map(ApiPayload::Search)
        }
        ApiCall::ItemDetails { item_id } => api.item_details(item_id).map(ApiPayload::Item),
        ApiCall::Progress { item_id } => api.get_progress(item_id).map(ApiPayload::Progress),
        ApiCall::StartSession { item_id, device } => {
            let mut session = api.start_session(item_id, device)?;
            for track in &mut session.audio_tracks {
                track.content_url = api.stream_url(&track.content_url);
            }
            Ok(ApiPayload::Session(session))
        }
        ApiCall::SyncSession { session_id, report } => {
            api.sync_session(session_id, report).map(|_| ApiPayload::Done)
        }
        ApiCall::CloseSession { session_id, report } => {
            api.close_session(session_id, report).map(|_| ApiPayload::Done)
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use super::*;
    use crate::shelf::api::records::{AudioTrack, Media, Metadata};

    /// Scripted in-memory server.
    #[derive(Debug, Default)]
    pub(crate) struct FakeMediaApi {
        pub(crate) host: String,
        pub(crate) token: String,
        pub(crate) password: String,
        pub(crate) api_key: String,
        pub(crate) libraries: Vec<Library>,
        pub(crate) items: HashMap<String, Vec<Item>>,
        pub(crate) failing: HashMap<&'static str, ApiError>,
        pub(crate) calls: Vec<String>,
        pub(crate) syncs: Vec<SessionReport>,
        pub(crate) closes: Vec<SessionReport>,
    }

    pub(crate) fn book(id: &str, title: &str, duration: f64, progress: f64) -> Item {
        Item {
            id: id.to_string(),
            media: Media {
                metadata: Metadata {
                    title: Some(title.to_string()),
                    authors: vec![crate::shelf::api::records::Author {
                        name: "Author".to_string(),
                    }],
                    ..Metadata::default()
                },
                duration: Some(duration),
            },
            user_media_progress: (progress > 0.0).then(|| Progress {
                progress,
                current_time: duration * progress,
                duration,
                is_finished: false,
            }),
        }
    }

    impl FakeMediaApi {
        pub(crate) fn with_library() -> Self {
            let mut api = Self {
                password: "secret".to_string(),
                api_key: "key-1".to_string(),
                libraries: vec![
                    Library {
                        id: "lib-books".to_string(),
                        name: "Audiobooks".to_string(),
                        media_type: Some("book".to_string()),
                    },
                    Library {
                        id: "lib-pods".to_string(),
                        name: "Podcasts".to_string(),
                        media_type: Some("podcast".to_string()),
                    },
                ],
                ..Self::default()
            };
            api.items.insert(
                "lib-books".to_string(),
                vec![
                    book("li_1", "Dune", 7200.0, 0.5),
                    book("li_2", "Emma", 3600.0, 0.0),
                    book("li_3", "Ulysses", 5400.0, 1.0),
                ],
            );
            api.items.insert(
                "lib-pods".to_string(),
                vec![book("li_9", "Episode 1", 1800.0, 0.0)],
            );
            api
        }

        fn check(&mut self, name: &'static str) -> ApiResult<()> {
            self.calls.push(name.to_string());
            match self.failing.get(name) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn find(&self, item_id: &str) -> Option<Item> {
            self.items
                .values()
                .flatten()
                .find(|item| item.id == item_id)
                .cloned()
        }
    }

    impl MediaApi for FakeMediaApi {
        fn configure(&mut self, host: &str, token: &str) {
            self.host = host.to_string();
            self.token = token.to_string();
        }

        fn login(&mut self, _username: &str, password: &str) -> ApiResult<String> {
            self.check("login")?;
            if password == self.password {
                Ok("token-1".to_string())
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        fn verify_key(&mut self) -> ApiResult<()> {
            self.check("verify_key")?;
            if self.token == self.api_key {
                Ok(())
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        fn list_libraries(&mut self) -> ApiResult<Vec<Library>> {
            self.check("list_libraries")?;
            Ok(self.libraries.clone())
        }

        fn list_items(&mut self, library_id: &str, query: &ItemQuery) -> ApiResult<Vec<Item>> {
            let name = if query.filter.is_some() {
                "in_progress_items"
            } else {
                "recent_items"
            };
            self.check(name)?;
            let items = self.items.get(library_id).cloned().unwrap_or_default();
            Ok(items.into_iter().take(query.limit as usize).collect())
        }

        fn search(&mut self, library_id: &str, query: &str) -> ApiResult<SearchResults> {
            self.check("search")?;
            let needle = query.to_lowercase();
            let books = self
                .items
                .get(library_id)
                .into_iter()
                .flatten()
                .filter(|item| item.title().to_lowercase().contains(&needle))
                .map(|item| crate::shelf::api::records::BookHit {
                    library_item: item.clone(),
                })
                .collect();
            Ok(SearchResults {
                books,
                series: Vec::new(),
            })
        }

        fn item_details(&mut self, item_id: &str) -> ApiResult<Item> {
            self.check("item_details")?;
            self.find(item_id).ok_or(ApiError::NotFound)
        }

        fn start_session(&mut self, item_id: &str, _device: &DeviceInfo) -> ApiResult<Session> {
            self.check("start_session")?;
            let item = self.find(item_id).ok_or(ApiError::NotFound)?;
            let half = item.duration() / 2.0;
            Ok(Session {
                id: format!("session-{item_id}"),
                audio_tracks: vec![
                    AudioTrack {
                        title: Some("Part 1".to_string()),
                        duration: half,
                        content_url: format!("/audio/{item_id}/1"),
                    },
                    AudioTrack {
                        title: Some("Part 2".to_string()),
                        duration: half,
                        content_url: format!("/audio/{item_id}/2"),
                    },
                ],
                duration: item.duration(),
            })
        }

        fn sync_session(&mut self, _session_id: &str, report: &SessionReport) -> ApiResult<()> {
            self.check("sync_session")?;
            self.syncs.push(*report);
            Ok(())
        }

        fn close_session(&mut self, _session_id: &str, report: &SessionReport) -> ApiResult<()> {
            self.check("close_session")?;
            self.closes.push(*report);
            Ok(())
        }

        fn get_progress(&mut self, item_id: &str) -> ApiResult<Option<Progress>> {
            self.check("progress")?;
            Ok(self.find(item_id).and_then(|item| item.user_media_progress))
        }

        fn stream_url(&self, content_url: &str) -> String {
            format!("{}{}?token={}", self.host, content_url, self.token)
        }
    }
}
