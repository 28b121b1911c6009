//! [`MediaApi`] over a pluggable HTTP transport.
//!
//! Endpoint paths, query parameters, and JSON bodies follow the Audiobookshelf REST
//! API. The transport performs the round trip; status handling and decoding live here.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::client::{ApiError, ApiResult, MediaApi};
use super::records::{
    DeviceInfo, Item, ItemQuery, ItemsResponse, LibrariesResponse, Library, LoginResponse,
    Progress, SearchResults, Session, SessionReport,
};

const SEARCH_LIMIT: u32 = 10;
const MIME_TYPES: [&str; 4] = ["audio/mpeg", "audio/mp4", "audio/aac", "audio/ogg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Performs one HTTP exchange. Connection failures map to [`ApiError::Network`].
pub trait Transport {
    fn send(&mut self, request: &HttpRequest) -> ApiResult<HttpResponse>;
}

pub struct HttpMediaApi<T> {
    transport: T,
    host: String,
    token: String,
}

impl<T: Transport> HttpMediaApi<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            host: String::new(),
            token: String::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute cover image address for an item.
    pub fn cover_url(&self, item_id: &str) -> String {
        format!(
            "{}/api/items/{}/cover?token={}",
            self.host,
            urlencoding::encode(item_id),
            urlencoding::encode(&self.token)
        )
    }

    fn request<B: Serialize>(
        &mut self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ApiResult<String> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if !self.token.is_empty() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", self.token)));
        }
        let body = body.map(serde_json::to_string).transpose()?;
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.host, endpoint),
            headers,
            body,
        };

        let response = self.transport.send(&request)?;
        if !(200..300).contains(&response.status) {
            return Err(ApiError::from_status(response.status));
        }
        Ok(response.body)
    }

    fn get<R: DeserializeOwned>(&mut self, endpoint: &str) -> ApiResult<R> {
        let body = self.request::<()>(Method::Get, endpoint, None)?;
        decode(&body)
    }

    fn post<B, R>(&mut self, endpoint: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let body = self.request(Method::Post, endpoint, Some(body))?;
        decode(&body)
    }
}

/// Empty bodies decode as `{}`.
fn decode<R: DeserializeOwned>(body: &str) -> ApiResult<R> {
    let text = if body.trim().is_empty() { "{}" } else { body };
    Ok(serde_json::from_str(text)?)
}

fn items_query(query: &ItemQuery) -> String {
    let mut params = vec![format!("limit={}", query.limit)];
    if let Some(sort) = &query.sort {
        params.push(format!("sort={}", urlencoding::encode(sort)));
    }
    params.push(format!("desc={}", u8::from(query.desc)));
    params.push("expanded=1".to_string());
    if let Some(filter) = &query.filter {
        params.push(format!("filter={}", urlencoding::encode(filter)));
    }
    params.join("&")
}

impl<T: Transport> MediaApi for HttpMediaApi<T> {
    fn configure(&mut self, host: &str, token: &str) {
        self.host = host.trim_end_matches('/').to_string();
        self.token = token.to_string();
    }

    fn login(&mut self, username: &str, password: &str) -> ApiResult<String> {
        let body = json!({ "username": username, "password": password });
        let response: LoginResponse = self.post("/login", &body)?;
        Ok(response.user.token)
    }

    fn verify_key(&mut self) -> ApiResult<()> {
        let _: LibrariesResponse = self.get("/api/libraries")?;
        Ok(())
    }

    fn list_libraries(&mut self) -> ApiResult<Vec<Library>> {
        let response: LibrariesResponse = self.get("/api/libraries")?;
        Ok(response.libraries)
    }

    fn list_items(&mut self, library_id: &str, query: &ItemQuery) -> ApiResult<Vec<Item>> {
        let endpoint = format!(
            "/api/libraries/{}/items?{}",
            urlencoding::encode(library_id),
            items_query(query)
        );
        let response: ItemsResponse = self.get(&endpoint)?;
        Ok(response.results)
    }

    fn search(&mut self, library_id: &str, query: &str) -> ApiResult<SearchResults> {
        let endpoint = format!(
            "/api/libraries/{}/search?q={}&limit={SEARCH_LIMIT}",
            urlencoding::encode(library_id),
            urlencoding::encode(query)
        );
        self.get(&endpoint)
    }

    fn item_details(&mut self, item_id: &str) -> ApiResult<Item> {
        self.get(&format!(
            "/api/items/{}?include=progress",
            urlencoding::encode(item_id)
        ))
    }

    fn start_session(&mut self, item_id: &str, device: &DeviceInfo) -> ApiResult<Session> {
        let body = json!({
            "deviceInfo": device,
            "supportedMimeTypes": MIME_TYPES,
        });
        self.post(
            &format!("/api/items/{}/play", urlencoding::encode(item_id)),
            &body,
        )
    }

    fn sync_session(&mut self, session_id: &str, report: &SessionReport) -> ApiResult<()> {
        let endpoint = format!("/api/session/{}/sync", urlencoding::encode(session_id));
        self.request(Method::Post, &endpoint, Some(report))?;
        Ok(())
    }

    fn close_session(&mut self, session_id: &str, report: &SessionReport) -> ApiResult<()> {
        let endpoint = format!("/api/session/{}/close", urlencoding::encode(session_id));
        self.request(Method::Post, &endpoint, Some(report))?;
        Ok(())
    }

    fn get_progress(&mut self, item_id: &str) -> ApiResult<Option<Progress>> {
        let endpoint = format!("/api/me/progress/{}", urlencoding::encode(item_id));
        match self.get::<Progress>(&endpoint) {
            Ok(progress) => Ok(Some(progress)),
            Err(ApiError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn stream_url(&self, content_url: &str) -> String {
        if content_url.starts_with("http") {
            return content_url.to_string();
        }
        format!(
            "{}{}?token={}",
            self.host,
            content_url,
            urlencoding::encode(&self.token)
        )
    }
}
