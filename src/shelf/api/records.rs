use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub narrators: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Listening progress for one item. `progress` is a fraction in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_time: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub is_finished: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub media: Media,
    #[serde(default)]
    pub user_media_progress: Option<Progress>,
}

impl Item {
    pub fn title(&self) -> &str {
        self.media
            .metadata
            .title
            .as_deref()
            .unwrap_or("Unknown Title")
    }

    pub fn author(&self) -> &str {
        let metadata = &self.media.metadata;
        metadata
            .authors
            .first()
            .map(|author| author.name.as_str())
            .filter(|name| !name.is_empty())
            .or(metadata.author_name.as_deref())
            .unwrap_or("Unknown Author")
    }

    pub fn duration(&self) -> f64 {
        self.media.duration.unwrap_or(0.0)
    }

    pub fn progress(&self) -> f64 {
        self.user_media_progress
            .as_ref()
            .map(|progress| progress.progress)
            .unwrap_or(0.0)
    }

    /// Started but not finished.
    pub fn is_in_progress(&self) -> bool {
        let progress = self.progress();
        progress > 0.0 && progress < 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookHit {
    pub library_item: Item,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesHit {
    #[serde(default)]
    pub series: Option<Series>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, rename = "book")]
    pub books: Vec<BookHit>,
    #[serde(default)]
    pub series: Vec<SeriesHit>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.series.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTrack {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: f64,
    pub content_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub audio_tracks: Vec<AudioTrack>,
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: String,
    pub client_name: String,
    pub client_version: String,
    pub platform: String,
    pub model: String,
    pub device_name: String,
}

/// Position report sent with session sync and close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub current_time: f64,
    pub time_listened: f64,
    pub duration: f64,
}

/// Options for listing library items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub limit: u32,
    pub sort: Option<String>,
    pub desc: bool,
    pub filter: Option<String>,
}

impl ItemQuery {
    /// Newest additions first.
    pub fn recent(limit: u32) -> Self {
        Self {
            limit,
            sort: Some("addedAt".to_string()),
            desc: true,
            filter: None,
        }
    }

    /// Items with any recorded progress.
    pub fn in_progress(limit: u32) -> Self {
        Self {
            limit,
            sort: None,
            desc: true,
            filter: Some("progress.01-1".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub(crate) user: LoginUser,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginUser {
    pub(crate) token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LibrariesResponse {
    #[serde(default)]
    pub(crate) libraries: Vec<Library>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ItemsResponse {
    #[serde(default)]
    pub(crate) results: Vec<Item>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_decodes_with_missing_fields() {
        let item: Item = serde_json::from_str(r#"{"id":"li_1"}"#).unwrap();
        assert_eq!(item.title(), "Unknown Title");
        assert_eq!(item.author(), "Unknown Author");
        assert_eq!(item.duration(), 0.0);
        assert!(!item.is_in_progress());
    }

    #[test]
    fn item_prefers_first_author_then_author_name() {
        let item: Item = serde_json::from_str(
            r#"{"id":"li_2","media":{"duration":3600.5,"metadata":{"title":"Dune",
               "authorName":"F. Herbert","authors":[]}},
               "userMediaProgress":{"progress":0.4,"currentTime":1440.0}}"#,
        )
        .unwrap();
        assert_eq!(item.title(), "Dune");
        assert_eq!(item.author(), "F. Herbert");
        assert!(item.is_in_progress());
    }

    #[test]
    fn search_results_use_server_section_names() {
        let results: SearchResults = serde_json::from_str(
            r#"{"book":[{"libraryItem":{"id":"li_3"}}],"series":[{"series":{"name":"Dune"}}]}"#,
        )
        .unwrap();
        assert_eq!(results.books[0].library_item.id, "li_3");
        assert_eq!(results.series[0].series.as_ref().map(|s| s.name.as_str()), Some("Dune"));
        assert!(SearchResults::default().is_empty());
    }
}
