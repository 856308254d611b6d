//! Zotero Web API v3 client.
//!
//! Covers the endpoints the pipeline needs: paged item listing (whole library
//! or per collection), full-text search, collection and tag listing, and
//! per-item BibTeX retrieval. Auth is the `Zotero-API-Key` header.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::item::{extract_year, ItemError, LibraryItem};

const DEFAULT_BASE_URL: &str = "https://api.zotero.org";
const API_VERSION: &str = "3";

/// Whether the library belongs to a user or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    User,
    Group,
}

impl LibraryType {
    /// URL path segment for this library type.
    pub fn path_segment(&self) -> &'static str {
        match self {
            LibraryType::User => "users",
            LibraryType::Group => "groups",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::User => "user",
            LibraryType::Group => "group",
        }
    }

    /// Parse "user" or "group".
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(LibraryType::User),
            "group" => Ok(LibraryType::Group),
            other => anyhow::bail!("Invalid library type '{}' (expected user or group)", other),
        }
    }
}

/// A raw item as returned by the API: a stable key plus a `data` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub data: RawItemData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItemData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub creators: Vec<RawCreator>,
    #[serde(default)]
    pub abstract_note: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub publication_title: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub pages: String,
    #[serde(default, rename = "DOI")]
    pub doi: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: Vec<RawTag>,
    /// Collection keys this item belongs to.
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub date_added: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default)]
    pub extra: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCreator {
    #[serde(default)]
    pub creator_type: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTag {
    #[serde(default)]
    pub tag: String,
}

/// A collection entry from the collections endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCollection {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub data: RawCollectionData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollectionData {
    #[serde(default)]
    pub name: String,
}

impl RawItem {
    /// Normalize into a `LibraryItem`.
    ///
    /// `collections` is left empty here; the analyzer fills it once the
    /// collection name table is available.
    pub fn into_item(self) -> Result<LibraryItem, ItemError> {
        if self.key.is_empty() {
            return Err(ItemError::MissingKey);
        }

        let data = self.data;

        let authors = data
            .creators
            .iter()
            .filter(|c| c.creator_type == "author" || c.creator_type == "editor")
            .filter_map(|c| {
                if let Some(name) = c.name.as_deref().filter(|n| !n.is_empty()) {
                    return Some(name.to_string());
                }
                let full = format!(
                    "{} {}",
                    c.first_name.as_deref().unwrap_or(""),
                    c.last_name.as_deref().unwrap_or("")
                );
                let full = full.trim();
                (!full.is_empty()).then(|| full.to_string())
            })
            .collect();

        let tags = data.tags.into_iter().map(|t| t.tag).collect();
        let year = extract_year(&data.date);

        Ok(LibraryItem {
            key: self.key,
            title: data.title,
            authors,
            abstract_text: non_empty(data.abstract_note),
            year,
            journal: non_empty(data.publication_title),
            volume: non_empty(data.volume),
            issue: non_empty(data.issue),
            pages: non_empty(data.pages),
            doi: non_empty(data.doi),
            url: non_empty(data.url),
            tags,
            collections: Vec::new(),
            item_type: data.item_type,
            bibtex: None,
            date_added: non_empty(data.date_added),
            date_modified: non_empty(data.date_modified),
            extra: non_empty(data.extra),
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Zotero Web API client for one library.
pub struct ZoteroClient {
    library_id: String,
    library_type: LibraryType,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ZoteroClient {
    /// Create a client for the public Zotero API.
    pub fn new(library_id: String, library_type: LibraryType, api_key: String) -> Self {
        Self {
            library_id,
            library_type,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a library-scoped API URL.
    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.library_type.path_segment(),
            self.library_id,
            path
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Zotero-API-Key", &self.api_key)
            .header("Zotero-API-Version", API_VERSION)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to reach Zotero API at {}", url))?
            .error_for_status()
            .with_context(|| format!("Zotero API rejected request to {}", url))?;

        response
            .json()
            .await
            .with_context(|| format!("Malformed Zotero API response from {}", url))
    }

    /// One page of the library's top-level items.
    pub async fn items_page(&self, start: usize, limit: usize) -> Result<Vec<RawItem>> {
        let url = self.api_url("items/top");
        self.get_json(
            &url,
            &[
                ("start", start.to_string()),
                ("limit", limit.to_string()),
                ("format", "json".to_string()),
            ],
        )
        .await
    }

    /// One page of a collection's top-level items.
    pub async fn collection_items_page(
        &self,
        collection_key: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<RawItem>> {
        let url = self.api_url(&format!("collections/{}/items/top", collection_key));
        self.get_json(
            &url,
            &[
                ("start", start.to_string()),
                ("limit", limit.to_string()),
                ("format", "json".to_string()),
            ],
        )
        .await
    }

    /// Full-text search. Ranking and capping are the service's business; one
    /// request is issued with the caller's limit.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<RawItem>> {
        let url = self.api_url("items");
        let mut params = vec![("q", query.to_string()), ("format", "json".to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.get_json(&url, &params).await
    }

    /// All collections in the library.
    pub async fn collections(&self) -> Result<Vec<RawCollection>> {
        let url = self.api_url("collections");
        self.get_json(&url, &[]).await
    }

    /// All tags in the library.
    pub async fn tags(&self) -> Result<Vec<RawTag>> {
        let url = self.api_url("tags");
        self.get_json(&url, &[]).await
    }

    /// One item rendered as BibTeX.
    pub async fn item_bibtex(&self, key: &str) -> Result<String> {
        let url = self.api_url(&format!("items/{}", key));
        let response = self
            .client
            .get(&url)
            .header("Zotero-API-Key", &self.api_key)
            .header("Zotero-API-Version", API_VERSION)
            .query(&[("format", "bibtex")])
            .send()
            .await
            .with_context(|| format!("Failed to reach Zotero API at {}", url))?
            .error_for_status()
            .with_context(|| format!("Zotero API rejected BibTeX request for item {}", key))?;

        response
            .text()
            .await
            .context("Failed to read BibTeX response body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_url() {
        let client = ZoteroClient::new(
            "12345".to_string(),
            LibraryType::User,
            "KEY".to_string(),
        );
        assert_eq!(
            client.api_url("items/top"),
            "https://api.zotero.org/users/12345/items/top"
        );

        let group = ZoteroClient::new("9".to_string(), LibraryType::Group, "KEY".to_string())
            .with_base_url("http://localhost:8080");
        assert_eq!(
            group.api_url("collections"),
            "http://localhost:8080/groups/9/collections"
        );
    }

    #[test]
    fn test_library_type_parse() {
        assert_eq!(LibraryType::parse("user").unwrap(), LibraryType::User);
        assert_eq!(LibraryType::parse("group").unwrap(), LibraryType::Group);
        assert!(LibraryType::parse("team").is_err());
    }

    #[test]
    fn test_into_item_extracts_fields() {
        let raw: RawItem = serde_json::from_value(json!({
            "key": "ABCD1234",
            "data": {
                "title": "A Study",
                "itemType": "journalArticle",
                "date": "2021-03-01",
                "abstractNote": "We study things.",
                "publicationTitle": "Journal of Studies",
                "DOI": "10.1000/xyz",
                "creators": [
                    {"creatorType": "author", "firstName": "Ada", "lastName": "Lovelace"},
                    {"creatorType": "author", "name": "Research Consortium"},
                    {"creatorType": "translator", "firstName": "X", "lastName": "Y"}
                ],
                "tags": [{"tag": "computing"}, {"tag": "history"}],
                "collections": ["COLL1"]
            }
        }))
        .unwrap();

        let item = raw.into_item().unwrap();
        assert_eq!(item.key, "ABCD1234");
        assert_eq!(item.title, "A Study");
        assert_eq!(item.authors, vec!["Ada Lovelace", "Research Consortium"]);
        assert_eq!(item.year, Some(2021));
        assert_eq!(item.abstract_text.as_deref(), Some("We study things."));
        assert_eq!(item.journal.as_deref(), Some("Journal of Studies"));
        assert_eq!(item.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(item.tags, vec!["computing", "history"]);
        assert_eq!(item.item_type, "journalArticle");
        // Collections resolve to names later.
        assert!(item.collections.is_empty());
    }

    #[test]
    fn test_into_item_missing_key() {
        let raw: RawItem = serde_json::from_value(json!({"data": {"title": "No key"}})).unwrap();
        assert!(matches!(raw.into_item(), Err(ItemError::MissingKey)));
    }

    #[test]
    fn test_into_item_unparseable_date_leaves_year_unset() {
        let raw: RawItem = serde_json::from_value(json!({
            "key": "K1",
            "data": {"title": "Undated", "date": "n.d."}
        }))
        .unwrap();
        assert_eq!(raw.into_item().unwrap().year, None);
    }
}
