//! Zotero group-library submission.
//!
//! Maps parsed BibTeX entries onto Zotero `book` items and pushes them into
//! a freshly created collection through the Zotero Web API v3. Only the
//! three write calls this workflow needs are implemented: create a
//! collection, create items in batch, and file an item under a collection.
//!
//! Credentials are plain values passed to [`ZoteroClient::new`]; nothing in
//! this module reads the environment.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bibtex;
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.zotero.org";
const API_VERSION: &str = "3";

/// Environment variable holding the Zotero group library id.
pub const LIBRARY_ID_VAR: &str = "BACKLIST_ZOT_LIBRARY_ID";
/// Environment variable holding the Zotero API key.
pub const API_KEY_VAR: &str = "BACKLIST_ZOT_API_KEY";

static BRACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[{}]").unwrap());

/// Pre-shared credentials for one Zotero group library.
#[derive(Debug, Clone)]
pub struct ZoteroConfig {
    pub library_id: String,
    pub api_key: String,
}

impl ZoteroConfig {
    /// Read credentials from the conventional environment variables.
    ///
    /// This is a convenience for the binaries; library callers can build
    /// the config from any source.
    pub fn from_env() -> Result<ZoteroConfig> {
        let library_id = std::env::var(LIBRARY_ID_VAR)
            .map_err(|_| Error::Api(format!("{LIBRARY_ID_VAR} is not set")))?;
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| Error::Api(format!("{API_KEY_VAR} is not set")))?;
        Ok(ZoteroConfig {
            library_id,
            api_key,
        })
    }
}

/// A creator attached to an item (author, editor, translator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub creator_type: String,
    pub first_name: String,
    pub last_name: String,
}

/// A Zotero `book` item ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_type: String,
    pub title: String,
    pub creators: Vec<Creator>,
    pub publisher: String,
    pub place: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

/// Build a Zotero item from a BibTeX entry.
///
/// Creators come from the `author`, `editor`, and `translator` fields, in
/// that order. Brace markup in the title is stripped; absent fields map to
/// empty strings, which Zotero accepts.
pub fn item_from_entry(entry: &bibtex::Entry) -> Item {
    let mut creators = Vec::new();
    for (field, role) in [
        ("author", "author"),
        ("editor", "editor"),
        ("translator", "translator"),
    ] {
        if let Some(names) = entry.get(field) {
            creators.extend(split_creators(names, role));
        }
    }

    Item {
        item_type: "book".to_string(),
        title: BRACES
            .replace_all(entry.get("title").unwrap_or(""), "")
            .into_owned(),
        creators,
        publisher: entry.get("publisher").unwrap_or("").to_string(),
        place: entry.get("address").unwrap_or("").to_string(),
        date: entry.get("year").unwrap_or("").to_string(),
        series: entry.get("series").map(str::to_string),
    }
}

/// Split a BibTeX creator list (`First Last and First Last`) into creators.
///
/// The last whitespace-separated word is the last name; everything before
/// it is the first name.
pub fn split_creators(names: &str, role: &str) -> Vec<Creator> {
    names
        .split(" and ")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let mut words: Vec<&str> = name.split_whitespace().collect();
            let last_name = words.pop().unwrap_or("").to_string();
            Creator {
                creator_type: role.to_string(),
                first_name: words.join(" "),
                last_name,
            }
        })
        .collect()
}

/// An item created on the server, with the version needed for follow-up
/// writes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedItem {
    pub key: String,
    pub version: u64,
}

/// Write-request response shape shared by the collection and item calls.
#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(default)]
    success: HashMap<String, String>,
    #[serde(default)]
    successful: HashMap<String, CreatedItem>,
    #[serde(default)]
    failed: HashMap<String, serde_json::Value>,
}

/// Pull the key of the single created collection out of a write response.
fn collection_key(response: WriteResponse, name: &str) -> Result<String> {
    response
        .success
        .get("0")
        .cloned()
        .ok_or_else(|| Error::Api(format!("collection `{name}` was not created")))
}

/// Restore submission order from a write response's `successful` map, which
/// keys items by submission index ("0", "1", ...). Any entry in `failed`
/// rejects the whole batch.
fn created_in_submission_order(
    response: WriteResponse,
    submitted: usize,
) -> Result<Vec<CreatedItem>> {
    if !response.failed.is_empty() {
        return Err(Error::Api(format!(
            "{} of {} items were rejected",
            response.failed.len(),
            submitted
        )));
    }

    let mut created: Vec<(usize, CreatedItem)> = response
        .successful
        .into_iter()
        .map(|(index, item)| {
            let index = index
                .parse::<usize>()
                .map_err(|_| Error::Api(format!("unexpected item index `{index}`")))?;
            Ok((index, item))
        })
        .collect::<Result<_>>()?;
    created.sort_by_key(|(index, _)| *index);
    Ok(created.into_iter().map(|(_, item)| item).collect())
}

/// Outcome of [`ZoteroClient::push_collection`].
#[derive(Debug)]
pub struct PushSummary {
    pub collection_key: String,
    pub item_keys: Vec<String>,
}

/// Blocking client for one Zotero group library.
pub struct ZoteroClient {
    config: ZoteroConfig,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl ZoteroClient {
    pub fn new(config: ZoteroConfig) -> ZoteroClient {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Point the client at a non-default endpoint (used by tests).
    pub fn with_base_url(config: ZoteroConfig, base_url: &str) -> ZoteroClient {
        ZoteroClient {
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn group_url(&self, path: &str) -> String {
        format!(
            "{}/groups/{}/{}",
            self.base_url, self.config.library_id, path
        )
    }

    /// Create a collection and return its key.
    pub fn create_collection(&self, name: &str) -> Result<String> {
        let body = serde_json::json!([{ "name": name }]);
        let response: WriteResponse = self
            .http
            .post(self.group_url("collections"))
            .bearer_auth(&self.config.api_key)
            .header("Zotero-API-Version", API_VERSION)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        collection_key(response, name)
    }

    /// Create items in one batch, returning them in submission order.
    pub fn create_items(&self, items: &[Item]) -> Result<Vec<CreatedItem>> {
        let response: WriteResponse = self
            .http
            .post(self.group_url("items"))
            .bearer_auth(&self.config.api_key)
            .header("Zotero-API-Version", API_VERSION)
            .json(items)
            .send()?
            .error_for_status()?
            .json()?;

        created_in_submission_order(response, items.len())
    }

    /// File an already-created item under a collection.
    pub fn add_to_collection(&self, collection_key: &str, item: &CreatedItem) -> Result<()> {
        let body = serde_json::json!({ "collections": [collection_key] });
        self.http
            .patch(self.group_url(&format!("items/{}", item.key)))
            .bearer_auth(&self.config.api_key)
            .header("Zotero-API-Version", API_VERSION)
            .header("If-Unmodified-Since-Version", item.version.to_string())
            .json(&body)
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Create a collection, create the items, and file each item under the
    /// collection.
    pub fn push_collection(&self, name: &str, items: &[Item]) -> Result<PushSummary> {
        let collection_key = self.create_collection(name)?;
        let created = self.create_items(items)?;
        for item in &created {
            self.add_to_collection(&collection_key, item)?;
        }
        Ok(PushSummary {
            collection_key,
            item_keys: created.into_iter().map(|item| item.key).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> bibtex::Entry {
        bibtex::parse(text).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn item_mapping_covers_all_fields() {
        let entry = entry(
            "@book{k,\n  author = {Herman Melville},\n  title = {Moby-Dick},\n  publisher = {Harper},\n  address = {New York},\n  year = {1851},\n  series = {American Classics},\n}\n",
        );
        let item = item_from_entry(&entry);
        assert_eq!(item.item_type, "book");
        assert_eq!(item.title, "Moby-Dick");
        assert_eq!(item.publisher, "Harper");
        assert_eq!(item.place, "New York");
        assert_eq!(item.date, "1851");
        assert_eq!(item.series.as_deref(), Some("American Classics"));
        assert_eq!(item.creators.len(), 1);
        assert_eq!(item.creators[0].creator_type, "author");
        assert_eq!(item.creators[0].first_name, "Herman");
        assert_eq!(item.creators[0].last_name, "Melville");
    }

    #[test]
    fn title_braces_are_stripped() {
        let entry = entry("@book{k, title = {The {Complete} Stories} }");
        assert_eq!(item_from_entry(&entry).title, "The Complete Stories");
    }

    #[test]
    fn creators_split_on_and() {
        let creators = split_creators("Anne Brown and Charles de Gaulle", "editor");
        assert_eq!(creators.len(), 2);
        assert_eq!(creators[0].first_name, "Anne");
        assert_eq!(creators[0].last_name, "Brown");
        assert_eq!(creators[1].first_name, "Charles de");
        assert_eq!(creators[1].last_name, "Gaulle");
        assert!(creators.iter().all(|c| c.creator_type == "editor"));
    }

    #[test]
    fn single_word_creator_has_empty_first_name() {
        let creators = split_creators("Homer", "author");
        assert_eq!(creators[0].first_name, "");
        assert_eq!(creators[0].last_name, "Homer");
    }

    #[test]
    fn editors_and_translators_follow_authors() {
        let entry = entry(
            "@book{k, author = {A Author}, editor = {E Editor}, translator = {T Translator} }",
        );
        let item = item_from_entry(&entry);
        let roles: Vec<&str> = item
            .creators
            .iter()
            .map(|c| c.creator_type.as_str())
            .collect();
        assert_eq!(roles, vec!["author", "editor", "translator"]);
    }

    #[test]
    fn absent_fields_become_empty_strings() {
        let entry = entry("@book{k, title = {T} }");
        let item = item_from_entry(&entry);
        assert_eq!(item.publisher, "");
        assert_eq!(item.place, "");
        assert_eq!(item.date, "");
        assert!(item.series.is_none());
        assert!(item.creators.is_empty());
    }

    #[test]
    fn item_serializes_with_camel_case_keys() {
        let entry = entry("@book{k, title = {T}, author = {A Author} }");
        let json = serde_json::to_value(item_from_entry(&entry)).unwrap();
        assert_eq!(json["itemType"], "book");
        assert_eq!(json["creators"][0]["creatorType"], "author");
        assert_eq!(json["creators"][0]["firstName"], "A");
        assert_eq!(json["creators"][0]["lastName"], "Author");
        assert!(json.get("series").is_none());
    }

    fn write_response(json: &str) -> WriteResponse {
        serde_json::from_str(json).expect("valid write response")
    }

    #[test]
    fn collection_key_comes_from_the_success_map() {
        let response = write_response(r#"{"success": {"0": "COLLKEY"}, "failed": {}}"#);
        assert_eq!(collection_key(response, "Spring").unwrap(), "COLLKEY");
    }

    #[test]
    fn missing_collection_key_is_an_api_error() {
        let response = write_response(r#"{"success": {}, "failed": {}}"#);
        let err = collection_key(response, "Spring").unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    #[test]
    fn created_items_are_restored_to_submission_order() {
        let response = write_response(
            r#"{"successful": {
                "1": {"key": "BBB", "version": 12},
                "0": {"key": "AAA", "version": 11},
                "2": {"key": "CCC", "version": 13}
            }}"#,
        );
        let created = created_in_submission_order(response, 3).unwrap();
        let keys: Vec<&str> = created.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn any_failed_item_rejects_the_batch() {
        let response = write_response(
            r#"{"successful": {"0": {"key": "AAA", "version": 11}},
                "failed": {"1": {"code": 400, "message": "bad item"}}}"#,
        );
        let err = created_in_submission_order(response, 2).unwrap_err();
        match err {
            Error::Api(message) => assert!(message.contains("1 of 2")),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_item_index_is_an_api_error() {
        let response =
            write_response(r#"{"successful": {"zero": {"key": "AAA", "version": 11}}}"#);
        let err = created_in_submission_order(response, 1).unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    // ------------------------------------------------------------------
    // Wire-level coverage against a local one-shot stub server.
    // ------------------------------------------------------------------

    /// Serve one canned JSON response on a local port, returning the base
    /// URL and a handle yielding the raw request that was received.
    fn serve_one(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("local addr");

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];

            // Read headers, then exactly Content-Length body bytes.
            let header_end = loop {
                let n = stream.read(&mut chunk).expect("read request");
                assert!(n > 0, "client closed before sending a full request");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while request.len() < header_end + content_length {
                let n = stream.read(&mut chunk).expect("read body");
                assert!(n > 0, "client closed mid-body");
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).expect("write response");
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    #[test]
    fn create_collection_hits_the_group_endpoint_with_auth() {
        let (base_url, server) =
            serve_one(r#"{"successful": {}, "success": {"0": "COLLKEY"}, "failed": {}}"#);
        let config = ZoteroConfig {
            library_id: "12345".to_string(),
            api_key: "sekrit".to_string(),
        };
        let client = ZoteroClient::with_base_url(config, &base_url);

        let key = client.create_collection("Spring Reading").unwrap();
        assert_eq!(key, "COLLKEY");

        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("post /groups/12345/collections"));
        assert!(request.contains("authorization: bearer sekrit"));
        assert!(request.contains("zotero-api-version: 3"));
        assert!(request.contains("spring reading"));
    }

    #[test]
    fn create_items_round_trips_through_the_wire() {
        let (base_url, server) = serve_one(
            r#"{"successful": {"0": {"key": "ITEM0", "version": 5}}, "failed": {}}"#,
        );
        let config = ZoteroConfig {
            library_id: "12345".to_string(),
            api_key: "sekrit".to_string(),
        };
        let client = ZoteroClient::with_base_url(config, &base_url);

        let entry = entry("@book{k, title = {Moby-Dick}, author = {Herman Melville} }");
        let created = client.create_items(&[item_from_entry(&entry)]).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].key, "ITEM0");
        assert_eq!(created[0].version, 5);

        let request = server.join().unwrap();
        assert!(request.to_ascii_lowercase().starts_with("post /groups/12345/items"));
        assert!(request.contains(r#""itemType":"book""#));
        assert!(request.contains("Moby-Dick"));
    }
}
