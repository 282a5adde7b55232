//! Zotero Web API client
//!
//! Two endpoints are used: the key list (`format=keys`) and the single item
//! Atom entry (`format=atom`).

use std::time::Duration;

use zotsync_core::{FetchError, get_text};

use crate::config::Config;

/// Body Zotero returns instead of a key list when it rejects the query.
pub const REJECTED_QUERY: &str = "An error occurred";

/// Where the sync reads keys and entries from.
pub trait ItemSource {
    /// Raw key list body: newline-delimited keys ordered by modification date
    fn list_keys(&self) -> Result<String, FetchError>;

    /// Raw Atom document for one item
    fn fetch_item(&self, key: &str) -> Result<String, FetchError>;
}

/// URL builder for one user's library
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    user_id: String,
    api_key: String,
    collection: Option<String>,
}

impl Endpoints {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            api_key: config.api_key.clone(),
            collection: config.collection.clone().filter(|c| !c.is_empty()),
        }
    }

    /// Prefix of every item URL, ending in `/`.
    ///
    /// Stripped from `up` links to recover the parent key.
    pub fn item_base(&self) -> String {
        format!("{}/users/{}/items/", self.base_url, self.user_id)
    }

    /// Key list URL, scoped to the collection when one is configured
    pub fn key_list(&self) -> String {
        let scope = match &self.collection {
            Some(collection) => format!(
                "{}/users/{}/collections/{}/items",
                self.base_url, self.user_id, collection
            ),
            None => format!("{}/users/{}/items", self.base_url, self.user_id),
        };
        format!(
            "{scope}?key={}&format=keys&order=dateModified",
            self.api_key
        )
    }

    /// Atom entry URL for one item
    pub fn item(&self, key: &str) -> String {
        format!("{}{key}?key={}&format=atom", self.item_base(), self.api_key)
    }
}

/// Blocking client over the shared reqwest client
#[derive(Debug, Clone)]
pub struct ZoteroClient {
    endpoints: Endpoints,
    timeout: Duration,
}

impl ZoteroClient {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoints: Endpoints::new(config),
            timeout: config.read_timeout,
        }
    }
}

impl ItemSource for ZoteroClient {
    fn list_keys(&self) -> Result<String, FetchError> {
        log::debug!("GET key list");
        get_text(&self.endpoints.key_list(), self.timeout)
    }

    fn fetch_item(&self, key: &str) -> Result<String, FetchError> {
        log::debug!("GET item {key}");
        get_text(&self.endpoints.item(key), self.timeout)
    }
}

/// Explanation for status codes users commonly hit.
pub fn error_hint(err: &FetchError) -> Option<&'static str> {
    match err.status()? {
        403 => Some(
            "The forbidden message often appears because your user id or key are invalid.",
        ),
        500 => Some("This error can happen if your collection id is invalid."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(collection: Option<&str>) -> Config {
        Config {
            user_id: "12345".into(),
            api_key: "SECRET".into(),
            collection: collection.map(str::to_string),
            base_url: "https://api.zotero.org/".into(),
            ..Default::default()
        }
    }

    #[test]
    fn key_list_all_items() {
        let ep = Endpoints::new(&config(None));
        assert_eq!(
            ep.key_list(),
            "https://api.zotero.org/users/12345/items?key=SECRET&format=keys&order=dateModified"
        );
    }

    #[test]
    fn key_list_collection() {
        let ep = Endpoints::new(&config(Some("COLL1234")));
        assert_eq!(
            ep.key_list(),
            "https://api.zotero.org/users/12345/collections/COLL1234/items?key=SECRET&format=keys&order=dateModified"
        );
    }

    #[test]
    fn empty_collection_means_all_items() {
        let ep = Endpoints::new(&config(Some("")));
        assert!(!ep.key_list().contains("collections"));
    }

    #[test]
    fn item_url() {
        let ep = Endpoints::new(&config(None));
        assert_eq!(
            ep.item("ABCD1234"),
            "https://api.zotero.org/users/12345/items/ABCD1234?key=SECRET&format=atom"
        );
        assert_eq!(ep.item_base(), "https://api.zotero.org/users/12345/items/");
    }

    #[test]
    fn hints_for_known_statuses() {
        let forbidden = FetchError::Status {
            code: 403,
            reason: "Forbidden".into(),
        };
        assert!(error_hint(&forbidden).unwrap().contains("user id or key"));

        let server = FetchError::Status {
            code: 500,
            reason: "Internal Server Error".into(),
        };
        assert!(error_hint(&server).unwrap().contains("collection id"));

        assert!(error_hint(&FetchError::Transport("reset".into())).is_none());
        let not_found = FetchError::Status {
            code: 404,
            reason: "Not Found".into(),
        };
        assert!(error_hint(&not_found).is_none());
    }
}
