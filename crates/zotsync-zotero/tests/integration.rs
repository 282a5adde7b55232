//! End-to-end tests for zotsync-zotero against a mock Zotero API
//!
//! The mock server runs on its own tokio runtime; the sync itself is
//! blocking and is called from the test thread.

use std::fs;

use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zotsync_zotero::{Config, SyncError, SyncPaths, Syncer, ZoteroClient};

fn entry(server: &MockServer, key: &str, item_type: &str, extra: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<entry xmlns="http://www.w3.org/2005/Atom" xmlns:zapi="http://zotero.org/ns/api">
  <title>Item {key}</title>
  <updated>2011-02-14T00:27:03Z</updated>
  <link rel="self" type="application/atom+xml" href="{base}/users/42/items/{key}"/>
  {extra}
  <zapi:key>{key}</zapi:key>
  <zapi:itemType>{item_type}</zapi:itemType>
  <zapi:creatorSummary>Doe</zapi:creatorSummary>
</entry>"#,
        base = server.uri()
    )
}

// Field order is drop order: the server goes before its runtime.
struct Harness {
    server: MockServer,
    rt: tokio::runtime::Runtime,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let server = rt.block_on(MockServer::start());
        Self {
            server,
            rt,
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn config(&self) -> Config {
        Config {
            user_id: "42".into(),
            api_key: "TESTKEY".into(),
            base_url: self.server.uri(),
            paths: SyncPaths::in_dir(self.dir.path()),
            ..Default::default()
        }
    }

    fn keys(&self, body: &str) {
        self.rt.block_on(
            Mock::given(method("GET"))
                .and(path("/users/42/items"))
                .and(query_param("format", "keys"))
                .and(query_param("order", "dateModified"))
                .and(query_param("key", "TESTKEY"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&self.server),
        );
    }

    fn item(&self, key: &str, response: ResponseTemplate) {
        self.rt.block_on(
            Mock::given(method("GET"))
                .and(path(format!("/users/42/items/{key}")))
                .and(query_param("format", "atom"))
                .respond_with(response)
                .mount(&self.server),
        );
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).unwrap_or_default()
    }
}

#[test]
fn syncs_missing_items_over_http() {
    let h = Harness::new();
    fs::write(h.dir.path().join("key.txt"), "AAAA1111\n").unwrap();
    h.keys("AAAA1111\nBBBB2222\nCCCC3333\n");

    let up = format!(
        r#"<link rel="up" type="application/atom+xml" href="{}/users/42/items/BBBB2222"/>"#,
        h.server.uri()
    );
    h.item(
        "BBBB2222",
        ResponseTemplate::new(200).set_body_string(entry(&h.server, "BBBB2222", "journalArticle", "")),
    );
    h.item(
        "CCCC3333",
        ResponseTemplate::new(200).set_body_string(entry(&h.server, "CCCC3333", "note", &up)),
    );

    let config = h.config();
    let client = ZoteroClient::new(&config);
    let summary = Syncer::new(&client, &config).run().expect("sync should succeed");

    assert_eq!(summary.server_keys, 3);
    assert_eq!(summary.missing, 2);
    assert_eq!(summary.parsed, 2);
    assert_eq!(h.read("progress.txt"), "Done/2");
    assert_eq!(h.read("key.txt"), "AAAA1111\nBBBB2222\nCCCC3333");
    assert_eq!(
        h.read("new.txt"),
        "journalArticle\tBBBB2222\tItem BBBB2222\tDoe\t\t\t\nnote\tCCCC3333\tItem CCCC3333\tDoe\tBBBB2222\t\t"
    );
    assert!(!h.read("lastupdate.txt").is_empty());
}

#[test]
fn forbidden_item_stops_the_run() {
    let h = Harness::new();
    h.keys("BBBB2222\nCCCC3333");
    h.item("BBBB2222", ResponseTemplate::new(403));
    h.item(
        "CCCC3333",
        ResponseTemplate::new(200).set_body_string(entry(&h.server, "CCCC3333", "book", "")),
    );

    let config = h.config();
    let client = ZoteroClient::new(&config);
    let err = Syncer::new(&client, &config).run().unwrap_err();

    assert!(matches!(err, SyncError::Item { index: 1, .. }));
    let progress = h.read("progress.txt");
    assert!(progress.contains("BBBB2222"), "progress: {progress}");
    assert!(progress.contains("403"));
    assert!(!progress.contains("TESTKEY"), "API key leaked: {progress}");
    assert_eq!(h.read("key.txt"), "");
    assert_eq!(h.read("new.txt"), "");
}

#[test]
fn key_list_error_is_reported() {
    let h = Harness::new();
    h.rt.block_on(
        Mock::given(method("GET"))
            .and(path("/users/42/items"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&h.server),
    );

    let config = h.config();
    let client = ZoteroClient::new(&config);
    let err = Syncer::new(&client, &config).run().unwrap_err();

    assert!(matches!(err, SyncError::KeyList(_)));
    assert_eq!(
        h.read("progress.txt"),
        "ERROR: Error loading list of keys on server: 500 Internal Server Error"
    );
}

#[test]
fn collection_scope_uses_collection_endpoint() {
    let h = Harness::new();
    h.rt.block_on(
        Mock::given(method("GET"))
            .and(path("/users/42/collections/COLL0001/items"))
            .and(query_param("format", "keys"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .expect(1)
            .mount(&h.server),
    );

    let mut config = h.config();
    config.collection = Some("COLL0001".into());
    let client = ZoteroClient::new(&config);
    let summary = Syncer::new(&client, &config).run().expect("sync should succeed");

    assert_eq!(summary.missing, 0);
    assert_eq!(h.read("progress.txt"), "Done/0");
    h.rt.block_on(h.server.verify());
}
