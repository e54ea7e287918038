use serde_json::json;

use confluence_crx_core::model::{ContentType, DefaultSpaceMode};
use confluence_crx_core::settings::{Settings, DEFAULT_LIMIT};
use confluence_crx_core::store::{KeyValueStore, MemoryStore};

#[tokio::test]
async fn empty_store_yields_defaults() {
    let store = MemoryStore::new();
    let settings = Settings::load(&store).await.unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.content_type, ContentType::All);
    assert_eq!(settings.limit, DEFAULT_LIMIT);
    assert!(!settings.advanced_search);
}

#[tokio::test]
async fn reads_values_as_the_options_page_stores_them() {
    let store = MemoryStore::with_entries([
        ("rooturl", json!("https://wiki.example.com")),
        ("spacekey", json!("ENG,OPS")),
        ("defspace", json!("l")),
        ("type", json!("blogpost")),
        ("limit", json!("40")),
        ("advancedsearch", json!("true")),
    ]);
    let settings = Settings::load(&store).await.unwrap();

    assert_eq!(settings.root_url, "https://wiki.example.com");
    assert_eq!(settings.space_key.as_deref(), Some("ENG,OPS"));
    assert_eq!(settings.default_space, Some(DefaultSpaceMode::LastAccessed));
    assert_eq!(settings.content_type, ContentType::Blogpost);
    assert_eq!(settings.limit, 40);
    assert!(settings.advanced_search);
}

#[tokio::test]
async fn blank_space_key_and_bad_limit_fall_back() {
    let store = MemoryStore::with_entries([("spacekey", json!("  ")), ("limit", json!("lots"))]);
    let settings = Settings::load(&store).await.unwrap();

    assert_eq!(settings.space_key, None);
    assert_eq!(settings.limit, DEFAULT_LIMIT);
}

#[tokio::test]
async fn save_then_load_keeps_values() {
    let store = MemoryStore::new();
    let settings = Settings {
        root_url: "https://acme.atlassian.net/wiki".to_string(),
        space_key: Some("DOCS".to_string()),
        default_space: Some(DefaultSpaceMode::Settings),
        content_type: ContentType::PageAndBlogpost,
        limit: 7,
        advanced_search: true,
        link_format: Some("html".to_string()),
        start_breadcrumb: None,
    };
    settings.save(&store).await.unwrap();

    assert_eq!(store.get("limit").await.unwrap(), Some(json!("7")));
    assert_eq!(Settings::load(&store).await.unwrap(), settings);
}
