use serde_json::Value;

use crate::model::{ContentType, DefaultSpaceMode};
use crate::store::{KeyValueStore, StoreError};

pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 100;

pub const KEY_ROOT_URL: &str = "rooturl";
pub const KEY_SPACE_KEY: &str = "spacekey";
pub const KEY_DEFAULT_SPACE: &str = "defspace";
pub const KEY_TYPE: &str = "type";
pub const KEY_LIMIT: &str = "limit";
pub const KEY_ADVANCED_SEARCH: &str = "advancedsearch";
pub const KEY_LINK_FORMAT: &str = "linkFormat";
pub const KEY_START_BREADCRUMB: &str = "startBreadcrumb";

/// Options owned by the options page. Read-only for the search pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root_url: String,
    pub space_key: Option<String>,
    pub default_space: Option<DefaultSpaceMode>,
    pub content_type: ContentType,
    pub limit: u32,
    pub advanced_search: bool,
    pub link_format: Option<String>,
    pub start_breadcrumb: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            space_key: None,
            default_space: None,
            content_type: ContentType::All,
            limit: DEFAULT_LIMIT,
            advanced_search: false,
            link_format: None,
            start_breadcrumb: None,
        }
    }
}

impl Settings {
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let root_url = read_string(store, KEY_ROOT_URL).await?.unwrap_or_default();
        let space_key = read_string(store, KEY_SPACE_KEY)
            .await?
            .filter(|key| !key.trim().is_empty());
        let default_space = read_string(store, KEY_DEFAULT_SPACE)
            .await?
            .and_then(|raw| DefaultSpaceMode::parse(&raw));
        let content_type = read_string(store, KEY_TYPE)
            .await?
            .map(|raw| ContentType::parse(&raw))
            .unwrap_or_default();
        let limit = store
            .get(KEY_LIMIT)
            .await?
            .and_then(|v| value_as_u32(&v))
            .unwrap_or(DEFAULT_LIMIT);
        let advanced_search = store
            .get(KEY_ADVANCED_SEARCH)
            .await?
            .map(|v| value_as_bool(&v))
            .unwrap_or(false);

        Ok(Self {
            root_url,
            space_key,
            default_space,
            content_type,
            limit,
            advanced_search,
            link_format: read_string(store, KEY_LINK_FORMAT).await?,
            start_breadcrumb: read_string(store, KEY_START_BREADCRUMB).await?,
        })
    }

    /// Writes every field back the way the options page stores them.
    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store
            .set(KEY_ROOT_URL, Value::String(self.root_url.clone()))
            .await?;
        store
            .set(
                KEY_SPACE_KEY,
                Value::String(self.space_key.clone().unwrap_or_default()),
            )
            .await?;
        store
            .set(
                KEY_DEFAULT_SPACE,
                Value::String(
                    self.default_space
                        .map(DefaultSpaceMode::as_str)
                        .unwrap_or_default()
                        .to_string(),
                ),
            )
            .await?;
        store
            .set(KEY_TYPE, Value::String(self.content_type.as_str().to_string()))
            .await?;
        store
            .set(KEY_LIMIT, Value::String(self.limit.to_string()))
            .await?;
        store
            .set(
                KEY_ADVANCED_SEARCH,
                Value::String(self.advanced_search.to_string()),
            )
            .await?;
        if let Some(format) = &self.link_format {
            store
                .set(KEY_LINK_FORMAT, Value::String(format.clone()))
                .await?;
        }
        if let Some(breadcrumb) = &self.start_breadcrumb {
            store
                .set(KEY_START_BREADCRUMB, Value::String(breadcrumb.clone()))
                .await?;
        }
        Ok(())
    }
}

async fn read_string(store: &dyn KeyValueStore, key: &str) -> Result<Option<String>, StoreError> {
    Ok(store.get(key).await?.and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Canonical Confluence root URL as the options page stores it.
///
/// `acme` becomes `https://acme.atlassian.net/wiki`; server URLs keep their path.
pub fn normalize_root_url(input: &str) -> Result<String, String> {
    let mut url = input.trim().trim_end_matches('/').to_string();
    if url.is_empty() {
        return Err("Confluence root URL is required.".to_string());
    }
    if !url.contains('.') {
        url.push_str(".atlassian.net");
    }
    if !url.starts_with("http") {
        url = format!("https://{url}");
    }
    if url.ends_with(".atlassian.net") {
        url.push_str("/wiki");
    }
    url::Url::parse(&url).map_err(|e| format!("Invalid root URL '{url}': {e}"))?;
    Ok(url)
}

pub fn validate_limit(value: u32) -> Result<(), String> {
    if (1..=MAX_LIMIT).contains(&value) {
        Ok(())
    } else {
        Err(format!("Limit must be between 1 and {MAX_LIMIT}."))
    }
}

/// Uppercases and trims a comma-separated list of space keys.
pub fn normalize_space_keys(input: &str) -> Option<String> {
    let keys: Vec<String> = input
        .split(',')
        .map(|key| key.trim().to_uppercase())
        .filter(|key| !key.is_empty())
        .collect();
    if keys.is_empty() {
        None
    } else {
        Some(keys.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_root_url, normalize_space_keys, validate_limit};

    #[test]
    fn expands_bare_cloud_subdomain() {
        assert_eq!(
            normalize_root_url("acme").unwrap(),
            "https://acme.atlassian.net/wiki"
        );
        assert_eq!(
            normalize_root_url("acme.atlassian.net/").unwrap(),
            "https://acme.atlassian.net/wiki"
        );
    }

    #[test]
    fn keeps_server_urls() {
        assert_eq!(
            normalize_root_url("http://confluence.corp.local/").unwrap(),
            "http://confluence.corp.local"
        );
    }

    #[test]
    fn rejects_empty_root_url() {
        assert!(normalize_root_url("  ").is_err());
    }

    #[test]
    fn limit_bounds() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(100).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(101).is_err());
    }

    #[test]
    fn space_keys_are_uppercased() {
        assert_eq!(normalize_space_keys(" eng, ops ").as_deref(), Some("ENG,OPS"));
        assert_eq!(normalize_space_keys(" , "), None);
    }
}
