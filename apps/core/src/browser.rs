use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::BrowserTab;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("failed to enumerate tabs: {0}")]
    Tabs(String),
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response body from {0}")]
    Body(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait TabEnumerator: Send + Sync {
    async fn query_all_tabs(&self) -> Result<Vec<BrowserTab>, BrowserError>;
}

#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// GET `url` with `Accept: application/json`.
    async fn fetch_json(&self, url: &str) -> Result<HttpResponse, BrowserError>;
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

#[derive(Debug, Default, Clone)]
pub struct StaticTabs {
    tabs: Vec<BrowserTab>,
}

impl StaticTabs {
    pub fn new(tabs: Vec<BrowserTab>) -> Self {
        Self { tabs }
    }
}

#[async_trait]
impl TabEnumerator for StaticTabs {
    async fn query_all_tabs(&self) -> Result<Vec<BrowserTab>, BrowserError> {
        Ok(self.tabs.clone())
    }
}

/// Reads a JSON5 list of tabs from disk on every query.
#[derive(Debug, Clone)]
pub struct TabsFile {
    path: PathBuf,
}

impl TabsFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait]
impl TabEnumerator for TabsFile {
    async fn query_all_tabs(&self) -> Result<Vec<BrowserTab>, BrowserError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(BrowserError::Tabs(format!(
                    "{}: {err}",
                    self.path.display()
                )))
            }
        };
        json5::from_str(&raw)
            .map_err(|e| BrowserError::Tabs(format!("{}: {e}", self.path.display())))
    }
}

/// Serves canned JSON bodies keyed by URL; anything else is a 404.
#[derive(Debug, Default)]
pub struct CannedFetch {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl CannedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: &str, body: Value) -> Self {
        self.responses
            .insert(url.to_string(), HttpResponse { status: 200, body });
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(
            url.to_string(),
            HttpResponse {
                status,
                body: Value::Null,
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HttpFetch for CannedFetch {
    async fn fetch_json(&self, url: &str) -> Result<HttpResponse, BrowserError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        Ok(self.responses.get(url).cloned().unwrap_or(HttpResponse {
            status: 404,
            body: Value::Null,
        }))
    }
}

/// Fetcher for processes without network access; every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetch;

#[async_trait]
impl HttpFetch for OfflineFetch {
    async fn fetch_json(&self, url: &str) -> Result<HttpResponse, BrowserError> {
        Err(BrowserError::Network {
            url: url.to_string(),
            message: "network access is disabled".to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        log::warn!("{title}: {message}");
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notes: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<(String, String)> {
        self.notes
            .lock()
            .map(|notes| notes.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        if let Ok(mut notes) = self.notes.lock() {
            notes.push((title.to_string(), message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TabEnumerator, TabsFile};

    #[tokio::test]
    async fn tabs_file_accepts_json5() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabs.json5");
        std::fs::write(
            &path,
            "[{url: 'https://wiki.example.com/display/ENG/Home', lastAccessed: 10}, // trailing\n]",
        )
        .unwrap();

        let tabs = TabsFile::new(&path).query_all_tabs().await.unwrap();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].last_accessed, 10.0);
    }

    #[tokio::test]
    async fn missing_tabs_file_means_no_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let tabs = TabsFile::new(&dir.path().join("absent.json"))
            .query_all_tabs()
            .await
            .unwrap();
        assert!(tabs.is_empty());
    }
}
