// "Last accessed" is best effort: tab timestamps and the page lookup are not read
// atomically, so the answer can lag behind the tab the user is looking at.

use std::sync::OnceLock;

use regex::Regex;

use crate::browser::{BrowserError, HttpFetch, NotificationSink, TabEnumerator};
use crate::model::DefaultSpaceMode;
use crate::query_dsl::{ParsedQuery, SpaceFlag, Surface};
use crate::settings::Settings;

pub const SPACE_NOT_FOUND_TITLE: &str = "Error:Confluence CRX: Space Key Not Found";
pub const SPACE_NOT_FOUND_MESSAGE: &str = "Unable to determine the space key. Please check your input or configuration or if a confluence page is opened.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceSource {
    ExplicitGlobal,
    LastAccessed,
    SettingsFlag,
    Override,
    Default(DefaultSpaceMode),
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpace {
    pub key: Option<String>,
    pub source: SpaceSource,
}

impl ResolvedSpace {
    pub fn status_text(&self) -> String {
        let last = |key: &Option<String>| match key {
            Some(key) => format!("last: {key}"),
            None => "last: none".to_string(),
        };
        match self.source {
            SpaceSource::ExplicitGlobal | SpaceSource::Default(DefaultSpaceMode::Global) => {
                "global".to_string()
            }
            SpaceSource::LastAccessed | SpaceSource::Default(DefaultSpaceMode::LastAccessed) => {
                last(&self.key)
            }
            SpaceSource::SettingsFlag
            | SpaceSource::Override
            | SpaceSource::Default(DefaultSpaceMode::Settings)
            | SpaceSource::Unset => String::new(),
        }
    }
}

pub struct SpaceResolver<'a> {
    settings: &'a Settings,
    tabs: &'a dyn TabEnumerator,
    http: &'a dyn HttpFetch,
}

impl<'a> SpaceResolver<'a> {
    pub fn new(settings: &'a Settings, tabs: &'a dyn TabEnumerator, http: &'a dyn HttpFetch) -> Self {
        Self {
            settings,
            tabs,
            http,
        }
    }

    pub async fn resolve_space_key(&self, query: &str) -> Result<ResolvedSpace, BrowserError> {
        let parsed = ParsedQuery::parse(query, Surface::Popup);
        self.resolve_flag(parsed.space_flag.as_ref()).await
    }

    pub async fn resolve_flag(&self, flag: Option<&SpaceFlag>) -> Result<ResolvedSpace, BrowserError> {
        let resolved = match flag {
            Some(SpaceFlag::Global) => ResolvedSpace {
                key: None,
                source: SpaceSource::ExplicitGlobal,
            },
            Some(SpaceFlag::LastAccessed) => ResolvedSpace {
                key: self.last_accessed_space_key().await?,
                source: SpaceSource::LastAccessed,
            },
            Some(SpaceFlag::Settings) => ResolvedSpace {
                key: self.settings.space_key.clone(),
                source: SpaceSource::SettingsFlag,
            },
            Some(SpaceFlag::Override(key)) => ResolvedSpace {
                key: Some(key.clone()),
                source: SpaceSource::Override,
            },
            None => match self.settings.default_space {
                Some(DefaultSpaceMode::Global) => ResolvedSpace {
                    key: None,
                    source: SpaceSource::Default(DefaultSpaceMode::Global),
                },
                Some(DefaultSpaceMode::LastAccessed) => ResolvedSpace {
                    key: self.last_accessed_space_key().await?,
                    source: SpaceSource::Default(DefaultSpaceMode::LastAccessed),
                },
                Some(DefaultSpaceMode::Settings) => ResolvedSpace {
                    key: self.settings.space_key.clone(),
                    source: SpaceSource::Default(DefaultSpaceMode::Settings),
                },
                None => ResolvedSpace {
                    key: None,
                    source: SpaceSource::Unset,
                },
            },
        };
        log::debug!(
            "resolved space {:?} from {:?}",
            resolved.key,
            resolved.source
        );
        Ok(resolved)
    }

    /// First key of the resolved (or stored) space list. `sink` is notified when there is none.
    pub async fn single_space_key(
        &self,
        query: &str,
        sink: &dyn NotificationSink,
    ) -> Result<Option<String>, BrowserError> {
        let parsed = ParsedQuery::parse(query, Surface::Popup);
        self.single_space_key_for(parsed.space_flag.as_ref(), sink)
            .await
    }

    pub async fn single_space_key_for(
        &self,
        flag: Option<&SpaceFlag>,
        sink: &dyn NotificationSink,
    ) -> Result<Option<String>, BrowserError> {
        let resolved = self.resolve_flag(flag).await?;
        let first = resolved
            .key
            .or_else(|| self.settings.space_key.clone())
            .and_then(|keys| {
                keys.split(',')
                    .next()
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
            });
        if first.is_none() {
            sink.notify(SPACE_NOT_FOUND_TITLE, SPACE_NOT_FOUND_MESSAGE);
        }
        Ok(first)
    }

    pub async fn last_accessed_space_key(&self) -> Result<Option<String>, BrowserError> {
        let root_url = self.settings.root_url.as_str();
        if root_url.is_empty() {
            return Ok(None);
        }

        let tabs = self.tabs.query_all_tabs().await?;
        let latest = tabs
            .iter()
            .filter(|tab| tab.url.starts_with(root_url))
            .max_by(|a, b| {
                a.last_accessed
                    .partial_cmp(&b.last_accessed)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        match latest {
            Some(tab) => Ok(self.space_key_from_url(&tab.url).await),
            None => Ok(None),
        }
    }

    /// Failures are logged and yield `None`.
    pub async fn space_key_from_url(&self, page_url: &str) -> Option<String> {
        match self.try_space_key_from_url(page_url).await {
            Ok(key) => key,
            Err(error) => {
                log::error!("failed to get space key for {page_url}: {error}");
                None
            }
        }
    }

    async fn try_space_key_from_url(&self, page_url: &str) -> Result<Option<String>, BrowserError> {
        let root_url = self.settings.root_url.as_str();
        if root_url.is_empty() || !page_url.starts_with(root_url) {
            return Err(BrowserError::Body(format!(
                "{page_url} does not belong to the Confluence instance"
            )));
        }

        let parsed = url::Url::parse(page_url)
            .map_err(|e| BrowserError::Body(format!("{page_url}: {e}")))?;

        if parsed.path().contains("/display/") {
            if let Some(key) = display_space_key(parsed.path()) {
                return Ok(Some(key));
            }
        }

        let Some(page_id) = parsed.query().and_then(page_id_param) else {
            return Ok(None);
        };

        let api_url = format!("{root_url}/rest/api/content/{page_id}");
        let response = self.http.fetch_json(&api_url).await?;
        if !response.ok() {
            return Err(BrowserError::Status {
                url: api_url,
                status: response.status,
            });
        }
        response
            .body
            .get("space")
            .and_then(|space| space.get("key"))
            .and_then(|key| key.as_str())
            .map(|key| Some(key.to_string()))
            .ok_or(BrowserError::Body(api_url))
    }
}

fn display_space_key(path: &str) -> Option<String> {
    let mut segments = path.split('/');
    segments.find(|segment| *segment == "display")?;
    segments
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn page_id_param(query: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"pageId=(\d+)").expect("page id pattern is valid"));
    pattern
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::{display_space_key, page_id_param, ResolvedSpace, SpaceSource};
    use crate::model::DefaultSpaceMode;

    #[test]
    fn display_segment_yields_key() {
        assert_eq!(
            display_space_key("/wiki/display/ENG/Release+Notes").as_deref(),
            Some("ENG")
        );
        assert_eq!(display_space_key("/display/"), None);
        assert_eq!(display_space_key("/pages/viewpage.action"), None);
    }

    #[test]
    fn page_id_is_numeric() {
        assert_eq!(page_id_param("pageId=12345&x=1").as_deref(), Some("12345"));
        assert_eq!(page_id_param("pageId=abc"), None);
    }

    #[test]
    fn status_text_matches_popup_wording() {
        let last = ResolvedSpace {
            key: Some("ENG".to_string()),
            source: SpaceSource::Default(DefaultSpaceMode::LastAccessed),
        };
        assert_eq!(last.status_text(), "last: ENG");

        let none = ResolvedSpace {
            key: None,
            source: SpaceSource::LastAccessed,
        };
        assert_eq!(none.status_text(), "last: none");

        let global = ResolvedSpace {
            key: None,
            source: SpaceSource::ExplicitGlobal,
        };
        assert_eq!(global.status_text(), "global");
    }
}
