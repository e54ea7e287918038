use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Full label name mapped to the short aliases recorded for it.
pub type LabelDictionary = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrowserTab {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Milliseconds since epoch, as reported by the browser.
    #[serde(default)]
    pub last_accessed: f64,
}

impl BrowserTab {
    pub fn new(url: &str, last_accessed: f64) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            last_accessed,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

/// The `type` option of the extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentType {
    #[default]
    All,
    Page,
    Blogpost,
    PageAndBlogpost,
    Unrecognized(String),
}

impl ContentType {
    pub fn parse(value: &str) -> Self {
        match value {
            "all" => Self::All,
            "page" => Self::Page,
            "blogpost" => Self::Blogpost,
            "page&blogpost" => Self::PageAndBlogpost,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Page => "page",
            Self::Blogpost => "blogpost",
            Self::PageAndBlogpost => "page&blogpost",
            Self::Unrecognized(value) => value,
        }
    }

    /// CQL clause restricting the content type, if any.
    pub fn cql_clause(&self) -> Option<&'static str> {
        match self {
            Self::Page => Some("type=page"),
            Self::Blogpost => Some("type=blogpost"),
            Self::PageAndBlogpost => Some("(type=page OR type=blogpost)"),
            Self::All | Self::Unrecognized(_) => None,
        }
    }
}

/// The `defspace` option: where a query without space flag is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultSpaceMode {
    #[serde(rename = "s")]
    Settings,
    #[serde(rename = "l")]
    LastAccessed,
    #[serde(rename = "g")]
    Global,
}

impl DefaultSpaceMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "s" => Some(Self::Settings),
            "l" => Some(Self::LastAccessed),
            "g" => Some(Self::Global),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "s",
            Self::LastAccessed => "l",
            Self::Global => "g",
        }
    }
}
