use serde::{Deserialize, Serialize};

use crate::browser::BrowserError;
use crate::cql::{compile_parsed, CqlStyle};
use crate::query_dsl::{ParsedQuery, Surface};
use crate::settings::Settings;
use crate::space_resolver::{ResolvedSpace, SpaceResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEndpoint {
    Api,
    Site,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub url: String,
    pub cql: String,
    pub endpoint: SearchEndpoint,
    pub limit: u32,
    pub quick_open: bool,
    pub space: ResolvedSpace,
}

pub fn api_search_url(root_url: &str, cql: &str, limit: u32) -> String {
    format!("{root_url}/rest/api/content/search?cql={cql}&limit={limit}")
}

pub fn site_search_url(root_url: &str, cql: &str) -> String {
    format!("{root_url}/dosearchsite.action?cql={cql}")
}

pub struct SearchUrlBuilder<'a> {
    settings: &'a Settings,
    resolver: &'a SpaceResolver<'a>,
}

impl<'a> SearchUrlBuilder<'a> {
    pub fn new(settings: &'a Settings, resolver: &'a SpaceResolver<'a>) -> Self {
        Self { settings, resolver }
    }

    /// `o` forces a single result on the API endpoint; otherwise advanced mode goes to site search.
    pub async fn build(&self, raw_query: &str) -> Result<SearchPlan, BrowserError> {
        let parsed = ParsedQuery::parse(raw_query, Surface::Popup);
        let endpoint = if self.settings.advanced_search && !parsed.quick_open {
            SearchEndpoint::Site
        } else {
            SearchEndpoint::Api
        };
        self.build_parsed(&parsed, endpoint).await
    }

    pub async fn api_url(&self, raw_query: &str) -> Result<SearchPlan, BrowserError> {
        let parsed = ParsedQuery::parse(raw_query, Surface::Popup);
        self.build_parsed(&parsed, SearchEndpoint::Api).await
    }

    pub async fn site_url(&self, raw_query: &str) -> Result<SearchPlan, BrowserError> {
        let parsed = ParsedQuery::parse(raw_query, Surface::Popup);
        self.build_parsed(&parsed, SearchEndpoint::Site).await
    }

    pub async fn build_parsed(
        &self,
        parsed: &ParsedQuery,
        endpoint: SearchEndpoint,
    ) -> Result<SearchPlan, BrowserError> {
        let limit = if parsed.quick_open {
            1
        } else {
            self.settings.limit
        };
        let space = self.resolver.resolve_flag(parsed.space_flag.as_ref()).await?;
        let root_url = self.settings.root_url.as_str();

        let (cql, url) = match endpoint {
            SearchEndpoint::Api => {
                let cql = compile_parsed(
                    parsed,
                    space.key.as_deref(),
                    &self.settings.content_type,
                    CqlStyle::Rest,
                );
                let url = api_search_url(root_url, &cql, limit);
                (cql, url)
            }
            SearchEndpoint::Site => {
                let cql = compile_parsed(
                    parsed,
                    space.key.as_deref(),
                    &self.settings.content_type,
                    CqlStyle::Web,
                );
                let url = site_search_url(root_url, &cql);
                (cql, url)
            }
        };
        log::debug!("search url: {url}");

        Ok(SearchPlan {
            url,
            cql,
            endpoint,
            limit,
            quick_open: parsed.quick_open,
            space,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLinks {
    #[serde(default)]
    pub webui: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "_links", default)]
    pub links: ContentLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(rename = "_links", default)]
    pub links: PageLinks,
    #[serde(rename = "totalSize", default)]
    pub total_size: u64,
}

impl SearchResponse {
    pub fn next_url(&self) -> Option<String> {
        self.links
            .next
            .as_ref()
            .map(|next| format!("{}{next}", self.links.base))
    }

    pub fn prev_url(&self) -> Option<String> {
        self.links
            .prev
            .as_ref()
            .map(|prev| format!("{}{prev}", self.links.base))
    }

    pub fn quick_open_url(&self, root_url: &str) -> Option<String> {
        match self.results.as_slice() {
            [only] => Some(format!("{root_url}{}", only.links.webui)),
            _ => None,
        }
    }

    /// `"<first>-<last> of <total> items:"` for the page requested with `request_url`.
    pub fn range_message(&self, request_url: &str) -> String {
        let start = start_param(request_url).map(|s| s + 1).unwrap_or(1);
        let end = (start + self.results.len() as u64).saturating_sub(1);
        format!("{start}-{end} of {} items:", self.total_size)
    }

    pub fn result_links(&self, root_url: &str) -> Vec<ResultLink> {
        self.results
            .iter()
            .map(|result| ResultLink {
                title: result.title.clone(),
                url: format!("{root_url}{}", result.links.webui),
                space_key: None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLink {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsPage {
    pub range_message: String,
    /// Set when exactly one result came back; the page opens directly.
    pub quick_open_url: Option<String>,
    pub next_url: Option<String>,
    pub prev_url: Option<String>,
    pub results: Vec<ResultLink>,
}

impl ResultsPage {
    pub fn new(response: &SearchResponse, request_url: &str, root_url: &str) -> Self {
        Self {
            range_message: response.range_message(request_url),
            quick_open_url: response.quick_open_url(root_url),
            next_url: response.next_url(),
            prev_url: response.prev_url(),
            results: response.result_links(root_url),
        }
    }
}

/// Results of a request without a single-space clause can come from any space.
pub fn spans_several_spaces(request_url: &str) -> bool {
    !request_url.contains(" AND space=")
}

fn start_param(url: &str) -> Option<u64> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "start")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        api_search_url, site_search_url, spans_several_spaces, ResultsPage, SearchResponse,
    };

    #[test]
    fn endpoint_shapes() {
        assert_eq!(
            api_search_url("https://w", "type=page", 10),
            "https://w/rest/api/content/search?cql=type=page&limit=10"
        );
        assert_eq!(
            site_search_url("https://w", "type=page"),
            "https://w/dosearchsite.action?cql=type=page"
        );
    }

    #[test]
    fn response_pagination() {
        let response: SearchResponse = serde_json::from_value(json!({
            "results": [
                {"id": "1", "title": "A", "_links": {"webui": "/display/ENG/A"}},
                {"id": "2", "title": "B", "_links": {"webui": "/display/ENG/B"}}
            ],
            "_links": {"base": "https://w", "next": "/rest/api/content/search?cql=x&start=12"},
            "totalSize": 42
        }))
        .unwrap();

        assert_eq!(
            response.next_url().as_deref(),
            Some("https://w/rest/api/content/search?cql=x&start=12")
        );
        assert_eq!(response.prev_url(), None);
        assert_eq!(response.quick_open_url("https://w"), None);
        assert_eq!(
            response.range_message("https://w/rest/api/content/search?cql=x&limit=2&start=10"),
            "11-12 of 42 items:"
        );
        assert_eq!(
            response.range_message("https://w/rest/api/content/search?cql=x"),
            "1-2 of 42 items:"
        );
    }

    #[test]
    fn single_result_quick_opens() {
        let response: SearchResponse = serde_json::from_value(json!({
            "results": [{"title": "Only", "_links": {"webui": "/display/ENG/Only"}}],
            "_links": {"base": "https://w"},
            "totalSize": 1
        }))
        .unwrap();
        assert_eq!(
            response.quick_open_url("https://w").as_deref(),
            Some("https://w/display/ENG/Only")
        );
    }

    #[test]
    fn results_page_links_each_hit() {
        let response: SearchResponse = serde_json::from_value(json!({
            "results": [
                {"title": "A", "_links": {"webui": "/display/ENG/A"}},
                {"title": "B", "_links": {"webui": "/display/OPS/B"}}
            ],
            "_links": {"base": "https://w", "prev": "/rest/api/content/search?cql=x&start=0"},
            "totalSize": 4
        }))
        .unwrap();
        let url = "https://w/rest/api/content/search?cql=x&limit=2&start=2";

        let page = ResultsPage::new(&response, url, "https://w");
        assert_eq!(page.range_message, "3-4 of 4 items:");
        assert_eq!(page.quick_open_url, None);
        assert_eq!(page.next_url, None);
        assert_eq!(
            page.prev_url.as_deref(),
            Some("https://w/rest/api/content/search?cql=x&start=0")
        );
        assert_eq!(page.results[1].url, "https://w/display/OPS/B");
        assert!(spans_several_spaces(url));
        assert!(!spans_several_spaces("https://w/rest/api/content/search?cql=type=page AND space=ENG&limit=2"));
    }
}
