//! Omnibox keyword entry: create a page, jump to a space, or search.

use crate::browser::{BrowserError, NotificationSink};
use crate::query_dsl::{ParsedQuery, Surface};
use crate::search_url::{SearchEndpoint, SearchPlan, SearchUrlBuilder};
use crate::space_resolver::SpaceResolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmniboxAction {
    CreatePage { space_key: String, url: String },
    NavigateToSpace { space_key: String, url: String },
    Search(SearchPlan),
    /// A space command without any resolvable space; the user was notified.
    NoSpace,
}

impl OmniboxAction {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::CreatePage { url, .. } | Self::NavigateToSpace { url, .. } => Some(url),
            Self::Search(plan) => Some(&plan.url),
            Self::NoSpace => None,
        }
    }
}

pub fn create_page_url(root_url: &str, space_key: &str) -> String {
    format!("{root_url}/pages/createpage.action?spaceKey={space_key}")
}

pub fn space_home_url(root_url: &str, space_key: &str) -> String {
    format!("{root_url}/display/{space_key}")
}

pub async fn dispatch(
    query: &str,
    root_url: &str,
    resolver: &SpaceResolver<'_>,
    builder: &SearchUrlBuilder<'_>,
    sink: &dyn NotificationSink,
) -> Result<OmniboxAction, BrowserError> {
    let parsed = ParsedQuery::parse(query, Surface::Omnibox);

    if parsed.create_page || parsed.navigate {
        let Some(space_key) = resolver
            .single_space_key_for(parsed.space_flag.as_ref(), sink)
            .await?
        else {
            return Ok(OmniboxAction::NoSpace);
        };
        let action = if parsed.create_page {
            OmniboxAction::CreatePage {
                url: create_page_url(root_url, &space_key),
                space_key,
            }
        } else {
            OmniboxAction::NavigateToSpace {
                url: space_home_url(root_url, &space_key),
                space_key,
            }
        };
        return Ok(action);
    }

    let endpoint = if parsed.quick_open {
        SearchEndpoint::Api
    } else {
        SearchEndpoint::Site
    };
    Ok(OmniboxAction::Search(
        builder.build_parsed(&parsed, endpoint).await?,
    ))
}
