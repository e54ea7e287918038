use serde::{Deserialize, Serialize};

use crate::model::LabelDictionary;
use crate::omnibox::OmniboxAction;
use crate::search_url::{ResultsPage, SearchEndpoint, SearchPlan};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Forces the REST or the site search page; otherwise picked from the options.
    #[serde(default)]
    pub endpoint: Option<SearchEndpoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultsRequest {
    pub request_url: String,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CqlRequest {
    pub query: String,
    /// `+AND+` connectives for the site search page.
    #[serde(default)]
    pub web: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddLabelRequest {
    pub label: String,
    #[serde(default)]
    pub shortcut: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveLabelRequest {
    pub label: String,
    #[serde(default)]
    pub shortcut: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponseDto {
    pub url: String,
    pub cql: String,
    pub endpoint: SearchEndpoint,
    pub limit: u32,
    pub quick_open: bool,
    pub space_key: Option<String>,
    pub space_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CqlResponse {
    pub cql: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpaceResponse {
    pub space_key: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OmniboxKind {
    CreatePage,
    NavigateToSpace,
    Search,
    NoSpace,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OmniboxResponse {
    pub action: OmniboxKind,
    pub url: Option<String>,
    pub space_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelsResponse {
    pub labels: LabelDictionary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationResponse {
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreRequest {
    Search(SearchRequest),
    Results(ResultsRequest),
    Cql(CqlRequest),
    ResolveSpace(QueryRequest),
    Omnibox(QueryRequest),
    ExpandLabels(QueryRequest),
    ListLabels,
    AddLabel(AddLabelRequest),
    RemoveLabel(RemoveLabelRequest),
    ClearLabels,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreResponse {
    Search(SearchResponseDto),
    Results(ResultsPage),
    Cql(CqlResponse),
    ResolveSpace(SpaceResponse),
    Omnibox(OmniboxResponse),
    ExpandLabels(QueryRequest),
    Labels(LabelsResponse),
    Mutation(MutationResponse),
}

impl From<SearchPlan> for SearchResponseDto {
    fn from(value: SearchPlan) -> Self {
        Self {
            space_status: value.space.status_text(),
            url: value.url,
            cql: value.cql,
            endpoint: value.endpoint,
            limit: value.limit,
            quick_open: value.quick_open,
            space_key: value.space.key,
        }
    }
}

impl From<OmniboxAction> for OmniboxResponse {
    fn from(value: OmniboxAction) -> Self {
        match value {
            OmniboxAction::CreatePage { space_key, url } => Self {
                action: OmniboxKind::CreatePage,
                url: Some(url),
                space_key: Some(space_key),
            },
            OmniboxAction::NavigateToSpace { space_key, url } => Self {
                action: OmniboxKind::NavigateToSpace,
                url: Some(url),
                space_key: Some(space_key),
            },
            OmniboxAction::Search(plan) => Self {
                action: OmniboxKind::Search,
                url: Some(plan.url),
                space_key: plan.space.key,
            },
            OmniboxAction::NoSpace => Self {
                action: OmniboxKind::NoSpace,
                url: None,
                space_key: None,
            },
        }
    }
}
