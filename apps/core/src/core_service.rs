use std::sync::Arc;

use serde_json::Value;

use crate::browser::{BrowserError, HttpFetch, NotificationSink, TabEnumerator};
use crate::contract::{
    CoreRequest, CoreResponse, CqlResponse, LabelsResponse, MutationResponse, OmniboxResponse,
    QueryRequest, SearchResponseDto, SpaceResponse,
};
use crate::cql::{compile_parsed, CqlStyle};
use crate::label_dictionary::LabelDictionaryStore;
use crate::omnibox::{self, OmniboxAction};
use crate::query_dsl::{ParsedQuery, Surface};
use crate::search_url::{
    spans_several_spaces, ResultsPage, SearchEndpoint, SearchPlan, SearchResponse,
    SearchUrlBuilder,
};
use crate::settings::Settings;
use crate::space_resolver::{ResolvedSpace, SpaceResolver};
use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
    #[error("Set Confluence rooturl in the Options!")]
    MissingRootUrl,
    #[error("space key not found")]
    SpaceKeyNotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Entry point for every surface. Holds the collaborators only; settings are read
/// fresh for each request and nothing is cached between requests.
#[derive(Clone)]
pub struct CoreService {
    store: Arc<dyn KeyValueStore>,
    tabs: Arc<dyn TabEnumerator>,
    http: Arc<dyn HttpFetch>,
    notifier: Arc<dyn NotificationSink>,
}

impl CoreService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        tabs: Arc<dyn TabEnumerator>,
        http: Arc<dyn HttpFetch>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            tabs,
            http,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn labels(&self) -> LabelDictionaryStore {
        LabelDictionaryStore::new(self.store.clone())
    }

    pub async fn settings(&self) -> Result<Settings, ServiceError> {
        Ok(Settings::load(self.store.as_ref()).await?)
    }

    async fn configured_settings(&self) -> Result<Settings, ServiceError> {
        let settings = self.settings().await?;
        if settings.root_url.is_empty() {
            return Err(ServiceError::MissingRootUrl);
        }
        Ok(settings)
    }

    fn resolver<'a>(&'a self, settings: &'a Settings) -> SpaceResolver<'a> {
        SpaceResolver::new(settings, self.tabs.as_ref(), self.http.as_ref())
    }

    /// Full popup pipeline: expand label shortcuts, resolve the space, compile, build.
    pub async fn search(&self, raw_query: &str) -> Result<SearchPlan, ServiceError> {
        let settings = self.configured_settings().await?;
        let query = self.labels().expand(raw_query).await;
        let resolver = self.resolver(&settings);
        let builder = SearchUrlBuilder::new(&settings, &resolver);
        Ok(builder.build(&query).await?)
    }

    pub async fn api_search(&self, raw_query: &str) -> Result<SearchPlan, ServiceError> {
        let settings = self.configured_settings().await?;
        let query = self.labels().expand(raw_query).await;
        let resolver = self.resolver(&settings);
        let builder = SearchUrlBuilder::new(&settings, &resolver);
        Ok(builder.api_url(&query).await?)
    }

    pub async fn site_search(&self, raw_query: &str) -> Result<SearchPlan, ServiceError> {
        let settings = self.configured_settings().await?;
        let query = self.labels().expand(raw_query).await;
        let resolver = self.resolver(&settings);
        let builder = SearchUrlBuilder::new(&settings, &resolver);
        Ok(builder.site_url(&query).await?)
    }

    pub async fn search_with(
        &self,
        raw_query: &str,
        endpoint: Option<SearchEndpoint>,
    ) -> Result<SearchPlan, ServiceError> {
        match endpoint {
            None => self.search(raw_query).await,
            Some(SearchEndpoint::Api) => self.api_search(raw_query).await,
            Some(SearchEndpoint::Site) => self.site_search(raw_query).await,
        }
    }

    /// Turns a `content/search` body fetched from `request_url` into a results page.
    /// Hits of a search across several spaces get their space key looked up.
    pub async fn read_results(
        &self,
        request_url: &str,
        body: Value,
    ) -> Result<ResultsPage, ServiceError> {
        let settings = self.configured_settings().await?;
        let response: SearchResponse = serde_json::from_value(body)
            .map_err(|e| ServiceError::InvalidRequest(format!("search response: {e}")))?;
        let mut page = ResultsPage::new(&response, request_url, &settings.root_url);

        if page.quick_open_url.is_none() && spans_several_spaces(request_url) {
            let resolver = self.resolver(&settings);
            for result in &mut page.results {
                result.space_key = resolver.space_key_from_url(&result.url).await;
            }
        }
        Ok(page)
    }

    pub async fn cql(&self, raw_query: &str, style: CqlStyle) -> Result<String, ServiceError> {
        let settings = self.settings().await?;
        let query = self.labels().expand(raw_query).await;
        let parsed = ParsedQuery::parse(&query, Surface::Popup);
        let space = self
            .resolver(&settings)
            .resolve_flag(parsed.space_flag.as_ref())
            .await?;
        Ok(compile_parsed(
            &parsed,
            space.key.as_deref(),
            &settings.content_type,
            style,
        ))
    }

    pub async fn resolve_space(&self, raw_query: &str) -> Result<ResolvedSpace, ServiceError> {
        let settings = self.settings().await?;
        Ok(self.resolver(&settings).resolve_space_key(raw_query).await?)
    }

    pub async fn single_space_key(&self, raw_query: &str) -> Result<String, ServiceError> {
        let settings = self.settings().await?;
        self.resolver(&settings)
            .single_space_key(raw_query, self.notifier.as_ref())
            .await?
            .ok_or(ServiceError::SpaceKeyNotFound)
    }

    pub async fn omnibox(&self, raw_query: &str) -> Result<OmniboxAction, ServiceError> {
        let settings = self.configured_settings().await?;
        let query = self.labels().expand(raw_query).await;
        let resolver = self.resolver(&settings);
        let builder = SearchUrlBuilder::new(&settings, &resolver);
        Ok(omnibox::dispatch(
            &query,
            &settings.root_url,
            &resolver,
            &builder,
            self.notifier.as_ref(),
        )
        .await?)
    }

    pub async fn handle_command(&self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Search(req) => {
                let plan = self.search_with(&req.query, req.endpoint).await?;
                Ok(CoreResponse::Search(SearchResponseDto::from(plan)))
            }
            CoreRequest::Results(req) => Ok(CoreResponse::Results(
                self.read_results(&req.request_url, req.body).await?,
            )),
            CoreRequest::Cql(req) => {
                let style = if req.web { CqlStyle::Web } else { CqlStyle::Rest };
                let cql = self.cql(&req.query, style).await?;
                Ok(CoreResponse::Cql(CqlResponse { cql }))
            }
            CoreRequest::ResolveSpace(req) => {
                let space = self.resolve_space(&req.query).await?;
                Ok(CoreResponse::ResolveSpace(SpaceResponse {
                    status: space.status_text(),
                    space_key: space.key,
                }))
            }
            CoreRequest::Omnibox(req) => {
                let action = self.omnibox(&req.query).await?;
                Ok(CoreResponse::Omnibox(OmniboxResponse::from(action)))
            }
            CoreRequest::ExpandLabels(req) => {
                let query = self.labels().expand(&req.query).await;
                Ok(CoreResponse::ExpandLabels(QueryRequest { query }))
            }
            CoreRequest::ListLabels => Ok(CoreResponse::Labels(LabelsResponse {
                labels: self.labels().get().await,
            })),
            CoreRequest::AddLabel(req) => {
                if req.label.trim().is_empty() {
                    return Err(ServiceError::InvalidRequest(
                        "label must not be empty".to_string(),
                    ));
                }
                let saved = self
                    .labels()
                    .add(req.shortcut.as_deref().unwrap_or_default(), req.label.trim())
                    .await;
                Ok(CoreResponse::Mutation(MutationResponse { saved }))
            }
            CoreRequest::RemoveLabel(req) => {
                let saved = self
                    .labels()
                    .remove(&req.label, req.shortcut.as_deref())
                    .await;
                Ok(CoreResponse::Mutation(MutationResponse { saved }))
            }
            CoreRequest::ClearLabels => Ok(CoreResponse::Mutation(MutationResponse {
                saved: self.labels().clear().await,
            })),
        }
    }
}
