use pretty_assertions::assert_eq;

use confluence_crx_core::browser::{CannedFetch, StaticTabs};
use confluence_crx_core::model::{ContentType, DefaultSpaceMode};
use confluence_crx_core::search_url::{SearchEndpoint, SearchUrlBuilder};
use confluence_crx_core::settings::Settings;
use confluence_crx_core::space_resolver::SpaceResolver;

fn settings(advanced_search: bool) -> Settings {
    Settings {
        root_url: "https://acme.atlassian.net/wiki".to_string(),
        space_key: Some("ENG".to_string()),
        default_space: Some(DefaultSpaceMode::Settings),
        content_type: ContentType::Page,
        limit: 10,
        advanced_search,
        ..Default::default()
    }
}

#[tokio::test]
async fn api_url_carries_cql_and_limit() {
    let settings = settings(false);
    let (tabs, http) = (StaticTabs::default(), CannedFetch::new());
    let resolver = SpaceResolver::new(&settings, &tabs, &http);
    let builder = SearchUrlBuilder::new(&settings, &resolver);

    let plan = builder.build("release notes").await.unwrap();
    assert_eq!(plan.endpoint, SearchEndpoint::Api);
    assert_eq!(plan.limit, 10);
    assert_eq!(
        plan.url,
        "https://acme.atlassian.net/wiki/rest/api/content/search?cql=type=page AND siteSearch ~ \"release notes\" AND space=ENG&limit=10"
    );
}

#[tokio::test]
async fn quick_open_limits_to_one_even_in_advanced_mode() {
    let settings = settings(true);
    let (tabs, http) = (StaticTabs::default(), CannedFetch::new());
    let resolver = SpaceResolver::new(&settings, &tabs, &http);
    let builder = SearchUrlBuilder::new(&settings, &resolver);

    let plan = builder.build("onboarding -o -g").await.unwrap();
    assert!(plan.quick_open);
    assert_eq!(plan.limit, 1);
    assert_eq!(plan.endpoint, SearchEndpoint::Api);
    assert!(plan.url.ends_with("&limit=1"));
    assert!(!plan.cql.contains("space"));
}

#[tokio::test]
async fn advanced_mode_uses_site_search() {
    let settings = settings(true);
    let (tabs, http) = (StaticTabs::default(), CannedFetch::new());
    let resolver = SpaceResolver::new(&settings, &tabs, &http);
    let builder = SearchUrlBuilder::new(&settings, &resolver);

    let plan = builder.build("vpn #howto").await.unwrap();
    assert_eq!(plan.endpoint, SearchEndpoint::Site);
    assert_eq!(
        plan.url,
        "https://acme.atlassian.net/wiki/dosearchsite.action?cql=type=page+AND+siteSearch+~+\"vpn\"+AND+space=ENG+AND+label+=+howto"
    );
}
