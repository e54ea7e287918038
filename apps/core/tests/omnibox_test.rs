use std::sync::Arc;

use serde_json::json;

use confluence_crx_core::browser::{CannedFetch, RecordingNotifier, StaticTabs};
use confluence_crx_core::core_service::CoreService;
use confluence_crx_core::omnibox::OmniboxAction;
use confluence_crx_core::search_url::SearchEndpoint;
use confluence_crx_core::store::MemoryStore;

fn service(entries: serde_json::Value, sink: Arc<RecordingNotifier>) -> CoreService {
    let entries = entries
        .as_object()
        .cloned()
        .unwrap_or_default()
        .into_iter();
    CoreService::new(
        Arc::new(MemoryStore::with_entries(entries)),
        Arc::new(StaticTabs::default()),
        Arc::new(CannedFetch::new()),
        sink,
    )
}

#[tokio::test]
async fn create_page_in_override_space() {
    let sink = Arc::new(RecordingNotifier::new());
    let service = service(json!({ "rooturl": "https://wiki.example.com" }), sink);

    let action = service.omnibox("c -s ENG").await.unwrap();
    assert_eq!(
        action,
        OmniboxAction::CreatePage {
            space_key: "ENG".to_string(),
            url: "https://wiki.example.com/pages/createpage.action?spaceKey=ENG".to_string(),
        }
    );
}

#[tokio::test]
async fn navigate_uses_first_stored_key() {
    let sink = Arc::new(RecordingNotifier::new());
    let service = service(
        json!({ "rooturl": "https://wiki.example.com", "spacekey": "OPS,ENG", "defspace": "s" }),
        sink,
    );

    let action = service.omnibox("n").await.unwrap();
    assert_eq!(action.url(), Some("https://wiki.example.com/display/OPS"));
}

#[tokio::test]
async fn space_command_without_space_notifies() {
    let sink = Arc::new(RecordingNotifier::new());
    let service = service(json!({ "rooturl": "https://wiki.example.com" }), sink.clone());

    assert_eq!(service.omnibox("c -g").await.unwrap(), OmniboxAction::NoSpace);
    assert_eq!(sink.notes().len(), 1);
}

#[tokio::test]
async fn plain_text_goes_to_site_search_and_o_to_api() {
    let sink = Arc::new(RecordingNotifier::new());
    let service = service(json!({ "rooturl": "https://wiki.example.com" }), sink);

    match service.omnibox("vpn setup").await.unwrap() {
        OmniboxAction::Search(plan) => {
            assert_eq!(plan.endpoint, SearchEndpoint::Site);
            assert!(plan.url.contains("siteSearch+~+\"vpn setup\""));
        }
        other => panic!("expected search, got {other:?}"),
    }

    match service.omnibox("vpn o").await.unwrap() {
        OmniboxAction::Search(plan) => {
            assert_eq!(plan.endpoint, SearchEndpoint::Api);
            assert_eq!(plan.limit, 1);
        }
        other => panic!("expected search, got {other:?}"),
    }
}
