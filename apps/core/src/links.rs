use std::sync::OnceLock;

use regex::Regex;

pub const HINT_CONFLUENCE: &str = "Nice Confluence Page link was copied to the clipboard!";
pub const HINT_NO_PAGE_ID: &str =
    "Link copied to clipboard but failed to find Page ID for the Confluence link!";
pub const HINT_OTHER: &str = "Nice link was copied to the clipboard!";

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("link pattern is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    ConfluencePage,
    ConfluenceWithoutPageId,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NiceLink {
    pub url: String,
    pub text: String,
    pub kind: LinkKind,
}

impl NiceLink {
    pub fn html(&self) -> String {
        html_link(&self.url, &self.text)
    }

    pub fn hint(&self) -> &'static str {
        match self.kind {
            LinkKind::ConfluencePage => HINT_CONFLUENCE,
            LinkKind::ConfluenceWithoutPageId => HINT_NO_PAGE_ID,
            LinkKind::Other => HINT_OTHER,
        }
    }
}

fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

fn is_cloud_origin(origin: &str) -> bool {
    origin.contains("atlassian.net")
}

/// Cloud pages, or pages served from the same origin as `root_url`.
pub fn is_confluence_url(url: &str, root_url: &str) -> bool {
    let Some(origin) = origin_of(url) else {
        return false;
    };
    is_cloud_origin(&origin) || origin_of(root_url).is_some_and(|root| root == origin)
}

pub fn page_id_from_url(url: &str) -> Option<String> {
    static CLOUD: OnceLock<Regex> = OnceLock::new();
    static DRAFT: OnceLock<Regex> = OnceLock::new();
    static PAGE_ID: OnceLock<Regex> = OnceLock::new();

    if url.contains(".atlassian.net") {
        let cloud = pattern(
            &CLOUD,
            r"\.atlassian\.net/wiki/spaces/([^/]*)/pages/(?:edit/|edit-v2/)?([^/?#]+)",
        );
        if let Some(id) = cloud.captures(url).and_then(|caps| caps.get(2)) {
            return Some(id.as_str().to_string());
        }
    }

    [
        pattern(&DRAFT, r"pages/resumedraft\.action\?draftId=(\d+)"),
        pattern(&PAGE_ID, r"pageId=(\d+)"),
    ]
    .iter()
    .find_map(|re| re.captures(url).and_then(|caps| caps.get(1)))
    .map(|m| m.as_str().to_string())
}

pub fn clean_cloud_edit_url(url: &str) -> String {
    url.replacen("/edit-v2/", "/", 1).replacen("/edit/", "/", 1)
}

/// `"Page - Space - Confluence"` becomes `"Page - Space"`.
pub fn strip_instance_suffix(title: &str) -> &str {
    let mut separators = title.match_indices(" - ");
    match (separators.next(), separators.next()) {
        (Some(_), Some((second, _))) => &title[..second],
        _ => title,
    }
}

pub fn view_page_url(root_url: &str, page_id: &str) -> String {
    format!("{root_url}/pages/viewpage.action?pageId={page_id}")
}

pub fn html_link(url: &str, text: &str) -> String {
    format!("<a href=\"{url}\">{text}</a>")
}

/// Link and text for "copy nice link". URLs outside Confluence pass through untouched.
pub fn nice_link(url: &str, title: &str, root_url: &str) -> NiceLink {
    if !is_confluence_url(url, root_url) {
        return NiceLink {
            url: url.to_string(),
            text: title.to_string(),
            kind: LinkKind::Other,
        };
    }

    let text = strip_instance_suffix(title).to_string();
    if origin_of(url).is_some_and(|origin| is_cloud_origin(&origin)) {
        return NiceLink {
            url: clean_cloud_edit_url(url),
            text,
            kind: LinkKind::ConfluencePage,
        };
    }

    match page_id_from_url(url) {
        Some(page_id) => NiceLink {
            url: view_page_url(root_url.trim_end_matches('/'), &page_id),
            text,
            kind: LinkKind::ConfluencePage,
        },
        None => {
            log::info!("page id not found for {url}");
            NiceLink {
                url: url.to_string(),
                text,
                kind: LinkKind::ConfluenceWithoutPageId,
            }
        }
    }
}
