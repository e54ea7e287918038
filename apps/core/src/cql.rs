// Clause order is fixed: type, site search, space, labels. Each clause carries its
// leading connective, so a query without type clause starts with the connective.

use crate::model::ContentType;
use crate::query_dsl::{ParsedQuery, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CqlStyle {
    /// `/rest/api/content/search`: ` AND `, ` AND label = x`.
    Rest,
    /// `/dosearchsite.action`: `+AND+`, `+AND+label+=+x`.
    Web,
}

impl CqlStyle {
    fn and(self) -> &'static str {
        match self {
            Self::Rest => " AND ",
            Self::Web => "+AND+",
        }
    }

    fn space(self) -> char {
        match self {
            Self::Rest => ' ',
            Self::Web => '+',
        }
    }
}

/// An unrecognized `content_type` emits no type clause, like `all`.
pub fn query_to_cql(
    search: &str,
    space_key: Option<&str>,
    content_type: &ContentType,
    style: CqlStyle,
) -> String {
    let parsed = ParsedQuery::parse(search, Surface::Popup);
    compile_parsed(&parsed, space_key, content_type, style)
}

pub fn compile_parsed(
    parsed: &ParsedQuery,
    space_key: Option<&str>,
    content_type: &ContentType,
    style: CqlStyle,
) -> String {
    let and = style.and();
    let sp = style.space();

    let labels: String = parsed
        .labels
        .iter()
        .map(|tag| format!("{and}label{sp}={sp}{}", tag.replace('&', "%26")))
        .collect();

    if let ContentType::Unrecognized(value) = content_type {
        log::debug!("unrecognized content type '{value}', no type clause");
    }
    let mut cql = content_type.cql_clause().unwrap_or_default().to_string();

    let text = parsed.free_text.trim();
    if !text.is_empty() {
        cql.push_str(&format!("{and}siteSearch{sp}~{sp}\"{text}\""));
    }

    if let Some(space_key) = space_key.filter(|key| !key.trim().is_empty()) {
        let keys: Vec<&str> = space_key.split(',').map(str::trim).collect();
        if keys.len() == 1 {
            cql.push_str(&format!("{and}space={}", keys[0]));
        } else {
            cql.push_str(&format!("{and}space{sp}in{sp}({})", keys.join(",")));
        }
    }

    cql.push_str(&labels);
    log::debug!("cql: {cql}");
    cql
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{query_to_cql, CqlStyle};
    use crate::model::ContentType;

    #[test]
    fn empty_query_with_page_type() {
        assert_eq!(
            query_to_cql("", None, &ContentType::Page, CqlStyle::Rest),
            "type=page"
        );
    }

    #[test]
    fn clause_order_is_type_text_space_labels() {
        assert_eq!(
            query_to_cql(
                "release #howto notes",
                Some("ENG"),
                &ContentType::PageAndBlogpost,
                CqlStyle::Rest
            ),
            "(type=page OR type=blogpost) AND siteSearch ~ \"release notes\" AND space=ENG AND label = howto"
        );
    }

    #[test]
    fn multiple_space_keys_use_in() {
        assert_eq!(
            query_to_cql("x", Some("A, B"), &ContentType::Blogpost, CqlStyle::Rest),
            "type=blogpost AND siteSearch ~ \"x\" AND space in (A,B)"
        );
    }

    #[test]
    fn leftover_space_flags_are_removed() {
        assert_eq!(
            query_to_cql("budget -s FIN -g -l", None, &ContentType::Page, CqlStyle::Rest),
            "type=page AND siteSearch ~ \"budget\""
        );
    }

    #[test]
    fn ampersand_in_label_is_escaped() {
        assert_eq!(
            query_to_cql("#r&d", None, &ContentType::Page, CqlStyle::Rest),
            "type=page AND label = r%26d"
        );
    }

    #[test]
    fn web_style_uses_plus_connectives() {
        assert_eq!(
            query_to_cql("q #a", Some("X,Y"), &ContentType::Page, CqlStyle::Web),
            "type=page+AND+siteSearch+~+\"q\"+AND+space+in+(X,Y)+AND+label+=+a"
        );
    }

    #[test]
    fn unrecognized_type_behaves_like_all() {
        assert_eq!(
            query_to_cql("x", None, &ContentType::parse("comment"), CqlStyle::Rest),
            query_to_cql("x", None, &ContentType::All, CqlStyle::Rest)
        );
    }
}
