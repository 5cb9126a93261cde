//! `Link` header pagination.
//!
//! GitHub paginates list endpoints with a `Link` response header. The fetch
//! loop in [`super::GitHubClient::get_paginated`] keeps requesting pages for as
//! long as the header advertises a `rel="next"` relation.

use reqwest::Url;

/// Fixed page size requested from every list endpoint.
pub const PAGE_SIZE: u32 = 100;

/// Pagination information extracted from GitHub's Link header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// Whether a `rel="next"` relation was present at all.
    pub has_next: bool,
    /// The next page number (from rel="next" link), when the URL carries one.
    pub next_page: Option<u32>,
    /// The last page number (from rel="last" link).
    pub last_page: Option<u32>,
}

impl LinkPagination {
    /// Returns the total number of pages if known.
    pub fn total_pages(&self) -> Option<u32> {
        self.last_page
    }
}

/// Parse the Link header to extract pagination info.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/repositories/1/issues?per_page=100&page=2>; rel="next", <...&page=3>; rel="last"`
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rels: Vec<&str> = Vec::new();

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                // A single link may carry several space separated relations.
                rels.extend(rel_value.trim_matches('"').split_whitespace());
            }
        }

        let page_num = url.and_then(extract_page_from_url);
        for rel in rels {
            match rel {
                "next" => {
                    info.has_next = true;
                    info.next_page = page_num;
                }
                "last" => info.last_page = page_num,
                _ => {}
            }
        }
    }

    info
}

/// Extract the page parameter from a URL.
fn extract_page_from_url(url: &str) -> Option<u32> {
    let query_start = url.find('?')?;
    let query = &url[query_start + 1..];

    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }

    None
}

/// Build the URL for one page: the caller's query parameters followed by
/// `per_page` and `page`.
pub(crate) fn page_url(base: &Url, params: &[(&str, &str)], page: u32) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in params {
            if *key != "per_page" && *key != "page" {
                query.append_pair(key, value);
            }
        }
        query.append_pair("per_page", &PAGE_SIZE.to_string());
        query.append_pair("page", &page.to_string());
    }
    url
}
