//! GitHub REST client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::error::GitHubError;
use super::pagination::{LinkPagination, page_url, parse_link_header};
use super::types::{GitHubErrorBody, GitHubUser};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport, header_get};
use crate::progress::{FetchProgress, ProgressCallback, emit};

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default transport timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = "repostats";

/// Rate limit state reported by a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitInfo {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Status, final URL and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub url: String,
    pub headers: HttpHeaders,
}

impl ResponseMeta {
    fn from_response(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            url: response.url.clone(),
            headers: response.headers.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    /// Pagination relations from the `Link` header (empty when absent).
    pub fn link(&self) -> LinkPagination {
        self.header("link")
            .map(parse_link_header)
            .unwrap_or_default()
    }

    /// Extract rate limit info from GitHub response headers.
    pub fn rate_limit(&self) -> Option<RateLimitInfo> {
        let limit = self.header("x-ratelimit-limit")?.parse::<u32>().ok()?;
        let remaining = self.header("x-ratelimit-remaining")?.parse::<u32>().ok()?;
        let reset_epoch = self.header("x-ratelimit-reset")?.parse::<i64>().ok()?;
        let reset_at = DateTime::from_timestamp(reset_epoch, 0).unwrap_or_else(Utc::now);
        Some(RateLimitInfo {
            limit,
            remaining,
            reset_at,
        })
    }
}

/// A single response whose status has not been checked yet.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub meta: ResponseMeta,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GitHubError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Result of a paginated fetch: every item in page order plus the metadata of
/// the last page.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: ResponseMeta,
    pub pages: u32,
}

/// GitHub API client.
///
/// Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: Option<String>,
    max_pages: Option<u32>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use repostats::github::{DEFAULT_API_URL, DEFAULT_TIMEOUT, GitHubClient};
    ///
    /// let client = GitHubClient::new(DEFAULT_API_URL, Some("ghp_xxx"), DEFAULT_TIMEOUT)?;
    /// # Ok::<(), repostats::github::GitHubError>(())
    /// ```
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout: StdDuration,
    ) -> Result<Self, GitHubError> {
        let transport = ReqwestTransport::with_timeout(timeout)?;
        Ok(Self::new_with_transport(base_url, token, Arc::new(transport)))
    }

    pub fn new_with_transport(
        base_url: &str,
        token: Option<&str>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
            max_pages: None,
        }
    }

    /// Stop paginated fetches after `limit` pages. `None` or `Some(0)` removes
    /// the limit.
    #[must_use]
    pub fn with_max_pages(mut self, limit: Option<u32>) -> Self {
        self.max_pages = limit.filter(|&n| n > 0);
        self
    }

    /// Replace the bearer token used for every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.filter(|t| !t.is_empty()).map(str::to_string);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn max_pages(&self) -> Option<u32> {
        self.max_pages
    }

    fn url(&self, path: &str) -> Result<Url, GitHubError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| GitHubError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn send(
        &self,
        url: &str,
        token: Option<&str>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpResponse, GitHubError> {
        let mut headers: HttpHeaders = vec![
            ("Accept".to_string(), ACCEPT.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        for (name, value) in extra_headers {
            headers.push(((*name).to_string(), (*value).to_string()));
        }

        let request = HttpRequest {
            url: url.to_string(),
            headers,
        };
        Ok(self.transport.send(request).await?)
    }

    /// Make one GET request and return the response without checking its
    /// status.
    pub async fn get_response(&self, path: &str) -> Result<RawResponse, GitHubError> {
        let url = self.url(path)?;
        let response = self.send(url.as_str(), self.token(), &[]).await?;
        let meta = ResponseMeta::from_response(&response);
        tracing::debug!(path, status = meta.status, "GET");
        Ok(RawResponse {
            meta,
            body: response.body,
        })
    }

    /// Make one GET request and decode a successful JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let response = self.get_response(path).await?;
        if !response.meta.is_success() {
            return Err(status_error(path, &response.meta, &response.body));
        }
        response.json()
    }

    /// Fetch every page of a list endpoint.
    ///
    /// Pages are requested one after another starting at 1 with
    /// `per_page=100`; the loop stops when a response no longer advertises a
    /// `rel="next"` link.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Paginated<T>, GitHubError> {
        self.get_paginated_with_headers(path, params, &[], on_progress)
            .await
    }

    /// [`get_paginated`](Self::get_paginated) with extra request headers.
    pub async fn get_paginated_with_headers<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        extra_headers: &[(&str, &str)],
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Paginated<T>, GitHubError> {
        let base = self.url(path)?;
        let mut items: Vec<T> = Vec::new();
        let mut page: u32 = 1;

        loop {
            emit(
                on_progress,
                FetchProgress::FetchingPage {
                    resource: path.to_string(),
                    page,
                },
            );

            let url = page_url(&base, params, page);
            let response = self.send(url.as_str(), self.token(), extra_headers).await?;
            let meta = ResponseMeta::from_response(&response);
            if !meta.is_success() {
                return Err(status_error(path, &meta, &response.body));
            }

            let batch: Vec<T> = serde_json::from_slice(&response.body)?;
            let count = batch.len();
            items.extend(batch);

            let link = meta.link();
            tracing::debug!(
                path,
                page,
                count,
                total = items.len(),
                has_next = link.has_next,
                "Fetched page"
            );
            emit(
                on_progress,
                FetchProgress::FetchedPage {
                    resource: path.to_string(),
                    page,
                    count,
                    total_so_far: items.len(),
                    expected_pages: link.total_pages(),
                },
            );

            if !link.has_next {
                emit(
                    on_progress,
                    FetchProgress::FetchComplete {
                        resource: path.to_string(),
                        total: items.len(),
                        pages: page,
                    },
                );
                return Ok(Paginated {
                    items,
                    meta,
                    pages: page,
                });
            }

            if let Some(limit) = self.max_pages
                && page >= limit
            {
                tracing::warn!(path, limit, "Server still advertises more pages; giving up");
                return Err(GitHubError::PageLimit {
                    resource: path.to_string(),
                    limit,
                });
            }

            page += 1;
        }
    }

    /// Look up the user a token belongs to (`GET /user`).
    ///
    /// Uses `token` rather than the client's own token so a candidate token
    /// can be checked before it is stored.
    pub async fn authenticated_user(&self, token: &str) -> Result<GitHubUser, GitHubError> {
        let path = "/user";
        let url = self.url(path)?;
        let response = self.send(url.as_str(), Some(token), &[]).await?;
        let meta = ResponseMeta::from_response(&response);
        if !meta.is_success() {
            return Err(status_error(path, &meta, &response.body));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Map a non-success response to an error.
fn status_error(resource: &str, meta: &ResponseMeta, body: &[u8]) -> GitHubError {
    let message = serde_json::from_slice::<GitHubErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).to_string());

    match meta.status {
        401 => GitHubError::Unauthorized { message },
        404 => GitHubError::NotFound {
            resource: resource.to_string(),
        },
        status @ (403 | 429) => match meta.rate_limit() {
            Some(info) if info.is_exhausted() => GitHubError::RateLimited {
                status,
                reset_at: info.reset_at,
            },
            _ => GitHubError::Status { status, message },
        },
        status => GitHubError::Status { status, message },
    }
}
