//! LessWrong / Alignment Forum fetcher.
//!
//! Both sites sit behind aggressive bot protection but expose the same
//! GraphQL API, so posts are fetched through the API instead of scraping.
//!
//! Lookup goes by slug first. When the slug query returns no post and the
//! URL also carried a post id, the id is tried once before giving up.

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;
use crate::types::content::FetchedContent;

const USER_AGENT: &str = "capture-pipeline/1.0 (personal knowledge management)";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hosts served by the forum API, with their GraphQL endpoints.
const FORUM_ENDPOINTS: [(&str, &str); 4] = [
    ("lesswrong.com", "https://www.lesswrong.com/graphql"),
    ("www.lesswrong.com", "https://www.lesswrong.com/graphql"),
    ("alignmentforum.org", "https://www.alignmentforum.org/graphql"),
    ("www.alignmentforum.org", "https://www.alignmentforum.org/graphql"),
];

const POST_FIELDS: &str = "_id title slug htmlBody contents { html } user { displayName } postedAt baseScore commentCount";

lazy_static! {
    static ref POSTS_ID_SLUG: Regex =
        Regex::new(r"/posts/([A-Za-z0-9]+)/([A-Za-z0-9_-]+)").expect("valid regex");
    static ref POSTS_ID_ONLY: Regex =
        Regex::new(r"/posts/([A-Za-z0-9]+)/?$").expect("valid regex");
    static ref SEQUENCE_POST: Regex =
        Regex::new(r"/s/[A-Za-z0-9]+/p/([A-Za-z0-9_-]+)").expect("valid regex");
    static ref LEGACY_POST: Regex =
        Regex::new(r"/lw/[A-Za-z0-9]+/([A-Za-z0-9_-]+)").expect("valid regex");
}

/// Lookup keys derived from a post URL. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostKey {
    pub slug: Option<String>,
    pub id: Option<String>,
}

impl PostKey {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none() && self.id.is_none()
    }

    /// Derive keys from a post URL.
    ///
    /// Recognised shapes:
    /// - `/posts/{id}/{slug}`
    /// - `/posts/{id}`
    /// - `/s/{sequence}/p/{slug}`
    /// - `/lw/{code}/{slug}` (old format)
    pub fn from_url(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Self::default();
        };
        let path = parsed.path();

        if let Some(caps) = POSTS_ID_SLUG.captures(path) {
            return Self {
                slug: Some(caps[2].to_string()),
                id: Some(caps[1].to_string()),
            };
        }
        if let Some(caps) = POSTS_ID_ONLY.captures(path) {
            return Self {
                slug: None,
                id: Some(caps[1].to_string()),
            };
        }
        if let Some(caps) = SEQUENCE_POST
            .captures(path)
            .or_else(|| LEGACY_POST.captures(path))
        {
            return Self {
                slug: Some(caps[1].to_string()),
                id: None,
            };
        }

        Self::default()
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PostData>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    post: Option<PostEnvelope>,
}

#[derive(Debug, Deserialize)]
struct PostEnvelope {
    result: Option<Post>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Post {
    title: Option<String>,
    html_body: Option<String>,
    contents: Option<PostContents>,
    user: Option<PostUser>,
    posted_at: Option<String>,
    base_score: Option<f64>,
    comment_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PostContents {
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostUser {
    display_name: Option<String>,
}

impl Post {
    fn html(&self) -> &str {
        self.html_body
            .as_deref()
            .filter(|h| !h.is_empty())
            .or_else(|| self.contents.as_ref().and_then(|c| c.html.as_deref()))
            .unwrap_or("")
    }
}

/// Fetches forum posts through the GraphQL API.
pub struct ForumFetcher {
    client: reqwest::Client,
    endpoint_override: Option<String>,
}

impl ForumFetcher {
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::DownloadFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint_override: None,
        })
    }

    /// Send every query to `endpoint` regardless of host (for tests and mirrors).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    fn host_endpoint(url: &str) -> Option<&'static str> {
        let host = Url::parse(url).ok()?.host_str()?.to_lowercase();
        FORUM_ENDPOINTS
            .iter()
            .find(|(forum_host, _)| *forum_host == host)
            .map(|(_, endpoint)| *endpoint)
    }

    async fn query_post(
        &self,
        endpoint: &str,
        selector_field: &str,
        value: &str,
    ) -> FetchResult<Option<Post>> {
        let query = format!(
            "query getPost($value: String) {{ post(input: {{selector: {{{selector_field}: $value}}}}) {{ result {{ {POST_FIELDS} }} }} }}"
        );

        let response = self
            .client
            .post(endpoint)
            .json(&json!({ "query": query, "variables": { "value": value } }))
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, %status, "GraphQL request failed");
            return Err(FetchError::DownloadFailed(format!("HTTP {}", status)));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| FetchError::DownloadFailed(format!("invalid GraphQL response: {}", e)))?;

        Ok(body.data.and_then(|d| d.post).and_then(|p| p.result))
    }

    /// Markdown with a short metadata header, the way the note expects it.
    fn render(url: &str, post: &Post) -> FetchedContent {
        let title = post.title.clone().unwrap_or_else(|| "Untitled".to_string());
        let author = post
            .user
            .as_ref()
            .and_then(|u| u.display_name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let date = post
            .posted_at
            .as_deref()
            .map(|d| d.get(..10).unwrap_or(d).to_string())
            .filter(|d| !d.is_empty());

        let html = post.html();
        let body = if html.is_empty() {
            String::new()
        } else {
            htmd::convert(html).unwrap_or_default()
        };

        let header = format!(
            "# {title}\n\n**Author:** {author}\n**Date:** {}\n**Score:** {} | **Comments:** {}\n**Source:** {url}\n\n---\n\n",
            date.as_deref().unwrap_or("Unknown"),
            post.base_score.unwrap_or(0.0),
            post.comment_count.unwrap_or(0),
        );

        let mut content = FetchedContent::new(header + body.trim())
            .with_title(title)
            .with_author(author);
        content.date = date;
        content
    }
}

#[async_trait]
impl Fetcher for ForumFetcher {
    fn accepts(&self, url: &str) -> bool {
        Self::host_endpoint(url).is_some()
    }

    async fn fetch(&self, url: &str) -> FetchResult<FetchedContent> {
        let endpoint = match (&self.endpoint_override, Self::host_endpoint(url)) {
            (Some(endpoint), _) => endpoint.as_str(),
            (None, Some(endpoint)) => endpoint,
            (None, None) => return Err(FetchError::NoContent),
        };

        let key = PostKey::from_url(url);
        if key.is_empty() {
            warn!(url = %url, "Could not extract slug or id from forum URL");
            return Err(FetchError::NoContent);
        }

        let post = match (&key.slug, &key.id) {
            (Some(slug), id) => match self.query_post(endpoint, "slug", slug).await? {
                Some(post) => Some(post),
                None => match id {
                    Some(id) => {
                        debug!(url = %url, slug = %slug, id = %id, "Slug lookup empty, retrying by id");
                        self.query_post(endpoint, "_id", id).await?
                    }
                    None => None,
                },
            },
            (None, Some(id)) => self.query_post(endpoint, "_id", id).await?,
            (None, None) => None,
        };

        let Some(post) = post else {
            warn!(url = %url, "No post data returned");
            return Err(FetchError::NoContent);
        };

        Ok(Self::render(url, &post))
    }

    fn name(&self) -> &str {
        "forum"
    }
}
