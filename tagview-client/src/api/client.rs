use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult};
use crate::services::{FavoriteApi, PostSource, SettingsProvider};
use tagview_types::*;

pub const DEFAULT_BASE_URL: &str = "https://e621.net";

/// API client for communicating with the image board
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    proxy_url: Option<String>,
    user_agent: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            proxy_url: None,
            user_agent: format!("tagview/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Route every request through a forwarding proxy
    pub fn set_proxy_url(&mut self, proxy_url: Option<String>) {
        self.proxy_url = proxy_url.filter(|p| !p.trim().is_empty());
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request url for a board path, wrapped by the proxy if one is given
    pub(crate) fn request_url(&self, path: &str, proxy_url: Option<&str>) -> String {
        let target = format!("{}{}", self.base_url, path);
        match proxy_url
            .or(self.proxy_url.as_deref())
            .filter(|p| !p.trim().is_empty())
        {
            Some(proxy) => format!("{}{}", proxy, urlencoding::encode(&target)),
            None => target,
        }
    }

    /// Path and query string for a page of posts
    pub(crate) fn posts_path(query: &PostsQuery, tags: &str, limit: u32) -> String {
        let mut params = vec![format!("limit={}", limit)];

        if !tags.trim().is_empty() {
            params.push(format!("tags={}", urlencoding::encode(tags.trim())));
        }
        if let Some(after) = query.posts_after {
            params.push(format!("page=a{}", after));
        } else if let Some(before) = query.posts_before {
            params.push(format!("page=b{}", before));
        }

        format!("/posts.json?{}", params.join("&"))
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
    }

    /// Helper to turn a non-success status into a typed error
    async fn error_for_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // Prefer the board's JSON message, skip HTML error pages entirely
        let clean_error = match serde_json::from_str::<ErrorResponse>(&error_text) {
            Ok(body) => body
                .text()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Server returned {} error", status.as_u16())),
            Err(_) if error_text.contains("<html") || error_text.contains("<!DOCTYPE") => {
                format!("Server returned {} error", status.as_u16())
            }
            Err(_) => error_text,
        };

        ApiError::from_status(status.as_u16(), clean_error)
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        if response.status().is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::error_for_response(response).await)
        }
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> ApiResult<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for_response(response).await)
        }
    }

    // Post endpoints

    /// Get one page of posts on a side of the query boundary, newest first.
    /// `proxy_url` overrides the client's own proxy for this request.
    pub async fn get_posts(
        &self,
        query: &PostsQuery,
        tags: &str,
        limit: u32,
        proxy_url: Option<&str>,
    ) -> ApiResult<Vec<Post>> {
        let url = self.request_url(&Self::posts_path(query, tags, limit), proxy_url);
        log::debug!("GET {}", url);

        let response = self.get(&url).send().await?;
        let mut page: PostsResponse = self.handle_response(response).await?;

        page.posts.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page.posts)
    }

    // Favorite endpoints

    /// Add a post to the account's favorites
    pub async fn add_favorite(&self, request: &FavoriteRequest) -> ApiResult<()> {
        let path = format!("/favorites.json?post_id={}", request.post_id);
        let url = self.request_url(&path, request.proxy_url.as_deref());
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .basic_auth(&request.auth.username, Some(&request.auth.api_key))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    /// Remove a post from the account's favorites
    pub async fn remove_favorite(&self, request: &FavoriteRequest) -> ApiResult<()> {
        let path = format!("/favorites/{}.json", request.post_id);
        let url = self.request_url(&path, request.proxy_url.as_deref());
        log::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .basic_auth(&request.auth.username, Some(&request.auth.api_key))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        let base_url = std::env::var("TAGVIEW_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

#[async_trait]
impl FavoriteApi for ApiClient {
    async fn favorite_post(&self, request: &FavoriteRequest) -> anyhow::Result<()> {
        Ok(self.add_favorite(request).await?)
    }

    async fn unfavorite_post(&self, request: &FavoriteRequest) -> anyhow::Result<()> {
        Ok(self.remove_favorite(request).await?)
    }
}

/// A tag search bound to an [`ApiClient`], usable as the window's post source
#[derive(Clone)]
pub struct PostFeed {
    client: ApiClient,
    tags: String,
    limit: u32,
    settings: Option<Arc<dyn SettingsProvider>>,
}

impl PostFeed {
    pub fn new(client: ApiClient, tags: impl Into<String>, limit: u32) -> Self {
        Self {
            client,
            tags: tags.into(),
            limit: limit.max(1),
            settings: None,
        }
    }

    /// Read the proxy from live settings on every load
    pub fn with_settings(mut self, settings: Arc<dyn SettingsProvider>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    /// Proxy for the next load; `None` falls back to the client's own
    fn proxy_url(&self) -> Option<String> {
        self.settings.as_ref().and_then(|s| s.proxy_url())
    }

    /// Url the next load for `query` would request
    pub(crate) fn page_url(&self, query: &PostsQuery) -> String {
        let path = ApiClient::posts_path(query, &self.tags, self.limit);
        self.client.request_url(&path, self.proxy_url().as_deref())
    }
}

#[async_trait]
impl PostSource for PostFeed {
    async fn load_posts(&self, query: PostsQuery) -> anyhow::Result<Vec<Post>> {
        let proxy_url = self.proxy_url();
        Ok(self
            .client
            .get_posts(&query, &self.tags, self.limit, proxy_url.as_deref())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_path_before_boundary() {
        let path = ApiClient::posts_path(&PostsQuery::before(Some(1200)), "fox rating:s", 75);
        assert_eq!(path, "/posts.json?limit=75&tags=fox%20rating%3As&page=b1200");
    }

    #[test]
    fn test_posts_path_after_boundary_without_tags() {
        let path = ApiClient::posts_path(&PostsQuery::after(Some(88)), "  ", 20);
        assert_eq!(path, "/posts.json?limit=20&page=a88");
    }

    #[test]
    fn test_posts_path_newest_page() {
        let path = ApiClient::posts_path(&PostsQuery::default(), "", 10);
        assert_eq!(path, "/posts.json?limit=10");
    }

    #[test]
    fn test_request_url_without_proxy() {
        let client = ApiClient::new("https://board.example/");
        assert_eq!(
            client.request_url("/favorites/5.json", None),
            "https://board.example/favorites/5.json"
        );
    }

    #[test]
    fn test_request_url_through_proxy() {
        let mut client = ApiClient::new("https://board.example");
        client.set_proxy_url(Some("https://proxy.example/?url=".to_string()));
        assert_eq!(
            client.request_url("/posts.json?limit=1", None),
            "https://proxy.example/?url=https%3A%2F%2Fboard.example%2Fposts.json%3Flimit%3D1"
        );

        // A per-request proxy wins over the client's own
        assert!(client
            .request_url("/favorites.json", Some("https://other.example/"))
            .starts_with("https://other.example/"));
    }

    #[test]
    fn test_feed_follows_live_proxy_setting() {
        use crate::config::{ClientSettings, SettingsHandle};

        let settings = SettingsHandle::new(ClientSettings::default());
        let feed = PostFeed::new(ApiClient::new("https://board.example"), "", 5)
            .with_settings(Arc::new(settings.clone()));
        let query = PostsQuery::before(Some(10));
        assert_eq!(
            feed.page_url(&query),
            "https://board.example/posts.json?limit=5&page=b10"
        );

        settings.update(|s| s.proxy_url = Some("https://proxy.example/?url=".to_string()));
        assert!(feed
            .page_url(&query)
            .starts_with("https://proxy.example/?url=https%3A%2F%2Fboard.example"));

        settings.update(|s| s.proxy_url = None);
        assert_eq!(
            feed.page_url(&query),
            "https://board.example/posts.json?limit=5&page=b10"
        );
    }

    #[test]
    fn test_blank_proxy_is_ignored() {
        let mut client = ApiClient::new("https://board.example");
        client.set_proxy_url(Some("   ".to_string()));
        assert_eq!(
            client.request_url("/posts.json", None),
            "https://board.example/posts.json"
        );
    }
}
