//! Collaborator seams the post list core talks to.
//!
//! Everything that touches the network, disk or the presentation layer sits
//! behind one of these traits so the window logic can be driven by test
//! doubles as easily as by the HTTP client.

use anyhow::Result;
use async_trait::async_trait;
use tagview_types::{Credentials, FavoriteRequest, Post, PostsQuery};

/// Remote feed of posts
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch posts strictly on one side of the boundary in the query, in feed
    /// order. An empty page means the end of the feed was reached.
    async fn load_posts(&self, query: PostsQuery) -> Result<Vec<Post>>;
}

/// Remote favorite/unfavorite endpoints
#[async_trait]
pub trait FavoriteApi: Send + Sync {
    async fn favorite_post(&self, request: &FavoriteRequest) -> Result<()>;
    async fn unfavorite_post(&self, request: &FavoriteRequest) -> Result<()>;
}

/// Live view of the user's settings. Values are read on every call.
pub trait SettingsProvider: Send + Sync {
    /// Desired window capacity
    fn page_size(&self) -> usize;

    /// CORS/forwarding proxy prefixed to board requests, if any
    fn proxy_url(&self) -> Option<String> {
        None
    }
}

/// Persisted scroll anchor (id of the first post in the window)
pub trait AnchorStore: Send + Sync {
    fn saved_first_post_id(&self) -> Result<Option<i64>>;
    fn save_first_post_id(&self, id: Option<i64>) -> Result<()>;
}

/// Source of the current account credentials
pub trait AuthProvider: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// User-visible error notifications
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Redirect to the account entry point when an action needs a login
pub trait LoginPrompt: Send + Sync {
    fn prompt_login(&self, notice: &str);
}

impl<F> ErrorReporter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

impl<F> LoginPrompt for F
where
    F: Fn(&str) + Send + Sync,
{
    fn prompt_login(&self, notice: &str) {
        self(notice)
    }
}

/// Fixed settings, mostly useful for embedding and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedPageSize(pub usize);

impl SettingsProvider for FixedPageSize {
    fn page_size(&self) -> usize {
        self.0
    }
}

/// Anonymous session
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl AuthProvider for Anonymous {
    fn credentials(&self) -> Option<Credentials> {
        None
    }
}
