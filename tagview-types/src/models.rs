use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Rating;

/// A single post as returned by the board, plus client-only annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file: PostFile,
    #[serde(default)]
    pub preview: Option<PostImage>,
    #[serde(default)]
    pub sample: Option<PostImage>,
    #[serde(default)]
    pub tags: PostTags,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub score: PostScore,
    #[serde(default)]
    pub fav_count: i32,
    #[serde(default)]
    pub is_favorited: bool,
    /// Client-side state, never part of the wire format
    #[serde(skip)]
    pub meta: PostMeta,
}

impl Post {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.file.url = Some(url.into());
        self
    }

    /// Whether the full-size file can be rendered (non-empty url)
    pub fn is_viewable(&self) -> bool {
        self.file
            .url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostFile {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub md5: String,
    /// Absent when the board withholds the file (deleted, login-gated, ...)
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostScore {
    #[serde(default)]
    pub up: i32,
    #[serde(default)]
    pub down: i32,
    #[serde(default)]
    pub total: i32,
}

/// Tags grouped by category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostTags {
    #[serde(default)]
    pub artist: Vec<String>,
    #[serde(default)]
    pub character: Vec<String>,
    #[serde(default)]
    pub copyright: Vec<String>,
    #[serde(default)]
    pub general: Vec<String>,
    #[serde(default)]
    pub invalid: Vec<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub meta: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
}

/// Presentation state owned by the window entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostMeta {
    /// A favorite/unfavorite request for this post is in flight
    pub is_favorite_loading: bool,
}

/// Account credentials used for authenticated requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

// Request/Response types for API

/// Page request relative to a boundary id. At most one side is set;
/// neither means "newest page".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsQuery {
    pub posts_before: Option<i64>,
    pub posts_after: Option<i64>,
}

impl PostsQuery {
    pub fn before(id: Option<i64>) -> Self {
        Self {
            posts_before: id,
            posts_after: None,
        }
    }

    pub fn after(id: Option<i64>) -> Self {
        Self {
            posts_before: None,
            posts_after: id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRequest {
    pub post_id: i64,
    pub auth: Credentials,
    pub proxy_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ErrorResponse {
    /// Best human-readable text in the body, if any
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.reason.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}
