#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use async_trait::async_trait;
use tokio::sync::Notify;

use tagview::anchor::MemoryAnchorStore;
use tagview::config::{Account, ClientSettings, SettingsHandle};
use tagview::notifications::MessageQueue;
use tagview::services::{AnchorStore, FavoriteApi, PostSource};
use tagview::types::{FavoriteRequest, Post, PostsQuery};
use tagview::{PostListManager, Services};

/// Post with a renderable file
pub fn viewable(id: i64) -> Post {
    Post::new(id).with_file_url(format!("https://static.example/data/{id}.png"))
}

/// In-memory board serving ids in feed order (descending)
pub struct FakeBoard {
    posts: Vec<Post>,
    limit: AtomicUsize,
    pub queries: Mutex<Vec<PostsQuery>>,
    fail: AtomicBool,
    yield_once: AtomicBool,
    hold: AtomicBool,
    gate: Notify,
}

impl FakeBoard {
    /// Board with ids `1..=newest`; ids in `unviewable` have no file url
    pub fn new(newest: i64, limit: usize, unviewable: &[i64]) -> Self {
        let posts = (1..=newest)
            .rev()
            .map(|id| {
                if unviewable.contains(&id) {
                    Post::new(id)
                } else {
                    viewable(id)
                }
            })
            .collect();

        Self {
            posts,
            limit: AtomicUsize::new(limit),
            queries: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            yield_once: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            gate: Notify::new(),
        }
    }

    pub fn set_limit(&self, limit: usize) {
        self.limit.store(limit, Ordering::SeqCst);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make every fetch suspend once before answering
    pub fn yield_before_answering(&self) {
        self.yield_once.store(true, Ordering::SeqCst);
    }

    /// Hold the next fetch until [`FakeBoard::release`] is called
    pub fn hold_next_load(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn fetch_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn page(&self, query: &PostsQuery) -> Vec<Post> {
        let limit = self.limit.load(Ordering::SeqCst);
        match (query.posts_after, query.posts_before) {
            (Some(after), _) => {
                let mut newer: Vec<Post> = self
                    .posts
                    .iter()
                    .rev()
                    .filter(|p| p.id > after)
                    .take(limit)
                    .cloned()
                    .collect();
                newer.reverse();
                newer
            }
            (None, Some(before)) => self
                .posts
                .iter()
                .filter(|p| p.id < before)
                .take(limit)
                .cloned()
                .collect(),
            (None, None) => self.posts.iter().take(limit).cloned().collect(),
        }
    }
}

#[async_trait]
impl PostSource for FakeBoard {
    async fn load_posts(&self, query: PostsQuery) -> anyhow::Result<Vec<Post>> {
        self.queries.lock().unwrap().push(query.clone());

        if self.yield_once.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        if self.hold.swap(false, Ordering::SeqCst) {
            self.gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            bail!("502 Bad Gateway");
        }
        Ok(self.page(&query))
    }
}

/// Favorite endpoint double recording every request
#[derive(Default)]
pub struct FakeFavorites {
    pub requests: Mutex<Vec<(bool, FavoriteRequest)>>,
    fail: AtomicBool,
}

impl FakeFavorites {
    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    fn record(&self, favorited: bool, request: &FavoriteRequest) -> anyhow::Result<()> {
        self.requests
            .lock()
            .unwrap()
            .push((favorited, request.clone()));
        if self.fail.load(Ordering::SeqCst) {
            bail!("You have already favorited this post");
        }
        Ok(())
    }
}

#[async_trait]
impl FavoriteApi for FakeFavorites {
    async fn favorite_post(&self, request: &FavoriteRequest) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.record(true, request)
    }

    async fn unfavorite_post(&self, request: &FavoriteRequest) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        self.record(false, request)
    }
}

/// Everything a test may want to inspect after driving a manager
pub struct Harness {
    pub manager: PostListManager,
    pub board: Arc<FakeBoard>,
    pub favorites: Arc<FakeFavorites>,
    pub anchor: Arc<dyn AnchorStore>,
    pub settings: SettingsHandle,
    pub messages: Arc<MessageQueue>,
}

pub struct HarnessBuilder {
    board: FakeBoard,
    favorites: FakeFavorites,
    anchor: Arc<dyn AnchorStore>,
    settings: ClientSettings,
}

impl HarnessBuilder {
    pub fn new(board: FakeBoard) -> Self {
        Self {
            board,
            favorites: FakeFavorites::default(),
            anchor: Arc::new(MemoryAnchorStore::default()),
            settings: ClientSettings::default(),
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.settings.page_size = page_size;
        self
    }

    pub fn anchor(mut self, anchor: Arc<dyn AnchorStore>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn logged_in(mut self) -> Self {
        self.settings.account = Account {
            username: Some("alice".to_string()),
            api_key: Some("0123456789abcdef".to_string()),
        };
        self
    }

    pub fn proxy(mut self, proxy_url: &str) -> Self {
        self.settings.proxy_url = Some(proxy_url.to_string());
        self
    }

    pub fn favorites(mut self, favorites: FakeFavorites) -> Self {
        self.favorites = favorites;
        self
    }

    pub fn build(self) -> Harness {
        let board = Arc::new(self.board);
        let favorites = Arc::new(self.favorites);
        let settings = SettingsHandle::new(self.settings);
        let messages = Arc::new(MessageQueue::new());

        let manager = PostListManager::new(Services {
            source: board.clone(),
            settings: Arc::new(settings.clone()),
            anchor: self.anchor.clone(),
            auth: Arc::new(settings.clone()),
            favorites: favorites.clone(),
            reporter: messages.clone(),
            login: messages.clone(),
        });

        Harness {
            manager,
            board,
            favorites,
            anchor: self.anchor,
            settings,
            messages,
        }
    }
}

pub fn ids(posts: &[Post]) -> Vec<i64> {
    posts.iter().map(|p| p.id).collect()
}
