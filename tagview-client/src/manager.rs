//! Per-view post list: the window plus loading, favoriting and fullscreen
//! navigation wired to one set of collaborators.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tagview_types::{NavDirection, Post};

use crate::anchor::AnchorBridge;
use crate::api::{ApiClient, PostFeed};
use crate::config::SettingsHandle;
use crate::favorites::{FavoriteOutcome, FavoriteToggler};
use crate::loader::{LoadOutcome, PageLoader};
use crate::navigator::FullscreenNavigator;
use crate::notifications::MessageQueue;
use crate::services::{
    AnchorStore, AuthProvider, ErrorReporter, FavoriteApi, LoginPrompt, PostSource,
    SettingsProvider,
};
use crate::window::{lock, SharedWindow, WindowStore};

/// Collaborators a [`PostListManager`] is built from
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn PostSource>,
    pub settings: Arc<dyn SettingsProvider>,
    pub anchor: Arc<dyn AnchorStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub favorites: Arc<dyn FavoriteApi>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub login: Arc<dyn LoginPrompt>,
}

impl Services {
    /// Wire the board's HTTP client to live settings, reporting errors and
    /// login prompts into `messages`
    pub fn for_board(
        settings: SettingsHandle,
        anchor: Arc<dyn AnchorStore>,
        messages: Arc<MessageQueue>,
    ) -> Self {
        let snapshot = settings.snapshot();
        let client = ApiClient::new(snapshot.base_url);
        let settings = Arc::new(settings);
        let feed = PostFeed::new(client.clone(), snapshot.tags, snapshot.fetch_limit)
            .with_settings(settings.clone());

        Self {
            source: Arc::new(feed),
            settings: settings.clone(),
            anchor,
            auth: settings,
            favorites: Arc::new(client),
            reporter: messages.clone(),
            login: messages,
        }
    }
}

pub struct PostListManager {
    window: SharedWindow,
    loader: PageLoader,
    favorites: FavoriteToggler,
    navigator: FullscreenNavigator,
    details: Mutex<Option<Post>>,
}

impl PostListManager {
    /// Start a session with an empty window. The first load is seeded from
    /// the saved anchor.
    pub fn new(services: Services) -> Self {
        let window: SharedWindow = Arc::new(Mutex::new(WindowStore::new(
            services.settings.clone(),
            AnchorBridge::new(services.anchor),
        )));
        let loader = PageLoader::new(window.clone(), services.source, services.reporter.clone());
        let favorites = FavoriteToggler::new(
            window.clone(),
            services.favorites,
            services.auth,
            services.settings,
            services.reporter,
            services.login,
        );
        let navigator = FullscreenNavigator::new(window.clone(), loader.clone());

        Self {
            window,
            loader,
            favorites,
            navigator,
            details: Mutex::new(None),
        }
    }

    /// Snapshot of the window for presentation
    pub fn posts(&self) -> Vec<Post> {
        lock(&self.window).posts().to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.window).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.window).is_empty()
    }

    pub fn first_id(&self) -> Option<i64> {
        lock(&self.window).first_id()
    }

    pub fn last_id(&self) -> Option<i64> {
        lock(&self.window).last_id()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    // Loading

    pub async fn load_previous_page(&self) -> LoadOutcome {
        self.loader.load_previous_page().await
    }

    pub async fn load_next_page(&self) -> LoadOutcome {
        self.loader.load_next_page().await
    }

    // Favorites

    /// Favorite a post, carrying a confirmed change over to the fullscreen
    /// and details copies even if the post has since left the window
    pub async fn set_post_favorite(&self, post_id: i64, favorited: bool) -> FavoriteOutcome {
        let outcome = self.favorites.set_favorite(post_id, favorited).await;
        match outcome {
            FavoriteOutcome::Updated | FavoriteOutcome::Detached => {
                self.update_views(post_id, |p| {
                    p.is_favorited = favorited;
                    p.meta.is_favorite_loading = false;
                });
            }
            FavoriteOutcome::Failed => {
                self.update_views(post_id, |p| p.meta.is_favorite_loading = false);
            }
            FavoriteOutcome::NotFound | FavoriteOutcome::NotLoggedIn => {}
        }
        outcome
    }

    fn update_views<F>(&self, post_id: i64, f: F)
    where
        F: Fn(&mut Post),
    {
        self.navigator.update_snapshot(post_id, &f);
        if let Some(post) = self.details().as_mut().filter(|p| p.id == post_id) {
            f(post);
        }
    }

    // Details view

    /// Show a post's details, or clear the view if it is not in the window
    pub fn open_post_details(&self, post_id: i64) {
        let post = lock(&self.window).get(post_id).cloned();
        *self.details() = post;
    }

    /// The details post, as currently stored in the window when it is still
    /// there, otherwise as it was when opened
    pub fn details_post(&self) -> Option<Post> {
        let snapshot = self.details().clone()?;
        let current = lock(&self.window).get(snapshot.id).cloned();
        Some(current.unwrap_or(snapshot))
    }

    pub fn close_post_details(&self) {
        *self.details() = None;
    }

    // Fullscreen

    pub fn fullscreen_post(&self) -> Option<Post> {
        self.navigator.focused_post()
    }

    pub fn open_fullscreen_post(&self, post_id: i64) -> bool {
        self.navigator.open(post_id)
    }

    pub async fn open_next_fullscreen_post(&self) -> bool {
        self.navigator.step(NavDirection::Forward).await
    }

    pub async fn open_previous_fullscreen_post(&self) -> bool {
        self.navigator.step(NavDirection::Backward).await
    }

    pub fn close_fullscreen_post(&self) {
        self.navigator.close();
    }

    fn details(&self) -> MutexGuard<'_, Option<Post>> {
        self.details.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
