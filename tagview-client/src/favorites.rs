use std::sync::Arc;

use tagview_types::FavoriteRequest;

use crate::error::error_message;
use crate::services::{AuthProvider, ErrorReporter, FavoriteApi, LoginPrompt, SettingsProvider};
use crate::window::{lock, SharedWindow};

/// Notice shown when favoriting without an account
pub const NOT_LOGGED_IN: &str = "Not logged in";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    /// The post is no longer in the window
    NotFound,
    /// No credentials; the user was sent to log in
    NotLoggedIn,
    /// The board confirmed the change and the post was updated
    Updated,
    /// The board confirmed the change but the post left the window while the
    /// request was pending, so only detached copies can be updated
    Detached,
    /// The request failed and was reported; the post keeps its old state
    Failed,
}

/// Holds a post's `is_favorite_loading` flag up until dropped.
///
/// Both writes go through the post id, so they land on whatever entry holds
/// that id at the time and are skipped if the post was trimmed away.
/// `set_favorite` reports the latter as [`FavoriteOutcome::Detached`].
struct FavoriteLoadingFlag<'a> {
    window: &'a SharedWindow,
    post_id: i64,
}

impl<'a> FavoriteLoadingFlag<'a> {
    fn raise(window: &'a SharedWindow, post_id: i64) -> Self {
        lock(window).update(post_id, |p| p.meta.is_favorite_loading = true);
        Self { window, post_id }
    }
}

impl Drop for FavoriteLoadingFlag<'_> {
    fn drop(&mut self) {
        lock(self.window).update(self.post_id, |p| p.meta.is_favorite_loading = false);
    }
}

#[derive(Clone)]
pub struct FavoriteToggler {
    window: SharedWindow,
    api: Arc<dyn FavoriteApi>,
    auth: Arc<dyn AuthProvider>,
    settings: Arc<dyn SettingsProvider>,
    reporter: Arc<dyn ErrorReporter>,
    login: Arc<dyn LoginPrompt>,
}

impl FavoriteToggler {
    pub fn new(
        window: SharedWindow,
        api: Arc<dyn FavoriteApi>,
        auth: Arc<dyn AuthProvider>,
        settings: Arc<dyn SettingsProvider>,
        reporter: Arc<dyn ErrorReporter>,
        login: Arc<dyn LoginPrompt>,
    ) -> Self {
        Self {
            window,
            api,
            auth,
            settings,
            reporter,
            login,
        }
    }

    /// Favorite or unfavorite a post in the window.
    ///
    /// `is_favorited` is only written once the board confirms the change.
    pub async fn set_favorite(&self, post_id: i64, favorited: bool) -> FavoriteOutcome {
        if lock(&self.window).find_by_id(post_id).is_none() {
            log::debug!("favorite requested for post {} outside the window", post_id);
            return FavoriteOutcome::NotFound;
        }

        let Some(auth) = self.auth.credentials() else {
            self.login.prompt_login(NOT_LOGGED_IN);
            return FavoriteOutcome::NotLoggedIn;
        };

        let request = FavoriteRequest {
            post_id,
            auth,
            proxy_url: self.settings.proxy_url(),
        };

        let _loading = FavoriteLoadingFlag::raise(&self.window, post_id);
        let result = if favorited {
            self.api.favorite_post(&request).await
        } else {
            self.api.unfavorite_post(&request).await
        };

        match result {
            Ok(()) => {
                log::debug!("post {} favorited={}", post_id, favorited);
                if lock(&self.window).update(post_id, |p| p.is_favorited = favorited) {
                    FavoriteOutcome::Updated
                } else {
                    log::debug!("post {} left the window before its favorite landed", post_id);
                    FavoriteOutcome::Detached
                }
            }
            Err(e) => {
                log::warn!("favorite update for post {} failed: {:#}", post_id, e);
                self.reporter.report(&error_message(&e));
                FavoriteOutcome::Failed
            }
        }
    }
}
