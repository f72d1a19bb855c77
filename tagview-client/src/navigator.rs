//! Focused ("fullscreen") navigation over the window.
//!
//! Stepping skips posts without a renderable file. When the window runs out
//! in the step direction the loader is asked for exactly one more page and
//! the scan is retried once; a second miss ends navigation.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tagview_types::{NavDirection, Post};

use crate::loader::PageLoader;
use crate::window::{lock, SharedWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retried,
}

pub struct FullscreenNavigator {
    window: SharedWindow,
    loader: PageLoader,
    focused: Mutex<Option<Post>>,
}

impl FullscreenNavigator {
    pub fn new(window: SharedWindow, loader: PageLoader) -> Self {
        Self {
            window,
            loader,
            focused: Mutex::new(None),
        }
    }

    /// The focused post, as currently stored in the window when it is still
    /// there, otherwise as it was when focused
    pub fn focused_post(&self) -> Option<Post> {
        let snapshot = self.focus().clone()?;
        let current = lock(&self.window).get(snapshot.id).cloned();
        Some(current.unwrap_or(snapshot))
    }

    pub fn focused_id(&self) -> Option<i64> {
        self.focus().as_ref().map(|p| p.id)
    }

    /// Focus a post by id. Validity is not checked and nothing is loaded;
    /// an id outside the window clears focus.
    pub fn open(&self, post_id: i64) -> bool {
        let post = lock(&self.window).get(post_id).cloned();
        if post.is_none() {
            log::debug!("post {} is not in the window", post_id);
        }
        let found = post.is_some();
        self.set_focus(post);
        found
    }

    /// Apply `f` to the focused snapshot if it is the post with `id`
    pub(crate) fn update_snapshot<F>(&self, id: i64, f: F)
    where
        F: FnOnce(&mut Post),
    {
        if let Some(post) = self.focus().as_mut().filter(|p| p.id == id) {
            f(post);
        }
    }

    pub fn close(&self) {
        self.set_focus(None);
    }

    pub async fn next(&self) -> bool {
        self.step(NavDirection::Forward).await
    }

    pub async fn previous(&self) -> bool {
        self.step(NavDirection::Backward).await
    }

    /// Move focus to the next viewable post in `direction`.
    ///
    /// Returns false and clears focus when none is found even after one
    /// window extension. Without a focused post nothing happens.
    pub async fn step(&self, direction: NavDirection) -> bool {
        let Some(origin) = self.focused_id() else {
            log::debug!("{:?} step without a focused post", direction);
            return false;
        };

        let mut attempt = Attempt::Initial;
        loop {
            if let Some(post) = self.scan(origin, direction) {
                log::debug!("focus {} -> {}", origin, post.id);
                self.set_focus(Some(post));
                return true;
            }

            match attempt {
                Attempt::Initial => {
                    let outcome = self.loader.load(direction.load_direction()).await;
                    log::debug!("extended window for {:?} step: {:?}", direction, outcome);
                    attempt = Attempt::Retried;
                }
                Attempt::Retried => break,
            }
        }

        log::debug!("no further posts {:?} of {}", direction, origin);
        self.set_focus(None);
        false
    }

    /// First viewable post strictly past `origin` in `direction`. A missing
    /// origin counts as a miss.
    fn scan(&self, origin: i64, direction: NavDirection) -> Option<Post> {
        let window = lock(&self.window);
        let start = window.find_by_id(origin)?;
        let posts = window.posts();

        let found = match direction {
            NavDirection::Forward => posts[start + 1..].iter().find(|p| p.is_viewable()),
            NavDirection::Backward => posts[..start].iter().rev().find(|p| p.is_viewable()),
        };
        found.cloned()
    }

    fn focus(&self) -> MutexGuard<'_, Option<Post>> {
        self.focused.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_focus(&self, post: Option<Post>) {
        *self.focus() = post;
    }
}
