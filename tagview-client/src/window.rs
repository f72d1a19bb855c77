//! Capacity-bounded window over the post feed.
//!
//! Posts are kept in feed order (descending id). Loading a page on one side
//! trims the opposite side back down to the configured page size, and every
//! structural change pushes the current first id to the anchor bridge.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tagview_types::Post;

use crate::anchor::AnchorBridge;
use crate::services::SettingsProvider;

/// What a single insert did to the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    pub trimmed: usize,
}

/// Window shared between the loader, the favorite toggler and the navigator
pub type SharedWindow = Arc<Mutex<WindowStore>>;

/// Lock the shared window. Every critical section is a plain field write or
/// splice, so a poisoned lock still guards consistent data.
pub fn lock(window: &SharedWindow) -> MutexGuard<'_, WindowStore> {
    window.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct WindowStore {
    posts: Vec<Post>,
    settings: Arc<dyn SettingsProvider>,
    anchor: AnchorBridge,
}

impl WindowStore {
    pub fn new(settings: Arc<dyn SettingsProvider>, anchor: AnchorBridge) -> Self {
        Self {
            posts: Vec::new(),
            settings,
            anchor,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Id of the head post, or the saved anchor while the window is empty
    pub fn first_id(&self) -> Option<i64> {
        match self.posts.first() {
            Some(post) => Some(post.id),
            None => self.anchor.saved_first_post_id(),
        }
    }

    /// Id of the tail post, or one past the saved anchor while the window is
    /// empty so that a "before" request still includes the anchor post.
    pub fn last_id(&self) -> Option<i64> {
        match self.posts.last() {
            Some(post) => Some(post.id),
            None => self
                .anchor
                .saved_first_post_id()
                .map(|id| id.saturating_add(1)),
        }
    }

    pub fn find_by_id(&self, id: i64) -> Option<usize> {
        self.posts.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: i64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    /// Targeted update of one entry's fields. Never reorders, resizes or
    /// saves the anchor. Returns false when the id is not in the window.
    pub fn update<F>(&mut self, id: i64, f: F) -> bool
    where
        F: FnOnce(&mut Post),
    {
        match self.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                f(post);
                true
            }
            None => false,
        }
    }

    /// Prepend a page (already in feed order) and trim the tail
    pub fn insert_before(&mut self, new_posts: Vec<Post>) -> InsertReport {
        let new_posts = self.without_known_ids(new_posts);
        let inserted = new_posts.len();
        self.posts.splice(0..0, new_posts);

        let trimmed = self.overflow();
        self.posts.truncate(self.posts.len() - trimmed);

        self.finish_mutation(inserted, trimmed)
    }

    /// Append a page (already in feed order) and trim the head
    pub fn insert_after(&mut self, new_posts: Vec<Post>) -> InsertReport {
        let new_posts = self.without_known_ids(new_posts);
        let inserted = new_posts.len();
        self.posts.extend(new_posts);

        let trimmed = self.overflow();
        self.posts.drain(..trimmed);

        self.finish_mutation(inserted, trimmed)
    }

    /// Entries beyond the page size, read fresh so a shrinking setting is
    /// honoured on the next load
    fn overflow(&self) -> usize {
        self.posts.len().saturating_sub(self.settings.page_size())
    }

    fn without_known_ids(&self, new_posts: Vec<Post>) -> Vec<Post> {
        let mut seen: HashSet<i64> = self.posts.iter().map(|p| p.id).collect();
        let before = new_posts.len();
        let fresh: Vec<Post> = new_posts
            .into_iter()
            .filter(|p| seen.insert(p.id))
            .collect();

        if fresh.len() != before {
            log::warn!(
                "Dropped {} post(s) already present in the window",
                before - fresh.len()
            );
        }
        fresh
    }

    fn finish_mutation(&self, inserted: usize, trimmed: usize) -> InsertReport {
        log::debug!(
            "window: inserted={} trimmed={} len={} first={:?}",
            inserted,
            trimmed,
            self.posts.len(),
            self.posts.first().map(|p| p.id)
        );
        self.anchor.on_window_changed(self.first_id());
        InsertReport { inserted, trimmed }
    }
}
