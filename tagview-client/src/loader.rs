use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tagview_types::{LoadDirection, PostsQuery};

use crate::error::error_message;
use crate::services::{ErrorReporter, PostSource};
use crate::window::{lock, InsertReport, SharedWindow};

/// Result of a page load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was fetched and merged into the window
    Loaded(InsertReport),
    /// Another load was in flight; nothing was fetched
    Busy,
    /// The fetch failed and was reported; the window is unchanged
    Failed,
}

impl LoadOutcome {
    pub fn inserted(&self) -> usize {
        match self {
            LoadOutcome::Loaded(report) => report.inserted,
            _ => 0,
        }
    }
}

/// Releases the loading latch when dropped, whatever path the load took
struct LoadingLatch<'a>(&'a AtomicBool);

impl Drop for LoadingLatch<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Fetches pages into the window, at most one at a time per session
#[derive(Clone)]
pub struct PageLoader {
    window: SharedWindow,
    source: Arc<dyn PostSource>,
    reporter: Arc<dyn ErrorReporter>,
    loading: Arc<AtomicBool>,
}

impl PageLoader {
    pub fn new(
        window: SharedWindow,
        source: Arc<dyn PostSource>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            window,
            source,
            reporter,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Load the posts preceding the window head
    pub async fn load_previous_page(&self) -> LoadOutcome {
        self.load(LoadDirection::Previous).await
    }

    /// Load the posts following the window tail
    pub async fn load_next_page(&self) -> LoadOutcome {
        self.load(LoadDirection::Next).await
    }

    pub async fn load(&self, direction: LoadDirection) -> LoadOutcome {
        let Some(_latch) = self.try_latch() else {
            log::debug!("{:?} page requested, but already loading", direction);
            return LoadOutcome::Busy;
        };

        let query = {
            let window = lock(&self.window);
            match direction {
                LoadDirection::Previous => PostsQuery::after(window.first_id()),
                LoadDirection::Next => PostsQuery::before(window.last_id()),
            }
        };
        log::debug!("loading {:?} page with {:?}", direction, query);

        match self.source.load_posts(query).await {
            Ok(posts) => {
                let mut window = lock(&self.window);
                let report = match direction {
                    LoadDirection::Previous => window.insert_before(posts),
                    LoadDirection::Next => window.insert_after(posts),
                };
                LoadOutcome::Loaded(report)
            }
            Err(e) => {
                log::warn!("{:?} page failed to load: {:#}", direction, e);
                self.reporter.report(&error_message(&e));
                LoadOutcome::Failed
            }
        }
    }

    fn try_latch(&self) -> Option<LoadingLatch<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| LoadingLatch(&self.loading))
    }
}
