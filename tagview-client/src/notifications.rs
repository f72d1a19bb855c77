//! Snackbar-style message queue and log-only reporting.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::services::{ErrorReporter, LoginPrompt};

const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

/// Pending user-facing messages, oldest first.
///
/// Also records login redirects so the presentation layer can route to the
/// account settings screen on its next tick.
#[derive(Debug)]
pub struct MessageQueue {
    messages: Mutex<VecDeque<Message>>,
    capacity: usize,
    login_requested: AtomicBool,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            login_requested: AtomicBool::new(false),
        }
    }

    pub fn push(&self, kind: MessageKind, text: impl Into<String>) {
        let Ok(mut messages) = self.messages.lock() else {
            return;
        };
        if messages.len() >= self.capacity {
            messages.pop_front();
        }
        messages.push_back(Message {
            kind,
            text: text.into(),
        });
    }

    /// Remove and return every pending message
    pub fn drain(&self) -> Vec<Message> {
        match self.messages.lock() {
            Ok(mut messages) => messages.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a login redirect is pending; clears the request
    pub fn take_login_request(&self) -> bool {
        self.login_requested.swap(false, Ordering::SeqCst)
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for MessageQueue {
    fn report(&self, message: &str) {
        log::debug!("error notification: {}", message);
        self.push(MessageKind::Error, message);
    }
}

impl LoginPrompt for MessageQueue {
    fn prompt_login(&self, notice: &str) {
        log::debug!("login required: {}", notice);
        self.push(MessageKind::Notice, notice);
        self.login_requested.store(true, Ordering::SeqCst);
    }
}

/// Reporter that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, message: &str) {
        log::error!("{}", message);
    }
}
