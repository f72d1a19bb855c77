// Library interface for the tagview client core
pub mod anchor;
pub mod api;
pub mod config;
pub mod error;
pub mod favorites;
pub mod loader;
pub mod logging;
pub mod manager;
pub mod navigator;
pub mod notifications;
pub mod services;
pub mod window;

pub use manager::{PostListManager, Services};
pub use tagview_types as types;
