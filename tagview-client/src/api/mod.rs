mod client;
mod error;

pub use client::{ApiClient, PostFeed, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult};
