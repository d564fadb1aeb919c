//! Fórum Flow client core.
//!
//! The non-UI heart of a forum-style Q&A application ("dúvidas"): nested
//! comment threading, a debounced and cancelable post-list reconciler with
//! optimistic like/unlike, a notification center, and explicitly-owned
//! session state, all backed by a thin Supabase client.
//!
//! The client never holds authoritative state. Every entity here is a cache
//! of the backend's current truth, valid until the next fetch.

pub mod api;
pub mod comments;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod session;

pub use api::ForumApi;
pub use comments::{build_tree, CommentNode};
pub use error::ApiError;
pub use feed::{FeedHandle, FeedReconciler, FeedState, LikeController};
