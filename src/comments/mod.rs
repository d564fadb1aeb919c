//! Comment threading: tree construction plus the pass-through operations on
//! a single post's comment thread.

mod tree;

use std::sync::Arc;

use tracing::debug;

use crate::api::ForumApi;
use crate::error::ApiError;
use crate::models::NewComment;

pub use tree::{build_tree, CommentNode};

/// The comment thread of one post.
///
/// Mutations are single backend calls; the tree is recomputed from a fresh
/// fetch via [`CommentThread::load`] after every mutation rather than patched
/// incrementally.
pub struct CommentThread<A> {
    api: Arc<A>,
    duvida_id: String,
}

impl<A: ForumApi> CommentThread<A> {
    pub fn new(api: Arc<A>, duvida_id: impl Into<String>) -> Self {
        Self {
            api,
            duvida_id: duvida_id.into(),
        }
    }

    /// Fetch the flat comment list and build the nested forest.
    ///
    /// # Errors
    ///
    /// Returns the fetch error untouched; the builder is not invoked and the
    /// caller falls back to an empty forest.
    pub async fn load(&self) -> Result<Vec<CommentNode>, ApiError> {
        let records = self.api.fetch_comments(&self.duvida_id).await?;
        debug!(duvida_id = %self.duvida_id, count = records.len(), "loaded comments");
        Ok(build_tree(records))
    }

    /// Post a top-level comment.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty body, or the backend error.
    pub async fn post_comment(&self, author_id: &str, body: &str) -> Result<(), ApiError> {
        self.insert(author_id, body, None).await
    }

    /// Post a reply under an existing comment.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty body, or the backend error.
    pub async fn post_reply(
        &self,
        parent_id: &str,
        author_id: &str,
        body: &str,
    ) -> Result<(), ApiError> {
        self.insert(author_id, body, Some(parent_id.to_string()))
            .await
    }

    async fn insert(
        &self,
        author_id: &str,
        body: &str,
        parent_comment_id: Option<String>,
    ) -> Result<(), ApiError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ApiError::Validation("comment body cannot be empty".into()));
        }
        let new = NewComment {
            duvida_id: self.duvida_id.clone(),
            author_id: author_id.to_string(),
            body: body.to_string(),
            parent_comment_id,
        };
        self.api.create_comment(&new).await
    }

    /// Replace a comment's body text.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty body, or the backend error.
    pub async fn edit_comment(&self, comment_id: &str, body: &str) -> Result<(), ApiError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ApiError::Validation("comment body cannot be empty".into()));
        }
        self.api.update_comment(comment_id, body).await
    }

    /// Delete a comment. Replies that still reference it surface as roots on
    /// the next [`CommentThread::load`].
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), ApiError> {
        self.api.delete_comment(comment_id).await
    }
}
