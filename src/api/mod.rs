//! Backend-as-a-service client surface.
//!
//! [`ForumApi`] is the seam between the core logic and the managed backend:
//! row-level CRUD over the forum relations, session-based auth, and object
//! storage. Every read returns a result set or an error; every write returns
//! success or an error; no partial-success semantics.

pub mod supabase;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{
    Category, CommentRecord, NewComment, NewPost, Notification, PostPatch, PostSummary, Profile,
    ProfilePatch, Session,
};

pub use supabase::SupabaseClient;

#[async_trait]
pub trait ForumApi: Send + Sync {
    // Posts ("dúvidas")

    /// Fetch post summaries, most recent activity first.
    ///
    /// A `search` term asks the backend for a case-insensitive substring
    /// match against title OR body. Hidden posts may be included; callers
    /// enforce the visibility gate themselves.
    async fn fetch_posts(&self, search: Option<&str>) -> Result<Vec<PostSummary>, ApiError>;

    async fn fetch_post(&self, id: &str) -> Result<PostSummary, ApiError>;

    async fn create_post(&self, new: &NewPost) -> Result<(), ApiError>;

    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<(), ApiError>;

    async fn delete_post(&self, id: &str) -> Result<(), ApiError>;

    // Comments

    /// Fetch the flat comment list for a post, ascending by creation time.
    async fn fetch_comments(&self, duvida_id: &str) -> Result<Vec<CommentRecord>, ApiError>;

    async fn create_comment(&self, new: &NewComment) -> Result<(), ApiError>;

    async fn update_comment(&self, id: &str, body: &str) -> Result<(), ApiError>;

    async fn delete_comment(&self, id: &str) -> Result<(), ApiError>;

    // Likes

    async fn insert_like(&self, duvida_id: &str, user_id: &str) -> Result<(), ApiError>;

    async fn delete_like(&self, duvida_id: &str, user_id: &str) -> Result<(), ApiError>;

    // Notifications

    /// Fetch all notifications for a user, newest first.
    async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError>;

    /// Flip the given notifications to read in one bulk update.
    async fn mark_notifications_read(&self, ids: &[String]) -> Result<(), ApiError>;

    /// Delete every notification belonging to the user.
    async fn delete_notifications(&self, user_id: &str) -> Result<(), ApiError>;

    // Profiles and categories

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ApiError>;

    async fn update_profile(&self, user_id: &str, patch: &ProfilePatch) -> Result<(), ApiError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError>;

    async fn create_category(&self, name: &str) -> Result<Category, ApiError>;

    // Auth

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError>;

    /// Returns `None` when the backend requires email confirmation before a
    /// session is issued.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Option<Session>, ApiError>;

    async fn sign_out(&self) -> Result<(), ApiError>;

    async fn reset_password(&self, email: &str) -> Result<(), ApiError>;

    /// The locally stored session, if any.
    async fn current_session(&self) -> Result<Option<Session>, ApiError>;

    // Object storage

    async fn upload_image(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError>;

    /// Public URL for an object in a bucket. No network round trip.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn delete_image(&self, bucket: &str, path: &str) -> Result<(), ApiError>;
}
