use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum snippet length for a post body, in characters.
pub const SNIPPET_LEN: usize = 150;

/// Denormalized author display fields carried on posts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub avatar_url: String,
}

/// A forum post ("dúvida") as shown in the feed.
///
/// Owned by the feed reconciler; mutated locally only for the optimistic
/// like/unlike, otherwise replaced wholesale on refetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub body: String,
    /// First [`SNIPPET_LEN`] characters of the body.
    pub snippet: String,
    pub likes: u32,
    pub comments: u32,
    pub user_has_liked: bool,
    pub last_activity: DateTime<Utc>,
    pub author: Author,
    pub author_id: String,
    /// Tagging is not implemented; always empty today.
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    pub category_name: String,
    pub is_resolved: bool,
    pub is_hidden: bool,
}

/// Derive the feed snippet from a post body (char-boundary safe).
#[must_use]
pub fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}

/// Payload for creating a post.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub author_id: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Partial update for a post. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_resolved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
}

/// A flat comment row as delivered by the backend, ascending by creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentRecord {
    pub id: String,
    pub duvida_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    /// `None` means a top-level comment.
    pub parent_comment_id: Option<String>,
    pub author_name: String,
    pub author_avatar_url: String,
}

/// Payload for creating a comment or reply.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub duvida_id: String,
    pub author_id: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<String>,
}

/// Notification type tag. Closed set; rendering maps over it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Comment,
    Reply,
    NewPost,
    Mention,
    System,
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Reply => "reply",
            Self::NewPost => "new_post",
            Self::Mention => "mention",
            Self::System => "system",
        }
    }
}

/// A notification created by the backend and fetched in bulk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub message: String,
    /// Navigation target within the app.
    pub link: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// User role from the profiles relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// A user profile row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub email: Option<String>,
}

/// Partial update for a profile.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A post category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// The authenticated user attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

/// An authentication session issued by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: SessionUser,
}
