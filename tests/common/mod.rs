#![allow(dead_code)]
//! Shared in-memory fake backend for the core-logic tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use forum_flow::api::ForumApi;
use forum_flow::error::ApiError;
use forum_flow::models::{
    Author, Category, CommentRecord, NewComment, NewPost, Notification, NotificationKind,
    PostPatch, PostSummary, Profile, ProfilePatch, Role, Session, SessionUser,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeCall {
    pub duvida_id: String,
    pub user_id: String,
    pub insert: bool,
}

/// Configurable fake [`ForumApi`]. Delays use `tokio::time`, so tests under
/// paused time stay deterministic.
#[derive(Default)]
pub struct MockApi {
    pub posts: Mutex<Vec<PostSummary>>,
    pub fetch_posts_delay: Mutex<Duration>,
    pub fail_fetch_posts: AtomicBool,
    pub fetch_posts_log: Mutex<Vec<Option<String>>>,

    pub like_delay: Mutex<Duration>,
    pub fail_like_writes: AtomicBool,
    pub like_log: Mutex<Vec<LikeCall>>,

    pub notifications: Mutex<Vec<Notification>>,
    pub fail_fetch_notifications: AtomicBool,
    pub fail_notification_writes: AtomicBool,
    pub mark_read_log: Mutex<Vec<Vec<String>>>,
    pub cleared_for: Mutex<Vec<String>>,

    pub comments: Mutex<Vec<CommentRecord>>,
    pub created_comments: Mutex<Vec<NewComment>>,

    pub session: Mutex<Option<Session>>,
    pub current_session_delay: Mutex<Duration>,
    pub fail_sign_out: AtomicBool,
    pub profiles: Mutex<HashMap<String, Profile>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn delay(slot: &Mutex<Duration>) -> Duration {
        *slot.lock().unwrap()
    }

    pub fn set_posts(&self, posts: Vec<PostSummary>) {
        *self.posts.lock().unwrap() = posts;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_posts_log.lock().unwrap().len()
    }
}

fn backend_error() -> ApiError {
    ApiError::Backend {
        status: 500,
        message: "simulated failure".to_string(),
    }
}

#[async_trait]
impl ForumApi for MockApi {
    async fn fetch_posts(&self, search: Option<&str>) -> Result<Vec<PostSummary>, ApiError> {
        let delay = Self::delay(&self.fetch_posts_delay);
        tokio::time::sleep(delay).await;
        self.fetch_posts_log
            .lock()
            .unwrap()
            .push(search.map(String::from));
        if self.fail_fetch_posts.load(Ordering::SeqCst) {
            return Err(backend_error());
        }
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn fetch_post(&self, id: &str) -> Result<PostSummary, ApiError> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_post(&self, _new: &NewPost) -> Result<(), ApiError> {
        Ok(())
    }

    async fn update_post(&self, _id: &str, _patch: &PostPatch) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete_post(&self, _id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn fetch_comments(&self, duvida_id: &str) -> Result<Vec<CommentRecord>, ApiError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.duvida_id == duvida_id)
            .cloned()
            .collect())
    }

    async fn create_comment(&self, new: &NewComment) -> Result<(), ApiError> {
        self.created_comments.lock().unwrap().push(new.clone());
        Ok(())
    }

    async fn update_comment(&self, _id: &str, _body: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete_comment(&self, _id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn insert_like(&self, duvida_id: &str, user_id: &str) -> Result<(), ApiError> {
        let delay = Self::delay(&self.like_delay);
        tokio::time::sleep(delay).await;
        if self.fail_like_writes.load(Ordering::SeqCst) {
            return Err(backend_error());
        }
        self.like_log.lock().unwrap().push(LikeCall {
            duvida_id: duvida_id.to_string(),
            user_id: user_id.to_string(),
            insert: true,
        });
        Ok(())
    }

    async fn delete_like(&self, duvida_id: &str, user_id: &str) -> Result<(), ApiError> {
        let delay = Self::delay(&self.like_delay);
        tokio::time::sleep(delay).await;
        if self.fail_like_writes.load(Ordering::SeqCst) {
            return Err(backend_error());
        }
        self.like_log.lock().unwrap().push(LikeCall {
            duvida_id: duvida_id.to_string(),
            user_id: user_id.to_string(),
            insert: false,
        });
        Ok(())
    }

    async fn fetch_notifications(&self, _user_id: &str) -> Result<Vec<Notification>, ApiError> {
        if self.fail_fetch_notifications.load(Ordering::SeqCst) {
            return Err(backend_error());
        }
        Ok(self.notifications.lock().unwrap().clone())
    }

    async fn mark_notifications_read(&self, ids: &[String]) -> Result<(), ApiError> {
        if self.fail_notification_writes.load(Ordering::SeqCst) {
            return Err(backend_error());
        }
        self.mark_read_log.lock().unwrap().push(ids.to_vec());
        Ok(())
    }

    async fn delete_notifications(&self, user_id: &str) -> Result<(), ApiError> {
        if self.fail_notification_writes.load(Ordering::SeqCst) {
            return Err(backend_error());
        }
        self.cleared_for.lock().unwrap().push(user_id.to_string());
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn update_profile(&self, _user_id: &str, _patch: &ProfilePatch) -> Result<(), ApiError> {
        Ok(())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        Ok(Category {
            id: "cat-1".to_string(),
            name: name.to_string(),
        })
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, ApiError> {
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Authorization("invalid credentials".into()))
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _display_name: &str,
    ) -> Result<Option<Session>, ApiError> {
        Ok(None)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(backend_error());
        }
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn reset_password(&self, _email: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, ApiError> {
        let delay = Self::delay(&self.current_session_delay);
        tokio::time::sleep(delay).await;
        Ok(self.session.lock().unwrap().clone())
    }

    async fn upload_image(
        &self,
        _bucket: &str,
        _path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("mock://{bucket}/{path}")
    }

    async fn delete_image(&self, _bucket: &str, _path: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

// Fixture builders

pub fn post(id: &str, hidden: bool) -> PostSummary {
    PostSummary {
        id: id.to_string(),
        title: format!("Dúvida {id}"),
        body: "corpo da dúvida".to_string(),
        snippet: "corpo da dúvida".to_string(),
        likes: 0,
        comments: 0,
        user_has_liked: false,
        last_activity: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        author: Author {
            name: "Ana".to_string(),
            avatar_url: String::new(),
        },
        author_id: "u1".to_string(),
        tags: Vec::new(),
        image_url: None,
        category_id: Some("c1".to_string()),
        category_name: "Geral".to_string(),
        is_resolved: false,
        is_hidden: hidden,
    }
}

pub fn notification(id: &str, read: bool) -> Notification {
    Notification {
        id: id.to_string(),
        message: format!("nova resposta {id}"),
        link: format!("/duvida/{id}"),
        kind: NotificationKind::Reply,
        is_read: read,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

pub fn comment(id: &str, duvida_id: &str, parent: Option<&str>, minute: u32) -> CommentRecord {
    CommentRecord {
        id: id.to_string(),
        duvida_id: duvida_id.to_string(),
        body: format!("comentário {id}"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        author_id: "u1".to_string(),
        parent_comment_id: parent.map(String::from),
        author_name: "Ana".to_string(),
        author_avatar_url: String::new(),
    }
}

pub fn session(user_id: &str) -> Session {
    Session {
        access_token: format!("token-{user_id}"),
        refresh_token: None,
        user: SessionUser {
            id: user_id.to_string(),
            email: Some(format!("{user_id}@example.com")),
        },
    }
}

pub fn profile(user_id: &str, role: Role) -> Profile {
    Profile {
        id: user_id.to_string(),
        display_name: Some("Ana".to_string()),
        avatar_url: None,
        role,
        email: Some(format!("{user_id}@example.com")),
    }
}
