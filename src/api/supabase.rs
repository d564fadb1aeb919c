//! Reqwest implementation of [`ForumApi`] speaking the Supabase surface:
//! PostgREST-style row CRUD under `/rest/v1`, GoTrue auth under `/auth/v1`,
//! and object storage under `/storage/v1`.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::api::ForumApi;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    self, Author, Category, CommentRecord, NewComment, NewPost, Notification, PostPatch,
    PostSummary, Profile, ProfilePatch, Session, SessionUser,
};

const UNKNOWN_USER: &str = "Usuário Desconhecido";

/// Thin client over the managed backend. Cheap to clone via `Arc`; holds the
/// current session for bearer authorization.
pub struct SupabaseClient {
    http: reqwest::Client,
    base: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl SupabaseClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base = config.supabase_url.trim_end_matches('/').to_string();
        Url::parse(&base)
            .map_err(|e| ApiError::Validation(format!("invalid Supabase URL: {e}")))?;

        let mut headers = HeaderMap::new();
        let apikey = HeaderValue::from_str(&config.supabase_anon_key)
            .map_err(|e| ApiError::Validation(format!("invalid anon key: {e}")))?;
        headers.insert("apikey", apikey);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            base,
            anon_key: config.supabase_anon_key.clone(),
            session: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}/{path}", self.base))
            .map_err(|e| ApiError::Validation(format!("invalid endpoint URL: {e}")))
    }

    /// Bearer token for the current request: the session's access token when
    /// signed in, the anon key otherwise (row-level policies do the rest).
    fn bearer(&self) -> String {
        self.stored_session()
            .map_or_else(|| self.anon_key.clone(), |s| s.access_token)
    }

    fn stored_session(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store_session(&self, session: Option<Session>) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ApiError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(map_reqwest)?;
        let resp = check_status(resp).await?;
        resp.json().await.map_err(map_reqwest)
    }

    /// Fetch exactly one row; absence maps to [`ApiError::NotFound`].
    async fn get_single<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(self.bearer())
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(map_reqwest)?;
        let resp = check_status(resp).await?;
        resp.json().await.map_err(map_reqwest)
    }

    async fn write(&self, req: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let resp = req
            .bearer_auth(self.bearer())
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(resp).await?;
        Ok(())
    }
}

fn map_reqwest(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e)
    }
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Authorization(message),
        StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => ApiError::NotFound,
        s => ApiError::Backend {
            status: s.as_u16(),
            message,
        },
    })
}

/// Build a PostgREST `ilike` pattern for a free-text search term.
///
/// Commas and parentheses are syntax separators inside an `or=` filter, so
/// they are flattened to spaces before wrapping in wildcards.
fn ilike_pattern(term: &str) -> String {
    let cleaned: String = term
        .chars()
        .map(|c| if matches!(c, ',' | '(' | ')') { ' ' } else { c })
        .collect();
    format!("*{}*", cleaned.trim())
}

// Wire shapes with the embedded joins the queries request.

#[derive(Debug, Deserialize)]
struct ProfileRef {
    display_name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DuvidaRow {
    id: String,
    title: String,
    body: String,
    author_id: String,
    category_id: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    is_resolved: bool,
    #[serde(default)]
    is_hidden: bool,
    created_at: DateTime<Utc>,
    last_activity_at: Option<DateTime<Utc>>,
    category: Option<CategoryRef>,
    author: Option<ProfileRef>,
}

impl From<DuvidaRow> for PostSummary {
    fn from(row: DuvidaRow) -> Self {
        let author = row.author.map_or_else(
            || Author {
                name: UNKNOWN_USER.to_string(),
                avatar_url: String::new(),
            },
            |a| Author {
                name: a.display_name.unwrap_or_else(|| UNKNOWN_USER.to_string()),
                avatar_url: a.avatar_url.unwrap_or_default(),
            },
        );
        Self {
            snippet: models::snippet(&row.body),
            likes: 0,
            comments: 0,
            user_has_liked: false,
            last_activity: row.last_activity_at.unwrap_or(row.created_at),
            author,
            tags: Vec::new(),
            id: row.id,
            title: row.title,
            body: row.body,
            author_id: row.author_id,
            image_url: row.image_url,
            category_id: row.category_id,
            category_name: row.category.map(|c| c.name).unwrap_or_default(),
            is_resolved: row.is_resolved,
            is_hidden: row.is_hidden,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentRow {
    id: String,
    duvida_id: String,
    body: String,
    created_at: DateTime<Utc>,
    author_id: String,
    parent_comment_id: Option<String>,
    profiles: Option<ProfileRef>,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        let (author_name, author_avatar_url) = row.profiles.map_or_else(
            || (UNKNOWN_USER.to_string(), String::new()),
            |p| {
                (
                    p.display_name.unwrap_or_else(|| UNKNOWN_USER.to_string()),
                    p.avatar_url.unwrap_or_default(),
                )
            },
        );
        Self {
            id: row.id,
            duvida_id: row.duvida_id,
            body: row.body,
            created_at: row.created_at,
            author_id: row.author_id,
            parent_comment_id: row.parent_comment_id,
            author_name,
            author_avatar_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<SessionUser>,
}

impl AuthResponse {
    fn into_session(self) -> Option<Session> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(user)) => Some(Session {
                access_token,
                refresh_token: self.refresh_token,
                user,
            }),
            _ => None,
        }
    }
}

const DUVIDA_SELECT: &str = "*,category:categories(name),author:profiles(display_name,avatar_url)";

#[async_trait]
impl ForumApi for SupabaseClient {
    async fn fetch_posts(&self, search: Option<&str>) -> Result<Vec<PostSummary>, ApiError> {
        let mut url = self.endpoint("rest/v1/duvidas")?;
        url.query_pairs_mut()
            .append_pair("select", DUVIDA_SELECT)
            .append_pair("order", "last_activity_at.desc.nullslast");
        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            let pattern = ilike_pattern(term);
            url.query_pairs_mut().append_pair(
                "or",
                &format!("(title.ilike.{pattern},body.ilike.{pattern})"),
            );
        }
        debug!(search = ?search, "fetching duvidas");
        let rows: Vec<DuvidaRow> = self.get_rows(url).await?;
        Ok(rows.into_iter().map(PostSummary::from).collect())
    }

    async fn fetch_post(&self, id: &str) -> Result<PostSummary, ApiError> {
        let mut url = self.endpoint("rest/v1/duvidas")?;
        url.query_pairs_mut()
            .append_pair("select", DUVIDA_SELECT)
            .append_pair("id", &format!("eq.{id}"));
        let row: DuvidaRow = self.get_single(url).await?;
        Ok(row.into())
    }

    async fn create_post(&self, new: &NewPost) -> Result<(), ApiError> {
        let url = self.endpoint("rest/v1/duvidas")?;
        self.write(self.http.post(url).json(new)).await
    }

    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<(), ApiError> {
        let mut url = self.endpoint("rest/v1/duvidas")?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        self.write(self.http.patch(url).json(patch)).await
    }

    async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        let mut url = self.endpoint("rest/v1/duvidas")?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        self.write(self.http.delete(url)).await
    }

    async fn fetch_comments(&self, duvida_id: &str) -> Result<Vec<CommentRecord>, ApiError> {
        let mut url = self.endpoint("rest/v1/comments")?;
        url.query_pairs_mut()
            .append_pair("select", "*,profiles(display_name,avatar_url)")
            .append_pair("duvida_id", &format!("eq.{duvida_id}"))
            .append_pair("order", "created_at.asc");
        let rows: Vec<CommentRow> = self.get_rows(url).await?;
        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn create_comment(&self, new: &NewComment) -> Result<(), ApiError> {
        let url = self.endpoint("rest/v1/comments")?;
        self.write(self.http.post(url).json(new)).await
    }

    async fn update_comment(&self, id: &str, body: &str) -> Result<(), ApiError> {
        let mut url = self.endpoint("rest/v1/comments")?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        self.write(self.http.patch(url).json(&json!({ "body": body })))
            .await
    }

    async fn delete_comment(&self, id: &str) -> Result<(), ApiError> {
        let mut url = self.endpoint("rest/v1/comments")?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        self.write(self.http.delete(url)).await
    }

    async fn insert_like(&self, duvida_id: &str, user_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint("rest/v1/duvidas_likes")?;
        let body = json!({ "duvida_id": duvida_id, "user_id": user_id });
        self.write(self.http.post(url).json(&body)).await
    }

    async fn delete_like(&self, duvida_id: &str, user_id: &str) -> Result<(), ApiError> {
        let mut url = self.endpoint("rest/v1/duvidas_likes")?;
        url.query_pairs_mut()
            .append_pair("duvida_id", &format!("eq.{duvida_id}"))
            .append_pair("user_id", &format!("eq.{user_id}"));
        self.write(self.http.delete(url)).await
    }

    async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        let mut url = self.endpoint("rest/v1/notifications")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("user_id", &format!("eq.{user_id}"))
            .append_pair("order", "created_at.desc");
        self.get_rows(url).await
    }

    async fn mark_notifications_read(&self, ids: &[String]) -> Result<(), ApiError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut url = self.endpoint("rest/v1/notifications")?;
        url.query_pairs_mut()
            .append_pair("id", &format!("in.({})", ids.join(",")));
        self.write(self.http.patch(url).json(&json!({ "is_read": true })))
            .await
    }

    async fn delete_notifications(&self, user_id: &str) -> Result<(), ApiError> {
        let mut url = self.endpoint("rest/v1/notifications")?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user_id}"));
        self.write(self.http.delete(url)).await
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        let mut url = self.endpoint("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{user_id}"));
        self.get_single(url).await
    }

    async fn update_profile(&self, user_id: &str, patch: &ProfilePatch) -> Result<(), ApiError> {
        let mut url = self.endpoint("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{user_id}"));
        self.write(self.http.patch(url).json(patch)).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let mut url = self.endpoint("rest/v1/categories")?;
        url.query_pairs_mut()
            .append_pair("select", "id,name")
            .append_pair("order", "name.asc");
        self.get_rows(url).await
    }

    async fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("category name cannot be empty".into()));
        }
        let url = self.endpoint("rest/v1/categories")?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.bearer())
            .header("Prefer", "return=representation")
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(map_reqwest)?;
        let resp = check_status(resp).await?;
        let mut rows: Vec<Category> = resp.json().await.map_err(map_reqwest)?;
        rows.pop().ok_or(ApiError::NotFound)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let url = self.endpoint("auth/v1/token?grant_type=password")?;
        let resp = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(map_reqwest)?;
        let resp = check_status(resp).await?;
        let auth: AuthResponse = resp.json().await.map_err(map_reqwest)?;
        let session = auth
            .into_session()
            .ok_or_else(|| ApiError::Authorization("sign-in returned no session".into()))?;
        self.store_session(Some(session.clone()));
        debug!(user = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Option<Session>, ApiError> {
        let url = self.endpoint("auth/v1/signup")?;
        let body = json!({
            "email": email,
            "password": password,
            "data": { "display_name": display_name },
        });
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest)?;
        let resp = check_status(resp).await?;
        let auth: AuthResponse = resp.json().await.map_err(map_reqwest)?;
        let session = auth.into_session();
        if session.is_some() {
            self.store_session(session.clone());
        }
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        let url = self.endpoint("auth/v1/logout")?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(resp).await?;
        self.store_session(None);
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), ApiError> {
        let url = self.endpoint("auth/v1/recover")?;
        let resp = self
            .http
            .post(url)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(resp).await?;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, ApiError> {
        Ok(self.stored_session())
    }

    async fn upload_image(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("storage/v1/object/{bucket}/{path}"))?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.bearer())
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(resp).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base)
    }

    async fn delete_image(&self, bucket: &str, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("storage/v1/object/{bucket}/{path}"))?;
        self.write(self.http.delete(url)).await
    }
}
