//! Explicitly-owned session state.
//!
//! One object with a defined lifecycle — initialize on app start, update on
//! auth events, tear down on sign-out — passed to whoever needs it instead
//! of living in an ambient global.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::ForumApi;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Profile, Role, Session};

/// Auth-state change delivered by the backend's subscription.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

pub struct SessionManager<A> {
    api: Arc<A>,
    init_timeout: Duration,
    session: Option<Session>,
    profile: Option<Profile>,
}

impl<A: ForumApi> SessionManager<A> {
    pub fn new(api: Arc<A>, config: &Config) -> Self {
        Self {
            api,
            init_timeout: config.session_init_timeout,
            session: None,
            profile: None,
        }
    }

    /// Retrieve the current session and, when present, the profile row.
    ///
    /// Guarded by a safety timeout: a stalled backend leaves the manager
    /// signed out instead of hanging the caller. A profile-load failure
    /// degrades to a session without profile.
    ///
    /// # Errors
    ///
    /// Returns the backend error from the session lookup itself.
    pub async fn initialize(&mut self) -> Result<(), ApiError> {
        let lookup = tokio::time::timeout(self.init_timeout, self.api.current_session()).await;
        let session = match lookup {
            Ok(result) => result?,
            Err(_elapsed) => {
                warn!(after = ?self.init_timeout, "session lookup timed out; starting signed out");
                return Ok(());
            }
        };

        match session {
            Some(session) => {
                debug!(user = %session.user.id, "session restored");
                self.load_profile(&session.user.id).await;
                self.session = Some(session);
            }
            None => debug!("no stored session"),
        }
        Ok(())
    }

    /// Apply an auth-state change event.
    pub async fn apply_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) => {
                self.load_profile(&session.user.id).await;
                self.session = Some(session);
            }
            AuthEvent::SignedOut => {
                self.session = None;
                self.profile = None;
            }
        }
    }

    /// Sign out at the backend, then tear down local state.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is kept so the caller can retry.
    pub async fn sign_out(&mut self) -> Result<(), ApiError> {
        self.api.sign_out().await?;
        self.session = None;
        self.profile = None;
        Ok(())
    }

    async fn load_profile(&mut self, user_id: &str) {
        match self.api.fetch_profile(user_id).await {
            Ok(profile) => self.profile = Some(profile),
            Err(e) => {
                // Not fatal: the app works with a session and no profile.
                warn!(user = %user_id, "failed to load profile: {e}");
                self.profile = None;
            }
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user.id.as_str())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|p| p.role == Role::Admin)
    }
}
