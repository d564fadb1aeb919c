//! Notification center: bulk fetch, mark-all-read, clear-all.
//!
//! Unlike the like toggle, the unread badge is conservative: it only clears
//! after the backend confirms the bulk update, so a silent failure never
//! shows "zero unread" that the server disagrees with.

use std::sync::Arc;

use tracing::{debug, error};

use crate::api::ForumApi;
use crate::error::ApiError;
use crate::models::Notification;

pub struct NotificationCenter<A> {
    api: Arc<A>,
    user_id: Option<String>,
    notifications: Vec<Notification>,
    unread_count: usize,
}

impl<A: ForumApi> NotificationCenter<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            user_id: None,
            notifications: Vec::new(),
            unread_count: 0,
        }
    }

    /// Bind the center to a signed-in user, or clear it on sign-out.
    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
        self.notifications.clear();
        self.unread_count = 0;
    }

    /// Fetch all notifications for the bound user, newest first, and
    /// recompute the unread counter. A signed-out center fetches nothing.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the local list is emptied first.
    pub async fn fetch(&mut self) -> Result<(), ApiError> {
        let Some(user_id) = self.user_id.clone() else {
            self.notifications.clear();
            self.unread_count = 0;
            return Ok(());
        };

        match self.api.fetch_notifications(&user_id).await {
            Ok(notifications) => {
                self.unread_count = notifications.iter().filter(|n| !n.is_read).count();
                self.notifications = notifications;
                debug!(
                    total = self.notifications.len(),
                    unread = self.unread_count,
                    "fetched notifications"
                );
                Ok(())
            }
            Err(e) => {
                error!("failed to fetch notifications: {e}");
                self.notifications.clear();
                self.unread_count = 0;
                Err(e)
            }
        }
    }

    /// Mark every unread notification as read in one bulk update.
    ///
    /// Local items flip to read and the badge zeroes only after the backend
    /// confirms. A no-op when nothing is unread.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is left unchanged.
    pub async fn mark_all_as_read(&mut self) -> Result<(), ApiError> {
        if self.user_id.is_none() || self.unread_count == 0 {
            return Ok(());
        }

        let unread_ids: Vec<String> = self
            .notifications
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id.clone())
            .collect();

        self.api.mark_notifications_read(&unread_ids).await?;

        for notification in &mut self.notifications {
            notification.is_read = true;
        }
        self.unread_count = 0;
        debug!(count = unread_ids.len(), "marked notifications read");
        Ok(())
    }

    /// Delete every notification of the bound user.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is left unchanged.
    pub async fn clear_all(&mut self) -> Result<(), ApiError> {
        let Some(user_id) = self.user_id.clone() else {
            return Ok(());
        };
        if self.notifications.is_empty() {
            return Ok(());
        }

        self.api.delete_notifications(&user_id).await?;

        self.notifications.clear();
        self.unread_count = 0;
        Ok(())
    }

    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.unread_count
    }
}
