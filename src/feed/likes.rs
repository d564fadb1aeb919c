//! Optimistic like/unlike with rollback.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::api::ForumApi;
use crate::error::ApiError;

/// The like-related slice of a post's local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub likes: u32,
}

impl LikeState {
    /// The optimistic state after a toggle.
    #[must_use]
    pub fn flipped(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                likes: self.likes.saturating_sub(1),
            }
        } else {
            Self {
                liked: true,
                likes: self.likes + 1,
            }
        }
    }
}

/// Result of a toggle attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The optimistic state was confirmed by the backend.
    Applied(LikeState),
    /// A toggle for this post is already in flight; nothing was done.
    InFlight,
}

/// Two-phase like toggling: tentative local mutation, then server
/// confirmation or compensating rollback.
///
/// A per-post re-entrancy guard keeps the visible count from ever reflecting
/// more than one outstanding toggle at a time.
pub struct LikeController<A> {
    api: Arc<A>,
    in_flight: Mutex<HashSet<String>>,
}

impl<A: ForumApi> LikeController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Toggle the caller's like on a post.
    ///
    /// `apply` is invoked immediately with the optimistic state, and again
    /// with the original state if the backend rejects the write. The caller
    /// must be authenticated; `user_id` identifies the like row.
    ///
    /// # Errors
    ///
    /// Returns the backend error after rolling back the optimistic state.
    pub async fn toggle<F>(
        &self,
        duvida_id: &str,
        user_id: &str,
        current: LikeState,
        mut apply: F,
    ) -> Result<ToggleOutcome, ApiError>
    where
        F: FnMut(LikeState) + Send,
    {
        if !self.lock_in_flight(|set| set.insert(duvida_id.to_string())) {
            debug!(duvida_id, "like toggle already in flight");
            return Ok(ToggleOutcome::InFlight);
        }

        let optimistic = current.flipped();
        apply(optimistic);

        let result = if current.liked {
            self.api.delete_like(duvida_id, user_id).await
        } else {
            self.api.insert_like(duvida_id, user_id).await
        };

        self.lock_in_flight(|set| set.remove(duvida_id));

        match result {
            Ok(()) => Ok(ToggleOutcome::Applied(optimistic)),
            Err(e) => {
                apply(current);
                Err(e)
            }
        }
    }

    fn lock_in_flight<R>(&self, f: impl FnOnce(&mut HashSet<String>) -> R) -> R {
        match self.in_flight.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
