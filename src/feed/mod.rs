//! The list reconciler: owns the searchable, refreshable post list.
//!
//! Search changes and refresh requests are triggers into a background task
//! that debounces, fetches with a hard abort timeout, discards stale or
//! canceled responses, and publishes the filtered result through a watch
//! channel. Only one fetch is ever in flight; a newer trigger cancels the
//! older request before starting the next, so results always land in trigger
//! order.

mod likes;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::api::ForumApi;
use crate::config::Config;
use crate::models::PostSummary;

pub use likes::{LikeController, LikeState, ToggleOutcome};

/// Snapshot of the reconciler's published state.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    /// Visible (non-hidden) posts, most recent activity first.
    pub posts: Vec<PostSummary>,
    pub loading: bool,
    /// Message of the last genuine fetch failure, for the UI to surface.
    /// Cleared on the next successful fetch; aborts never set it.
    pub last_error: Option<String>,
}

#[derive(Debug)]
enum Trigger {
    Search(String),
    Refresh,
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    debounce: Duration,
    abort_after: Duration,
    clear_after: Duration,
}

/// Caller-side handle to a running reconciler.
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<Trigger>,
    state_rx: watch::Receiver<FeedState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Replace the search term. The refetch is debounced.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let _ = self.tx.send(Trigger::Search(term.into()));
    }

    /// Request a refetch with the current search term, debounced like a
    /// keystroke. Called after any mutation elsewhere (post create, edit,
    /// delete).
    pub fn refresh(&self) {
        let _ = self.tx.send(Trigger::Refresh);
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state_rx.clone()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> FeedState {
        self.state_rx.borrow().clone()
    }

    /// Stop the background task and wait for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// The background reconciliation task. Construct with [`FeedReconciler::spawn`].
pub struct FeedReconciler<A> {
    api: Arc<A>,
    timing: Timing,
    rx: mpsc::UnboundedReceiver<Trigger>,
    state: Arc<watch::Sender<FeedState>>,
    cancel: CancellationToken,
    search_term: String,
    refreshes: u64,
}

impl<A: ForumApi + 'static> FeedReconciler<A> {
    /// Spawn the reconciler. The initial load runs through the same debounce
    /// path as any other trigger.
    #[must_use]
    pub fn spawn(api: Arc<A>, config: &Config) -> FeedHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(FeedState {
            loading: true,
            ..FeedState::default()
        });
        let cancel = CancellationToken::new();

        let reconciler = Self {
            api,
            timing: Timing {
                debounce: config.search_debounce,
                abort_after: config.fetch_abort_after,
                clear_after: config.loading_clear_after,
            },
            rx,
            state: Arc::new(state_tx),
            cancel: cancel.clone(),
            search_term: String::new(),
            refreshes: 0,
        };
        let task = tokio::spawn(reconciler.run());

        FeedHandle {
            tx,
            state_rx,
            cancel,
            task,
        }
    }

    async fn run(mut self) {
        // idle -> debouncing -> fetching -> idle
        let mut pending = true;
        loop {
            if !pending {
                tokio::select! {
                    () = self.cancel.cancelled() => return,
                    trigger = self.rx.recv() => match trigger {
                        Some(t) => self.apply_trigger(t),
                        None => return,
                    },
                }
            }

            // Debounce: each new trigger restarts the quiet window.
            loop {
                tokio::select! {
                    () = self.cancel.cancelled() => return,
                    () = tokio::time::sleep(self.timing.debounce) => break,
                    trigger = self.rx.recv() => match trigger {
                        Some(t) => self.apply_trigger(t),
                        None => return,
                    },
                }
            }

            match self.fetch_once().await {
                Some(again) => pending = again,
                None => return,
            }
        }
    }

    fn apply_trigger(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Search(term) => self.search_term = term,
            Trigger::Refresh => self.refreshes += 1,
        }
    }

    /// One fetch cycle. Returns `Some(true)` when a newer trigger superseded
    /// the fetch and another cycle is due, `Some(false)` on completion, and
    /// `None` on shutdown.
    async fn fetch_once(&mut self) -> Option<bool> {
        self.state.send_modify(|s| s.loading = true);

        let search = (!self.search_term.is_empty()).then(|| self.search_term.clone());
        debug!(search = %self.search_term, refreshes = self.refreshes, "fetching post list");

        // Backstop: the loading flag must clear even if the abort below were
        // to stall on a wedged request.
        let clear_guard = {
            let state = Arc::clone(&self.state);
            let after = self.timing.clear_after;
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                state.send_modify(|s| {
                    if s.loading {
                        warn!("loading indicator force-cleared after stalled fetch");
                        s.loading = false;
                    }
                });
            })
        };

        let api = Arc::clone(&self.api);
        let fetch = tokio::time::timeout(self.timing.abort_after, async move {
            api.fetch_posts(search.as_deref()).await
        });

        let result = tokio::select! {
            () = self.cancel.cancelled() => {
                clear_guard.abort();
                self.state.send_modify(|s| s.loading = false);
                return None;
            }
            trigger = self.rx.recv() => {
                clear_guard.abort();
                self.state.send_modify(|s| s.loading = false);
                return match trigger {
                    Some(t) => {
                        debug!("in-flight fetch superseded by newer trigger");
                        self.apply_trigger(t);
                        Some(true)
                    }
                    None => None,
                };
            }
            result = fetch => result,
        };
        clear_guard.abort();

        match result {
            Err(_elapsed) => {
                // Client-initiated abort of a stalled request; not surfaced.
                warn!(after = ?self.timing.abort_after, "post fetch aborted by timeout");
                self.state.send_modify(|s| s.loading = false);
            }
            Ok(Err(e)) if e.is_abort() => {
                warn!("post fetch aborted; result discarded");
                self.state.send_modify(|s| s.loading = false);
            }
            Ok(Err(e)) => {
                error!("failed to fetch posts: {e}");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.posts = Vec::new();
                    s.last_error = Some(e.to_string());
                });
            }
            Ok(Ok(posts)) => {
                let total = posts.len();
                let visible: Vec<PostSummary> =
                    posts.into_iter().filter(|p| !p.is_hidden).collect();
                if visible.len() < total {
                    debug!(hidden = total - visible.len(), "filtered hidden posts");
                }
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.posts = visible;
                    s.last_error = None;
                });
            }
        }

        Some(false)
    }
}
