//! Single-flight token refresh
//!
//! The first request that fails with an expired token becomes the leader and
//! triggers the one refresh call; every request that fails while it is running
//! parks a oneshot receiver here and is woken with the shared outcome.

use super::ClientError;
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};

/// Outcome shared with every parked request: the new access token, or the
/// reason the refresh failed
pub type RefreshResult = Result<String, Arc<ClientError>>;

enum RefreshState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshResult>>,
    },
}

/// Refresh-in-progress flag and pending queue of one execution context
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// A caller's place in the current refresh
pub struct Joined {
    /// True for the caller that moved the coordinator out of idle; it must
    /// start the refresh
    pub leader: bool,
    pub pending: PendingRefresh,
}

/// Handle that resolves once the current refresh finishes
pub struct PendingRefresh {
    receiver: oneshot::Receiver<RefreshResult>,
}

impl PendingRefresh {
    pub async fn wait(self) -> RefreshResult {
        self.receiver
            .await
            .unwrap_or_else(|_| Err(Arc::new(ClientError::RefreshAbandoned)))
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
        }
    }

    /// Queue behind the running refresh, or start a new one
    pub async fn join(&self) -> Joined {
        let (sender, receiver) = oneshot::channel();
        let mut state = self.state.lock().await;

        let leader = match &mut *state {
            RefreshState::Refreshing { waiters } => {
                waiters.push(sender);
                tracing::debug!(queued = waiters.len(), "Queued request behind running refresh");
                false
            }
            RefreshState::Idle => {
                *state = RefreshState::Refreshing {
                    waiters: vec![sender],
                };
                true
            }
        };

        Joined {
            leader,
            pending: PendingRefresh { receiver },
        }
    }

    /// Finish the running refresh and release every parked request in arrival
    /// order. Returns how many requests were released.
    ///
    /// The queue is detached before anyone is woken, so a failure that arrives
    /// from here on starts a fresh refresh.
    pub async fn resolve(&self, result: RefreshResult) -> usize {
        let previous = std::mem::replace(&mut *self.state.lock().await, RefreshState::Idle);
        let RefreshState::Refreshing { waiters } = previous else {
            tracing::warn!("Refresh resolved while coordinator was idle");
            return 0;
        };

        let mut released = 0;
        for waiter in waiters {
            // A dropped receiver means that caller gave up; nothing to deliver.
            if waiter.send(result.clone()).is_ok() {
                released += 1;
            }
        }
        released
    }

    pub async fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock().await, RefreshState::Refreshing { .. })
    }

    /// Number of requests parked behind the running refresh
    pub async fn queued(&self) -> usize {
        match &*self.state.lock().await {
            RefreshState::Refreshing { waiters } => waiters.len(),
            RefreshState::Idle => 0,
        }
    }
}
