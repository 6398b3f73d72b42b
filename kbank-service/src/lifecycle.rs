//! Backing service lifecycle states.

use std::fmt;

use tokio::sync::watch;

/// Lifecycle of a [`BackingServer`](crate::server::BackingServer).
///
/// States only move forward: `Starting → Listening → ShuttingDown → Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum ServiceState {
    /// Constructed, not yet bound.
    Starting,
    /// Bound and serving requests.
    Listening,
    /// A shutdown signal arrived; the listener is being dropped.
    ShuttingDown,
    /// Stopped.
    Terminated,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Starting => "starting",
            ServiceState::Listening => "listening",
            ServiceState::ShuttingDown => "shutting-down",
            ServiceState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Publishes state transitions to any number of observers.
#[derive(Debug)]
pub struct Lifecycle {
    tx: watch::Sender<ServiceState>,
}

impl Lifecycle {
    /// Start in [`ServiceState::Starting`].
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServiceState::Starting);
        Self { tx }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        *self.tx.borrow()
    }

    /// Observe future transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.tx.subscribe()
    }

    /// Move to `next`. Moves backwards or to the same state are ignored.
    ///
    /// Returns `true` if the state changed.
    pub fn advance(&self, next: ServiceState) -> bool {
        let changed = self.tx.send_if_modified(|state| {
            if next > *state {
                *state = next;
                true
            } else {
                false
            }
        });
        if changed {
            tracing::debug!(state = %next, "service state changed");
        }
        changed
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_starts_in_starting() {
        assert_eq!(Lifecycle::new().state(), ServiceState::Starting);
    }

    #[test]
    fn lifecycle_only_moves_forward() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.advance(ServiceState::Listening));
        assert!(!lifecycle.advance(ServiceState::Starting), "backward move must be ignored");
        assert!(!lifecycle.advance(ServiceState::Listening), "same state is not a change");
        assert!(lifecycle.advance(ServiceState::Terminated));
        assert!(!lifecycle.advance(ServiceState::ShuttingDown));
        assert_eq!(lifecycle.state(), ServiceState::Terminated);
    }

    #[tokio::test]
    async fn lifecycle_subscribers_see_transitions() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.subscribe();
        lifecycle.advance(ServiceState::Listening);
        if let Err(e) = rx.changed().await {
            panic!("sender dropped: {e}");
        }
        assert_eq!(*rx.borrow_and_update(), ServiceState::Listening);
    }
}
