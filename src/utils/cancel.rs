//! Cancellation utilities
//!
//! Provides first-class cancellation handles for long-running generation calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Wrap an existing token, e.g. one owned by an HTTP server connection.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Request cancellation. Futures running under this handle are dropped as soon
    /// as possible; dropping them closes the underlying HTTP connection.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A handle that is cancelled together with this one, but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Create a standalone cancel handle that can be shared across tasks.
pub fn new_cancel_handle() -> CancelHandle {
    CancelHandle::default()
}

/// Drive `fut` until it completes or `handle` is cancelled.
///
/// Returns `None` on cancellation. The future is dropped, not awaited to completion.
pub async fn run_until_cancelled<F>(handle: &CancelHandle, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = handle.token.cancelled() => None,
        out = fut => Some(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let handle = new_cancel_handle();
        let out = run_until_cancelled(&handle, async { 7 }).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn cancelled_handle_drops_pending_future() {
        let handle = new_cancel_handle();
        handle.cancel();
        let out = run_until_cancelled(&handle, tokio::time::sleep(Duration::from_secs(60))).await;
        assert!(out.is_none());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn child_follows_parent() {
        let parent = new_cancel_handle();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
