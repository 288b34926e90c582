//! Cancellation and deadline propagation for client operations.

use crate::error::{RedmedError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A cancel signal plus an optional deadline, passed to every public
/// operation and threaded through each network call it makes.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_token(CancellationToken::new(), deadline_after(timeout))
    }

    /// Build a context from an existing token, e.g. one wired to Ctrl-C.
    pub fn with_token(token: CancellationToken, deadline: Option<Instant>) -> Self {
        Self { token, deadline }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Resolves once the deadline passes; never resolves without one.
    pub async fn deadline_elapsed(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }

    /// Drive `fut` unless the context is cancelled or its deadline passes first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(RedmedError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(RedmedError::Cancelled),
            _ = self.deadline_elapsed() => Err(RedmedError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

/// The instant `timeout` from now, or `None` when it would overflow.
pub fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
