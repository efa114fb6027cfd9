use std::{future::Future, sync::Arc};

use tokio::sync::{mpsc, watch};

/// Cancellation handle shared between an issuing component and one task.
///
/// Clones observe the same state. Once cancelled a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Returns `true` if both handles refer to the same token.
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drives `fut` until it completes or the token is cancelled, whichever
    /// comes first. Returns `None` on cancellation.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

/// Sends exactly one value back to the owner of a spawned task.
///
/// If the task ends without calling [`Report::send`] (panic, abort) the
/// fallback is delivered on drop.
pub(crate) struct Report<T> {
    tx: mpsc::UnboundedSender<T>,
    fallback: Option<T>,
}

impl<T> Report<T> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<T>, fallback: T) -> Self {
        Self {
            tx,
            fallback: Some(fallback),
        }
    }

    pub(crate) fn send(mut self, value: T) {
        self.fallback = None;
        let _ = self.tx.send(value);
    }
}

impl<T> Drop for Report<T> {
    fn drop(&mut self) {
        if let Some(fallback) = self.fallback.take() {
            let _ = self.tx.send(fallback);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn cancel_interrupts_pending_future() {
        let token = CancelToken::new();
        let task = {
            let token = token.clone();
            tokio::spawn(async move {
                token
                    .run_until_cancelled(tokio::time::sleep(Duration::from_secs(60)))
                    .await
            })
        };

        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(task.await.unwrap(), None);
    }

    #[tokio::test]
    async fn completed_future_wins_when_not_cancelled() {
        let token = CancelToken::new();
        assert_eq!(token.run_until_cancelled(async { 7 }).await, Some(7));
        assert!(token.same_as(&token.clone()));
        assert!(!token.same_as(&CancelToken::new()));
    }

    #[tokio::test]
    async fn report_falls_back_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        Report::new(tx.clone(), "fallback").send("sent");
        drop(Report::new(tx, "fallback"));

        assert_eq!(rx.recv().await, Some("sent"));
        assert_eq!(rx.recv().await, Some("fallback"));
    }
}
