//! Trailing-edge debouncing for search box input.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Delivers only the last value scheduled within a quiet period.
///
/// Each `schedule` cancels the pending value, if any, and starts a new delay.
/// Values that survive their delay arrive on the receiver returned by `new`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            pending: None,
            tx,
        };
        (debouncer, rx)
    }

    /// Replace any pending value with `value`, delivered after the delay.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, value: T) {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if tx.send(value).is_err() {
                        tracing::trace!("Debounced value dropped, receiver is gone");
                    }
                }
            }
        });

        self.pending = Some(token);
    }

    /// Drop the pending value without delivering it
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}
