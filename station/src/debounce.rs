use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Trailing-edge debouncer around a callback.
///
/// Each `call` cancels any pending scheduled invocation and restarts the
/// delay window; only the last value seen within the window is delivered,
/// exactly once, after the delay elapses from the last call. Dropping the
/// debouncer aborts a pending timer so a stale callback never fires.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, mut callback: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let worker = tokio::spawn(async move {
            while let Some(mut pending) = rx.recv().await {
                loop {
                    let timer = sleep(delay);
                    tokio::pin!(timer);

                    tokio::select! {
                        _ = &mut timer => {
                            callback(pending);
                            break;
                        }
                        next = rx.recv() => {
                            match next {
                                // A newer call supersedes the pending one and
                                // restarts the window.
                                Some(value) => pending = value,
                                // Sender dropped with a call still pending;
                                // the stale callback must not fire.
                                None => return,
                            }
                        }
                    }
                }
            }
        });

        Self { tx, worker }
    }

    /// Schedules `value`, replacing any not-yet-delivered previous value.
    pub fn call(&self, value: T) {
        // Send only fails once the worker is gone, which means we are
        // mid-drop; the value is intentionally discarded then.
        let _ = self.tx.send(value);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
