//! Input coalescing
//!
//! A `Debouncer` accepts values at any rate and hands only the most recent
//! one to its callback once no new value has arrived for the idle window.

use std::time::Duration;

use tokio::sync::mpsc;

/// Idle window applied to search input.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Coalesces bursts of values into a single delayed commit.
///
/// Must be created inside a tokio runtime. Dropping the debouncer discards
/// any value that has not been committed yet.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    window: Duration,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(window: Duration, on_commit: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, window, on_commit));
        Self { tx, window }
    }

    /// Record a new raw value, restarting the idle window.
    pub fn push(&self, value: T) {
        if self.tx.send(value).is_err() {
            tracing::warn!("Debouncer task stopped; dropping input");
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

async fn run<T, F>(mut rx: mpsc::UnboundedReceiver<T>, window: Duration, mut on_commit: F)
where
    F: FnMut(T),
{
    loop {
        let Some(mut latest) = rx.recv().await else {
            return;
        };

        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(value) => latest = value,
                    None => return,
                },
                _ = tokio::time::sleep(window) => break,
            }
        }

        on_commit(latest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) + Send + 'static) {
        let commits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&commits);
        (commits, move |value| sink.lock().unwrap().push(value))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_commits_last_value_once() {
        let (commits, on_commit) = recorder();
        let debouncer = Debouncer::new(DEFAULT_SEARCH_DEBOUNCE, on_commit);

        debouncer.push("a".to_string());
        debouncer.push("ab".to_string());
        debouncer.push("abc".to_string());

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(commits.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*commits.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_new_value_restarts_window() {
        let (commits, on_commit) = recorder();
        let debouncer = Debouncer::new(DEFAULT_SEARCH_DEBOUNCE, on_commit);

        debouncer.push("d".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.push("db".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(commits.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*commits.lock().unwrap(), vec!["db".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_commit_separately() {
        let (commits, on_commit) = recorder();
        let debouncer = Debouncer::new(DEFAULT_SEARCH_DEBOUNCE, on_commit);

        debouncer.push("web".to_string());
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.push("db".to_string());
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(
            *commits.lock().unwrap(),
            vec!["web".to_string(), "db".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_value() {
        let (commits, on_commit) = recorder();
        let debouncer = Debouncer::new(DEFAULT_SEARCH_DEBOUNCE, on_commit);

        debouncer.push("lost".to_string());
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(commits.lock().unwrap().is_empty());
    }
}
