use std::future::Future;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

/// Caches a value until a deadline and recomputes it on the first `get`
/// after the deadline has passed.
///
/// The lock is held while the update runs, so concurrent callers wait for
/// a single refresh instead of racing their own.
pub struct DeadlineUpdater<T> {
    pub inner: Mutex<DeadlineUpdaterInner<T>>,
}

pub struct DeadlineUpdaterInner<T> {
    pub value: Option<T>,
    pub deadline: SystemTime,
}

impl<T> Default for DeadlineUpdater<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeadlineUpdater<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DeadlineUpdaterInner {
                value: None,
                // Start "already expired" (1 minute in the past) to force initial refresh
                deadline: SystemTime::now()
                    .checked_sub(Duration::from_secs(60))
                    .unwrap_or(SystemTime::UNIX_EPOCH),
            }),
        }
    }

    /// Return the cached value, running `update_fn` first if it is missing or
    /// past its deadline.
    ///
    /// `update_fn` receives the stale value (if any) so it can derive the new
    /// one from it, and returns the next deadline together with the new value.
    /// On error the stale value is dropped.
    pub async fn get<F, Fut>(&self, update_fn: F) -> Result<T, String>
    where
        T: Clone,
        F: FnOnce(Option<T>) -> Fut,
        Fut: Future<Output = Result<(SystemTime, T), String>>,
    {
        let mut guard = self.inner.lock().await;

        let now = SystemTime::now();
        let needs_refresh = guard.value.is_none() || now >= guard.deadline;

        if needs_refresh {
            let stale = guard.value.take();
            let (next_deadline, new_value) = update_fn(stale).await?;
            guard.deadline = next_deadline;
            guard.value = Some(new_value);
        }

        match guard.value {
            Some(ref v) => Ok(v.clone()),
            None => Err("No value after update".to_string()),
        }
    }

    /// Force the next `get` to run its update.
    pub async fn expire(&self) {
        let mut guard = self.inner.lock().await;
        guard.deadline = SystemTime::UNIX_EPOCH;
    }
}
