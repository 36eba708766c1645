//! Load-once value shared by concurrent callers.
//!
//! State moves Idle -> Loading -> Loaded. While Loading, every caller awaits
//! the same pending handle instead of starting another load. The load runs
//! on its own task, which also records the outcome, so it completes and is
//! cached even if every caller goes away. A failed load goes back to Idle
//! and the next call retries.

use crate::catalog::LoadError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type PendingLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>, LoadError>>>;

enum LoadState<T> {
    Idle,
    Loading {
        generation: u64,
        pending: PendingLoad<T>,
    },
    Loaded(Arc<T>),
}

struct Inner<T> {
    state: LoadState<T>,
    generation: u64,
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SingleFlight<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        SingleFlight {
            inner: Arc::new(Mutex::new(Inner {
                state: LoadState::Idle,
                generation: 0,
            })),
        }
    }
}

impl<T: Send + Sync + 'static> SingleFlight<T> {
    pub fn new() -> SingleFlight<T> {
        SingleFlight::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        lock(&self.inner)
    }

    /// Returns the cached value, joins the in-flight load, or starts one with
    /// `loader`. `loader` is only invoked when nothing is cached or loading.
    /// Must be called from within a tokio runtime.
    pub async fn get_or_load<F, Fut>(&self, loader: F) -> Result<Arc<T>, LoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
    {
        let pending = {
            let mut inner = self.lock();
            let in_flight = match &inner.state {
                LoadState::Loaded(value) => return Ok(value.clone()),
                LoadState::Loading { pending, .. } => Some(pending.clone()),
                LoadState::Idle => None,
            };
            match in_flight {
                Some(pending) => pending,
                None => {
                    inner.generation += 1;
                    let generation = inner.generation;
                    debug!("Starting load #{}", generation);

                    // The task records its own outcome, callers may go away.
                    let load = loader();
                    let shared = self.inner.clone();
                    let task = tokio::spawn(async move {
                        let result = match AssertUnwindSafe(load).catch_unwind().await {
                            Ok(result) => result.map(Arc::new),
                            Err(_) => Err(LoadError::Aborted("load panicked".to_owned())),
                        };
                        finish(&shared, generation, &result);
                        result
                    });

                    let shared = self.inner.clone();
                    let pending: PendingLoad<T> = async move {
                        match task.await {
                            Ok(result) => result,
                            Err(err) => {
                                let result = Err(LoadError::Aborted(err.to_string()));
                                finish(&shared, generation, &result);
                                result
                            }
                        }
                    }
                    .boxed()
                    .shared();

                    inner.state = LoadState::Loading {
                        generation,
                        pending: pending.clone(),
                    };
                    pending
                }
            }
        };

        pending.await
    }

    pub fn peek(&self) -> Option<Arc<T>> {
        match &self.lock().state {
            LoadState::Loaded(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lock().state, LoadState::Loading { .. })
    }

    /// Forgets the cached value. A load already in flight still finishes for
    /// its waiters but its result is not cached.
    pub fn clear(&self) {
        self.lock().state = LoadState::Idle;
    }
}

/// Moves a load out of Loading unless `clear()` or a newer load replaced it.
fn finish<T>(inner: &Mutex<Inner<T>>, generation: u64, result: &Result<Arc<T>, LoadError>) {
    let mut inner = lock(inner);
    let still_current = matches!(
        &inner.state,
        LoadState::Loading { generation: g, .. } if *g == generation
    );
    if !still_current {
        return;
    }
    inner.state = match result {
        Ok(value) => {
            debug!("Load #{} completed", generation);
            LoadState::Loaded(value.clone())
        }
        Err(err) => {
            debug!("Load #{} failed: {}", generation, err);
            LoadState::Idle
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn slow_value(calls: Arc<AtomicUsize>, value: u32) -> Result<u32, LoadError> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(value)
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let flight = SingleFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            flight.get_or_load({
                let calls = calls.clone();
                move || slow_value(calls, 7)
            }),
            flight.get_or_load({
                let calls = calls.clone();
                move || slow_value(calls, 8)
            }),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*a.unwrap(), 7);
        assert_eq!(*b.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_loaded_value_is_memoized() {
        let flight = SingleFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let value = flight.get_or_load(move || slow_value(calls, 1)).await;
            assert_eq!(*value.unwrap(), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flight.peek().map(|v| *v), Some(1));
        assert!(!flight.is_loading());
    }

    #[tokio::test]
    async fn test_failure_resets_to_idle() {
        let flight = SingleFlight::<u32>::new();

        let failed = flight
            .get_or_load(|| async { Err::<u32, _>(LoadError::Json("bad".to_owned())) })
            .await;
        assert_eq!(failed, Err(LoadError::Json("bad".to_owned())));
        assert!(flight.peek().is_none());

        let retried = flight.get_or_load(|| async { Ok::<u32, LoadError>(3) }).await;
        assert_eq!(*retried.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_clear_forces_reload() {
        let flight = SingleFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = calls.clone();
        flight.get_or_load(move || slow_value(first, 1)).await.unwrap();
        flight.clear();
        assert!(flight.peek().is_none());

        let second = calls.clone();
        let value = flight.get_or_load(move || slow_value(second, 2)).await;
        assert_eq!(*value.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_completes_after_caller_is_dropped() {
        let flight = Arc::new(SingleFlight::<u32>::new());
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let caller = {
            let flight = flight.clone();
            tokio::spawn(async move {
                flight
                    .get_or_load(move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<u32, LoadError>(9)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());
        assert!(flight.is_loading());

        release_tx.send(()).unwrap();
        for _ in 0..100 {
            if !flight.is_loading() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(!flight.is_loading());
        assert_eq!(flight.peek().map(|v| *v), Some(9));
    }

    #[tokio::test]
    async fn test_is_loading_while_in_flight() {
        let flight = Arc::new(SingleFlight::<u32>::new());
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let background = {
            let flight = flight.clone();
            tokio::spawn(async move {
                flight
                    .get_or_load(move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<u32, LoadError>(5)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        assert!(flight.is_loading());
        release_tx.send(()).unwrap();

        assert_eq!(*background.await.unwrap().unwrap(), 5);
        assert!(!flight.is_loading());
    }
}
