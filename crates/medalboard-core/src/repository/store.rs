use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, Stream};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::{AnySource, DatasetSource};

use super::{CacheState, LoadFailure, LoadMode, LoadStatus};

type InFlight = Shared<BoxFuture<'static, CacheState>>;

struct Inner<S> {
    source: S,
    state: watch::Sender<CacheState>,
    /// The outstanding fetch, if any. Guarded together with state publication
    /// so a caller never sees "no fetch in flight" and a stale state at once.
    in_flight: Mutex<Option<InFlight>>,
    fetches: AtomicUsize,
}

impl<S> Inner<S> {
    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fetch-once dataset cache with replay-latest fan-out.
///
/// The repository is the only writer of the cached state. Clone it to hand
/// it to consumers; clones share the same cache and the same in-flight fetch.
pub struct Repository<S = AnySource> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Repository<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DatasetSource> Repository<S> {
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(CacheState::Unloaded);
        Self {
            inner: Arc::new(Inner {
                source,
                state,
                in_flight: Mutex::new(None),
                fetches: AtomicUsize::new(0),
            }),
        }
    }

    /// Ensure the dataset is loaded, fetching only if nothing is cached yet
    /// (or the previous attempt failed).
    pub async fn load(&self) -> CacheState {
        self.load_with(LoadMode::IfNeeded).await
    }

    /// Fetch again even if a dataset is already cached.
    pub async fn reload(&self) -> CacheState {
        self.load_with(LoadMode::Force).await
    }

    /// Resolve once the current attempt completes. Never fails: transport and
    /// decode errors end up in `CacheState::Failed`.
    ///
    /// Calls made while a fetch is outstanding share that fetch, whatever
    /// their mode. The fetch runs on its own task, so dropping the returned
    /// future does not cancel it. Must be called from within a Tokio runtime.
    pub async fn load_with(&self, mode: LoadMode) -> CacheState {
        let pending = {
            let mut in_flight = self.inner.lock_in_flight();
            match in_flight.as_ref() {
                Some(pending) => {
                    debug!(?mode, "Load already in flight, sharing it");
                    pending.clone()
                }
                None => {
                    let current = self.inner.state.borrow().clone();
                    if mode == LoadMode::IfNeeded && current.is_loaded() {
                        debug!("Dataset already cached, skipping fetch");
                        return current;
                    }
                    let pending = Self::start_fetch(Arc::clone(&self.inner));
                    *in_flight = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn start_fetch(inner: Arc<Inner<S>>) -> InFlight {
        let pending = async move {
            let attempt = inner.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            let location = inner.source.location();
            info!(source = %location, attempt, "Loading dataset");

            // A panicking source must still settle the attempt and clear the slot
            let next = match AssertUnwindSafe(inner.source.fetch()).catch_unwind().await {
                Ok(Ok(countries)) => {
                    info!(count = countries.len(), "Dataset loaded");
                    CacheState::loaded(countries)
                }
                Ok(Err(e)) => {
                    error!(source = %location, error = %e, "Dataset load failed");
                    CacheState::Failed(LoadFailure::from(&e))
                }
                Err(panic) => {
                    let failure = LoadFailure::from_panic(panic.as_ref());
                    error!(source = %location, error = %failure.message, "Dataset source panicked");
                    CacheState::Failed(failure)
                }
            };

            let mut in_flight = inner.lock_in_flight();
            inner.state.send_replace(next.clone());
            *in_flight = None;
            next
        }
        .boxed()
        .shared();

        tokio::spawn(pending.clone());
        pending
    }

    /// Last published state, without subscribing.
    pub fn snapshot(&self) -> CacheState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> LoadStatus {
        let in_flight = self.inner.lock_in_flight();
        LoadStatus::from_parts(&self.inner.state.borrow(), in_flight.is_some())
    }

    /// Subscribe to cache state. Does not trigger a fetch.
    pub fn observe(&self) -> Subscription {
        Subscription {
            rx: self.inner.state.subscribe(),
            delivered_current: false,
        }
    }

    /// Number of underlying fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }
}

/// One consumer's view of the cache state.
///
/// The first `next()` returns the current state immediately; later calls
/// wait for the next change. Dropping the subscription releases it.
pub struct Subscription {
    rx: watch::Receiver<CacheState>,
    delivered_current: bool,
}

impl Subscription {
    /// Current state first, then each change. `None` once the repository is gone.
    pub async fn next(&mut self) -> Option<CacheState> {
        if !self.delivered_current {
            self.delivered_current = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the state is `Loaded` or `Failed`.
    pub async fn wait_settled(&mut self) -> Option<CacheState> {
        let state = self.rx.wait_for(|s| !s.is_unloaded()).await.ok()?.clone();
        self.delivered_current = true;
        Some(state)
    }

    pub fn into_stream(self) -> impl Stream<Item = CacheState> {
        stream::unfold(self, |mut sub| async move {
            let state = sub.next().await?;
            Some((state, sub))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
