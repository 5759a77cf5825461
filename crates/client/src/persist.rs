//! Generic persisted state container.
//!
//! [`PersistedStore`] wraps an in-memory value with synchronous accessors, a
//! subscription channel, and serialization to a durable key-value medium
//! under a fixed namespace key. Writes are immediately visible to readers;
//! the durable write is fire-and-forget and a failing medium is logged and
//! otherwise ignored. Hydration loads the snapshot once, sets a one-way
//! readiness flag, and fires an optional callback exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::storage::SharedStorage;

/// Snapshot format version. A persisted snapshot with a different version is
/// treated as absent rather than migrated.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The JSON envelope written to durable storage.
#[derive(Debug, Serialize, serde::Deserialize)]
pub struct Snapshot<T> {
    /// The persisted state.
    pub state: T,
    /// Format version, see [`SNAPSHOT_VERSION`].
    pub version: u32,
}

type Subscriber<T> = Box<dyn Fn(&T) + Send + Sync>;
type HydrateHook<T> = Box<dyn FnOnce(&T) + Send + Sync>;

struct StoreInner<T> {
    key: &'static str,
    storage: SharedStorage,
    state: RwLock<T>,
    subscribers: Mutex<Vec<Subscriber<T>>>,
    hydrated: AtomicBool,
    on_hydrate: Mutex<Option<HydrateHook<T>>>,
}

/// A key-value-backed state container with a hydrate/rehydrate lifecycle.
///
/// Cheaply cloneable handle; all clones share the same state.
pub struct PersistedStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for PersistedStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PersistedStore<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a store over the given storage backend and namespace key,
    /// starting from `T::default()`.
    #[must_use]
    pub fn new(storage: SharedStorage, key: &'static str) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                key,
                storage,
                state: RwLock::new(T::default()),
                subscribers: Mutex::new(Vec::new()),
                hydrated: AtomicBool::new(false),
                on_hydrate: Mutex::new(None),
            }),
        }
    }

    /// Register a callback fired exactly once, after the first
    /// [`hydrate`](Self::hydrate) completes.
    #[must_use]
    pub fn with_on_hydrate(self, hook: impl FnOnce(&T) + Send + Sync + 'static) -> Self {
        *self
            .inner
            .on_hydrate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));
        self
    }

    /// Load the persisted snapshot into memory and mark the store hydrated.
    ///
    /// A missing snapshot, a malformed one, or one with an unexpected
    /// version leaves the current state untouched. Idempotent: the second
    /// and later calls do nothing, and the hydration callback never fires
    /// twice.
    pub fn hydrate(&self) {
        if self.inner.hydrated.load(Ordering::Acquire) {
            return;
        }

        match self.inner.storage.get(self.inner.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Snapshot<T>>(&raw) {
                Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => {
                    let mut state = self.write_lock();
                    *state = snapshot.state;
                    drop(state);
                    debug!(key = self.inner.key, "hydrated persisted snapshot");
                }
                Ok(snapshot) => {
                    warn!(
                        key = self.inner.key,
                        version = snapshot.version,
                        "discarding snapshot with unexpected version"
                    );
                }
                Err(e) => {
                    warn!(key = self.inner.key, error = %e, "discarding malformed snapshot");
                }
            },
            Ok(None) => {
                debug!(key = self.inner.key, "no persisted snapshot");
            }
            Err(e) => {
                warn!(key = self.inner.key, error = %e, "storage read failed, using defaults");
            }
        }

        self.mark_hydrated();

        let hook = self
            .inner
            .on_hydrate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let current = self.get();
        if let Some(hook) = hook {
            hook(&current);
        }
        self.notify(&current);
    }

    /// Clone of the current state.
    #[must_use]
    pub fn get(&self) -> T {
        self.read_lock().clone()
    }

    /// Run a closure against a borrow of the current state.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read_lock())
    }

    /// Mutate the state in place, then persist and notify subscribers.
    ///
    /// The mutation is immediately visible to subsequent reads. The durable
    /// write happens after the lock is released and its failure is swallowed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut state = self.write_lock();
        f(&mut state);
        let current = state.clone();
        drop(state);

        self.persist(&current);
        self.notify(&current);
    }

    /// Replace the state wholesale, then persist and notify subscribers.
    pub fn set(&self, value: T) {
        self.update(|state| *state = value);
    }

    /// Register a subscriber notified after every mutation (and after
    /// hydration) with the post-change state.
    ///
    /// Subscribers run outside the state lock but under the subscriber-list
    /// lock, so a callback must not register further subscribers on the same
    /// store.
    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(f));
    }

    /// Whether the persisted snapshot has been loaded (or found absent).
    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        self.inner.hydrated.load(Ordering::Acquire)
    }

    /// Set the one-way hydration flag.
    pub fn mark_hydrated(&self) {
        self.inner.hydrated.store(true, Ordering::Release);
    }

    /// Remove the durable snapshot, leaving the in-memory state as is. A
    /// failing medium is logged and ignored.
    pub fn clear_persisted(&self) {
        if let Err(e) = self.inner.storage.remove(self.inner.key) {
            warn!(key = self.inner.key, error = %e, "failed to clear persisted snapshot");
        }
    }

    /// The namespace key this store persists under.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.inner.key
    }

    fn persist(&self, state: &T) {
        let snapshot = Snapshot {
            state,
            version: SNAPSHOT_VERSION,
        };
        match serde_json::to_string(&snapshot) {
            Ok(raw) => {
                if let Err(e) = self.inner.storage.set(self.inner.key, &raw) {
                    warn!(key = self.inner.key, error = %e, "failed to persist snapshot");
                }
            }
            Err(e) => {
                warn!(key = self.inner.key, error = %e, "failed to serialize snapshot");
            }
        }
    }

    fn notify(&self, state: &T) {
        let subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for subscriber in subscribers.iter() {
            subscriber(state);
        }
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, T> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, T> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
