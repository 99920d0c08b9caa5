use crate::any_key::AnyKey;
use crate::any_value::AnyValue;
use crate::error::{Result, StoreError};
use crate::store::Store;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// A thread-safe handle to a [`Store`]
///
/// `SharedStore` wraps a `Store` in `Arc<Mutex<_>>`. Clones share the same
/// underlying store. Every method takes the lock for the duration of the
/// call, and a poisoned lock surfaces as `StoreError::LockError`.
///
/// # Examples
///
/// ```
/// use sovran_store::{SharedStore, StoreError};
/// use std::thread;
///
/// let store = SharedStore::<String>::new();
/// store.add("hits", 0u64)?;
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let store = store.clone();
///         thread::spawn(move || {
///             store.with_store(|s| {
///                 let hits = s.bind::<u64>(&"hits".to_string())?;
///                 s.add("hits", hits + 1);
///                 Ok::<(), StoreError>(())
///             })
///         })
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap()??;
/// }
///
/// assert_eq!(store.bind::<u64>(&"hits".to_string())?, 4);
/// # Ok::<(), StoreError>(())
/// ```
#[derive(Debug)]
pub struct SharedStore<K = AnyKey> {
    inner: Arc<Mutex<Store<K>>>,
}

impl<K> SharedStore<K>
where
    K: Any + Eq + Hash + Debug + Clone + Send + Sync,
{
    /// Creates a new, empty SharedStore
    pub fn new() -> Self {
        Self::from_store(Store::new())
    }

    /// Takes ownership of an existing store
    pub fn from_store(store: Store<K>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store<K>>> {
        self.inner.lock().map_err(|_| StoreError::LockError)
    }

    /// Stores a value, replacing any previous one under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn add<V>(&self, key: impl Into<K>, value: V) -> Result<()>
    where
        V: Any + Send + Sync,
    {
        self.lock()?.add(key, value);
        Ok(())
    }

    /// See [`Store::append`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn append<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, AnyValue)>,
    {
        self.lock()?.append(entries);
        Ok(())
    }

    /// See [`Store::with`]; an empty map leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn with(&self, entries: HashMap<K, AnyValue>) -> Result<()> {
        self.lock()?.with(entries);
        Ok(())
    }

    /// Clones the value under `key` out of the store
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::LockError` if the internal lock cannot be acquired
    /// - Returns `StoreError::KeyNotExist` if the key doesn't exist
    /// - Returns `StoreError::BindTypeMismatch` if the value is not a `T`
    pub fn bind<T: Clone + 'static>(&self, key: &K) -> Result<T> {
        self.lock()?.bind(key)
    }

    /// See [`Store::bind_to`].
    ///
    /// # Errors
    ///
    /// `StoreError::LockError`, then the errors of [`Store::bind_to`].
    pub fn bind_to<T: Clone + 'static>(&self, key: &K, dest: Option<&mut T>) -> Result<()> {
        self.lock()?.bind_to(key, dest)
    }

    /// Runs `f` with exclusive access to the wrapped store.
    ///
    /// This is the way to reach [`Store::get`], [`Store::must_get`] and the
    /// backing map while the lock is held.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn with_store<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Store<K>) -> R,
    {
        let mut store = self.lock()?;
        Ok(f(&mut store))
    }

    /// Removes a value, returning whether the key was present
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn remove(&self, key: &K) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    /// Returns true if the store holds a value under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    /// Returns the number of entries
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns true if the store holds no entries
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Returns a vector of all keys in the store
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LockError` if the internal lock cannot be acquired.
    pub fn keys(&self) -> Result<Vec<K>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

impl<K> Clone for SharedStore<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for SharedStore<K>
where
    K: Any + Eq + Hash + Debug + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> From<Store<K>> for SharedStore<K>
where
    K: Any + Eq + Hash + Debug + Clone + Send + Sync,
{
    fn from(store: Store<K>) -> Self {
        Self::from_store(store)
    }
}
